//! Numerical constants shared by synthesis, validation and simulation.

/// Tolerances and limits used throughout the crate.
pub mod dice_constants {
    /// Below this subtree mass a split is degenerate and its angle is 0.
    pub const DEGENERATE_MASS_EPSILON: f64 = 1e-15;
    /// Rotations with |θ| at or below this are not emitted.
    pub const ROTATION_SKIP_THRESHOLD: f64 = 1e-10;
    /// Allowed deviation of a squared norm (or probability sum) from 1.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Largest register the core synthesizes for. Bounds n to 2^MAX_QUBITS.
    pub const MAX_QUBITS: usize = 20;
    /// Smallest outcome count the core accepts.
    pub const MIN_OUTCOMES: usize = 1;
    /// Largest outcome count the core accepts.
    pub const MAX_OUTCOMES: usize = 1 << MAX_QUBITS;
    /// Used for rotation angles.
    pub const PI: f64 = std::f64::consts::PI;
}
