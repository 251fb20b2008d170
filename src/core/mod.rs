// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{DiceError, QubitId, Result};
pub use state::StateVector;

pub mod constants;
pub use constants::dice_constants::{
    DEGENERATE_MASS_EPSILON, MAX_OUTCOMES, MAX_QUBITS, MIN_OUTCOMES, NORM_TOLERANCE, PI,
    ROTATION_SKIP_THRESHOLD,
};
