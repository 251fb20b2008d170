// src/lib.rs

//! `qdice` - quantum dice by simulated measurement
//!
//! Produces an outcome in `[0, n)` either by reducing a uniform superposition
//! modulo `n` (`Method::Rejection`) or by synthesizing a program of
//! controlled Y rotations whose measurement distribution is uniform over
//! exactly `n` outcomes (`Method::Exact`). The synthesis pipeline accepts any
//! non-negative weight vector, not only uniform ones.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod distribution;
pub mod synthesis;
pub mod simulation;
pub mod sampling;
pub mod render;
pub mod config;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use crate::core::{DiceError, QubitId, Result, StateVector};
pub use operations::{Control, GateOp};
pub use circuits::{CircuitBuilder, CircuitProgram};
pub use distribution::{PaddedAmplitudes, ProbabilityDistribution, qubits_for};
pub use synthesis::{AngleTree, NodeKey, PolarityEncoding, SynthesisOptions, prepare_distribution};
pub use simulation::{Counts, ExecutionEngine, Simulator, StepState};
pub use sampling::{
    Inspection, MappedCounts, MeasurementMapper, Method, Outcome, QuantumDice, Roll, RollMany,
    build_program,
};
pub use render::{HtmlRenderer, RenderChain, Renderer, TextRenderer};
pub use config::{ConfigError, DiceConfig};
pub use validation::{check_normalization, check_padding, check_probability_sum, validate_state};

// Example 1: Exact die with three faces
// The synthesized program never produces raw value 3, so every shot maps to
// a face and nothing is rejected.
/// ```
/// use qdice::{Method, QuantumDice};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let dice = QuantumDice::default();
/// let mut rng = StdRng::seed_from_u64(2024);
///
/// let result = dice.roll_many(3, Method::Exact, 500, &mut rng)?;
/// assert_eq!(result.num_qubits, 2);
/// assert_eq!(result.counts.rejected, 0);
/// assert_eq!(result.counts_raw.get(3), 0);
/// assert_eq!(result.counts.total(), 500);
/// # Ok::<(), qdice::DiceError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Arbitrary weights
// Prepares the state for weights 1:2:1 and reads the probabilities back
// from the simulator.
/// ```
/// use qdice::{ExecutionEngine, Simulator, prepare_distribution};
///
/// let program = prepare_distribution(&[1.0, 2.0, 1.0])?;
/// let probabilities = Simulator::new().statevector(&program)?.probabilities();
/// assert!((probabilities[0] - 0.25).abs() < 1e-9);
/// assert!((probabilities[1] - 0.50).abs() < 1e-9);
/// assert!((probabilities[2] - 0.25).abs() < 1e-9);
/// assert!(probabilities[3].abs() < 1e-12);
/// # Ok::<(), qdice::DiceError>(())
/// ```
#[doc(hidden)]
const _: () = ();
