// src/synthesis/mod.rs

//! Exact state preparation: decomposes a probability distribution into a
//! binary tree of split angles and emits the controlled-rotation program
//! that reproduces it as measurement probabilities.

mod angle_tree;
mod emitter;

pub use angle_tree::{AngleTree, NodeKey};
pub use emitter::{PolarityEncoding, SynthesisOptions, synthesize, synthesize_with};

use crate::circuits::CircuitProgram;
use crate::core::Result;
use crate::distribution::{ProbabilityDistribution, check_outcome_count};
use crate::validation::{check_padding, check_probability_sum};

/// Normalizes `weights`, pads, builds the angle tree and synthesizes the
/// preparation program. No measurement is appended.
pub fn prepare_distribution(weights: &[f64]) -> Result<CircuitProgram> {
    check_outcome_count(weights.len())?;
    let distribution = ProbabilityDistribution::from_weights(weights)?;
    check_probability_sum(distribution.probabilities(), None)?;
    let padded = distribution.pad();
    check_padding(&padded, None)?;
    let tree = AngleTree::build(&padded);
    synthesize(&tree)
}
