//! Error handling logic

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Index of a qubit in a register. Qubit 0 is the most significant bit of
/// every basis index and of every measured raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Failures raised by the dice core, the execution engine and the renderer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiceError {
    /// Weights sum to zero, to a negative value, or to something non-finite.
    #[error("Degenerate distribution: weights sum to {sum}")]
    DegenerateDistribution {
        /// The offending weight sum
        sum: f64,
    },

    /// A single weight is negative, NaN or infinite.
    #[error("Invalid weight at index {index}: {value}")]
    InvalidWeight {
        /// Position of the weight
        index: usize,
        /// The rejected value
        value: f64,
    },

    /// The sampling strategy name is not one of the supported methods.
    #[error("Invalid method '{method}'. Use 'rejection' or 'exact'.")]
    InvalidMethod {
        /// Name as supplied by the caller
        method: String,
    },

    /// Outcome count outside what the core supports. The core never clamps.
    #[error("Outcome count {n} outside supported range [{min}, {max}]")]
    OutOfRange {
        /// Requested outcome count
        n: usize,
        /// Smallest accepted value
        min: usize,
        /// Largest accepted value
        max: usize,
    },

    /// The exact strategy measured a raw value outside [0, n). This points at
    /// a defect in angle derivation or gate emission, not at user input.
    #[error("Synthesis numeric anomaly: raw value {raw_value} observed {count} time(s) for n = {n}")]
    SynthesisNumericAnomaly {
        /// Outcome count the program was synthesized for
        n: usize,
        /// Smallest out-of-range raw value observed
        raw_value: usize,
        /// Total number of out-of-range shots
        count: usize,
    },

    /// The execution engine cannot run the request.
    #[error("Execution engine '{engine}' unavailable: {reason}")]
    EngineUnavailable {
        /// Engine name
        engine: String,
        /// Why the engine refused
        reason: String,
    },

    /// A circuit program violates a structural rule (qubit range, controls).
    #[error("Invalid program: {message}")]
    InvalidProgram {
        /// InvalidProgram failure message
        message: String,
    },

    /// General error encountered while executing a program.
    #[error("Simulation error: {message}")]
    Simulation {
        /// Simulation failure message
        message: String,
    },

    /// A rendering backend failed. Never escapes the best-effort render chain.
    #[error("Render error: {message}")]
    Render {
        /// Render failure message
        message: String,
    },
}

impl DiceError {
    pub(crate) fn invalid_program(message: impl Into<String>) -> Self {
        Self::InvalidProgram { message: message.into() }
    }

    pub(crate) fn simulation(message: impl Into<String>) -> Self {
        Self::Simulation { message: message.into() }
    }

    /// Whether the error comes from caller input rather than a defect.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DiceError::DegenerateDistribution { .. }
                | DiceError::InvalidWeight { .. }
                | DiceError::InvalidMethod { .. }
                | DiceError::OutOfRange { .. }
        )
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, DiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_method_message() {
        let err = DiceError::InvalidMethod { method: "quantum".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("quantum"));
        assert!(msg.contains("rejection"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_anomaly_is_not_input_error() {
        let err = DiceError::SynthesisNumericAnomaly { n: 3, raw_value: 3, count: 2 };
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("raw value 3"));
    }

    #[test]
    fn test_qubit_display() {
        assert_eq!(QubitId(4).to_string(), "q4");
    }
}
