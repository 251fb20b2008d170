// src/sampling/mod.rs

//! Dice strategies: picks the program for an outcome count, maps measured
//! raw values back to outcomes, and runs both through an execution engine.
//!
//! Two strategies are supported:
//! * `Rejection` puts every qubit in equal superposition and reduces the raw
//!   value modulo `n`. Nothing is ever rejected; when `n` is not a power of
//!   two the low outcomes are over-represented.
//! * `Exact` synthesizes a program whose measurement distribution is uniform
//!   over exactly `n` outcomes. Raw values `>= n` have probability zero.

mod mapper;
mod service;

pub use mapper::{MappedCounts, MappedDistribution, MeasurementMapper, Outcome, REJECTED_KEY};
pub use service::{Inspection, QuantumDice, Roll, RollMany};

use crate::circuits::CircuitProgram;
use crate::core::{DiceError, QubitId, Result};
use crate::distribution::{check_outcome_count, qubits_for};
use crate::operations::GateOp;
use crate::synthesis::prepare_distribution;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Rejection,
    Exact,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Rejection => "rejection",
            Method::Exact => "exact",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DiceError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rejection" => Ok(Method::Rejection),
            "exact" => Ok(Method::Exact),
            _ => Err(DiceError::InvalidMethod { method: s.to_string() }),
        }
    }
}

/// Builds the measured program for `n` outcomes with `method`.
///
/// # Errors
/// `OutOfRange` unless `1 <= n <= MAX_OUTCOMES`. The value is never clamped.
pub fn build_program(n: usize, method: Method) -> Result<CircuitProgram> {
    check_outcome_count(n)?;
    let mut program = match method {
        Method::Rejection => {
            let num_qubits = qubits_for(n);
            let mut program = CircuitProgram::new(num_qubits)?;
            program.add_operations((0..num_qubits).map(|q| GateOp::Hadamard { target: QubitId(q) }))?;
            program
        }
        Method::Exact => prepare_distribution(&vec![1.0 / n as f64; n])?,
    };
    program.measure_all()?;
    debug!(n, %method, num_qubits = program.num_qubits(), operations = program.len(), "built dice program");
    Ok(program)
}
