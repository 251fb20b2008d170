// src/operations/mod.rs

//! Elementary gate operations that make up a circuit program.
//!
//! The set is deliberately small: everything the dice strategies emit is a
//! Hadamard, a Y rotation (plain or multi-controlled), a bit flip, or a
//! final measurement of the register.

use crate::core::QubitId;
use serde::Serialize;
use std::fmt;

/// A control condition on a multi-controlled gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Control {
    /// The controlling qubit.
    pub qubit: QubitId,
    /// Required value of the control: `true` for |1>, `false` for |0>.
    pub polarity: bool,
}

impl Control {
    /// A control that fires when `qubit` is |1>.
    pub fn positive(qubit: QubitId) -> Self {
        Self { qubit, polarity: true }
    }

    /// A control that fires when `qubit` is |0>.
    pub fn negative(qubit: QubitId) -> Self {
        Self { qubit, polarity: false }
    }
}

/// One step of a circuit program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateOp {
    /// Hadamard on a single qubit. Used by the rejection strategy to build
    /// the equal superposition over 2^k states.
    Hadamard {
        target: QubitId,
    },

    /// Uncontrolled RY(theta): |0> -> cos(theta/2)|0> + sin(theta/2)|1>.
    Rotation {
        target: QubitId,
        theta: f64,
    },

    /// RY(theta) on `target`, applied only on the basis states where every
    /// control matches its polarity.
    ControlledRotation {
        controls: Vec<Control>,
        target: QubitId,
        theta: f64,
    },

    /// Unconditional bit flip (X). The synthesizer uses pairs of these to
    /// turn negative-polarity controls into positive ones.
    Flip {
        target: QubitId,
    },

    /// Measure the listed qubits into the classical register. The first
    /// listed qubit becomes the most significant bit of the raw value.
    Measure {
        targets: Vec<QubitId>,
    },
}

impl GateOp {
    /// Every qubit the operation touches, controls first.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            GateOp::Hadamard { target }
            | GateOp::Rotation { target, .. }
            | GateOp::Flip { target } => vec![*target],
            GateOp::ControlledRotation { controls, target, .. } => controls
                .iter()
                .map(|c| c.qubit)
                .chain(std::iter::once(*target))
                .collect(),
            GateOp::Measure { targets } => targets.clone(),
        }
    }

    /// Short lowercase gate name, as reported in step inspections.
    pub fn name(&self) -> &'static str {
        match self {
            GateOp::Hadamard { .. } => "h",
            GateOp::Rotation { .. } => "ry",
            GateOp::ControlledRotation { .. } => "mcry",
            GateOp::Flip { .. } => "x",
            GateOp::Measure { .. } => "measure",
        }
    }

    /// Numeric gate parameters (the angle for rotations).
    pub fn params(&self) -> Vec<f64> {
        match self {
            GateOp::Rotation { theta, .. } | GateOp::ControlledRotation { theta, .. } => {
                vec![*theta]
            }
            _ => Vec::new(),
        }
    }

    /// True for rotations, the gates counted against the 2^k - 1 bound.
    pub fn is_rotation(&self) -> bool {
        matches!(self, GateOp::Rotation { .. } | GateOp::ControlledRotation { .. })
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits: Vec<usize> = self.involved_qubits().iter().map(|q| q.0).collect();
        write!(f, "{} on qubits {:?}", self.name().to_uppercase(), qubits)?;
        if let GateOp::ControlledRotation { controls, .. } = self {
            let pattern: String = controls
                .iter()
                .map(|c| if c.polarity { '1' } else { '0' })
                .collect();
            write!(f, " when controls = {}", pattern)?;
        }
        let params = self.params();
        if !params.is_empty() {
            write!(f, " with params {:?}", params)?;
        }
        Ok(())
    }
}
