// src/simulation/engine.rs
use crate::core::{DiceError, Result, StateVector};
use crate::operations::{Control, GateOp};
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::trace;

type Matrix2 = [[Complex<f64>; 2]; 2];

/// Holds the register state while a program is applied gate by gate.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    num_qubits: usize,
    state: StateVector,
}

impl SimulationEngine {
    /// Starts in |0...0>.
    pub(crate) fn init(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(DiceError::simulation("Cannot initialize simulation engine with zero qubits"));
        }
        Ok(Self {
            num_qubits,
            state: StateVector::zero_state(num_qubits)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.dim() != self.state.dim() {
            return Err(DiceError::simulation(format!(
                "Cannot set state: provided dimension {} does not match engine dimension {}",
                state.dim(),
                self.state.dim()
            )));
        }
        self.state = state;
        Ok(())
    }

    pub(crate) fn get_state(&self) -> &StateVector {
        &self.state
    }

    pub(crate) fn into_state(self) -> StateVector {
        self.state
    }

    /// Applies one unitary operation. `Measure` is not unitary and is
    /// rejected here; callers handle it.
    pub(crate) fn apply_operation(&mut self, op: &GateOp) -> Result<()> {
        trace!(%op, "applying gate");
        match op {
            GateOp::Hadamard { target } => self.apply_single_qubit_gate(target.0, &hadamard_matrix(), &[]),
            GateOp::Rotation { target, theta } => {
                self.apply_single_qubit_gate(target.0, &ry_matrix(*theta), &[])
            }
            GateOp::ControlledRotation { controls, target, theta } => {
                self.apply_single_qubit_gate(target.0, &ry_matrix(*theta), controls)
            }
            GateOp::Flip { target } => self.apply_single_qubit_gate(target.0, &flip_matrix(), &[]),
            GateOp::Measure { .. } => Err(DiceError::simulation(
                "Measure operation should not be passed directly to apply_operation",
            )),
        }
    }

    fn bit_position(&self, qubit: usize) -> Result<usize> {
        if qubit >= self.num_qubits {
            return Err(DiceError::simulation(format!(
                "Qubit {} not found in a {}-qubit register",
                qubit, self.num_qubits
            )));
        }
        Ok(self.num_qubits - 1 - qubit)
    }

    /// Applies a 2x2 matrix to `target` on every basis pair whose control
    /// bits match. Qubit 0 is the most significant bit of the index.
    fn apply_single_qubit_gate(&mut self, target: usize, matrix: &Matrix2, controls: &[Control]) -> Result<()> {
        let k = self.bit_position(target)?;
        let k_mask = 1usize << k;
        let lower_mask = k_mask - 1;

        let mut ctrl_mask = 0usize;
        let mut ctrl_value = 0usize;
        for control in controls {
            let bit = 1usize << self.bit_position(control.qubit.0)?;
            if bit == k_mask {
                return Err(DiceError::simulation("Control and target qubits cannot be the same"));
            }
            ctrl_mask |= bit;
            if control.polarity {
                ctrl_value |= bit;
            }
        }

        let dim = self.state.dim();
        let vec = self.state.vector_mut();
        for i in 0..dim / 2 {
            // insert a 0 at bit k
            let i0 = ((i >> k) << (k + 1)) | (i & lower_mask);
            if i0 & ctrl_mask != ctrl_value {
                continue;
            }
            let i1 = i0 | k_mask;
            let psi_0 = vec[i0];
            let psi_1 = vec[i1];
            vec[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            vec[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
        Ok(())
    }
}

fn hadamard_matrix() -> Matrix2 {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

fn flip_matrix() -> Matrix2 {
    let one = Complex::new(1.0, 0.0);
    [[Complex::zero(), one], [one, Complex::zero()]]
}

/// RY(theta) = [[cos(a), -sin(a)], [sin(a), cos(a)]] where a = theta/2.
fn ry_matrix(theta: f64) -> Matrix2 {
    let half = theta / 2.0;
    let (sin_a, cos_a) = half.sin_cos();
    [
        [Complex::new(cos_a, 0.0), Complex::new(-sin_a, 0.0)],
        [Complex::new(sin_a, 0.0), Complex::new(cos_a, 0.0)],
    ]
}
