// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;
use serde::Serialize;
use std::fmt;

use super::error::{DiceError, Result};

/// Full amplitude vector of a register of `num_qubits` qubits.
///
/// Index `i` is the basis state whose binary expansion (fixed width,
/// qubit 0 first) spells the qubit values. Serialized amplitudes are
/// `[re, im]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    /// The all-zero basis state |0...0>.
    pub fn zero_state(num_qubits: usize) -> Result<Self> {
        let dim = 1usize.checked_shl(num_qubits as u32).ok_or_else(|| {
            DiceError::simulation(format!(
                "{} qubits overflow the state vector dimension",
                num_qubits
            ))
        })?;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Ok(Self { num_qubits, amplitudes })
    }

    /// Wraps an existing amplitude vector. The length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex<f64>>) -> Result<Self> {
        let dim = amplitudes.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(DiceError::simulation(format!(
                "State vector length {} is not a power of two",
                dim
            )));
        }
        Ok(Self {
            num_qubits: dim.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Number of basis states (2^num_qubits).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Probability of measuring basis state `index`; 0 outside the register.
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes.get(index).map_or(0.0, |c| c.norm_sqr())
    }

    /// Measurement probabilities of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Sum of squared amplitude magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_state() -> Result<()> {
        let state = StateVector::zero_state(2)?;
        assert_eq!(state.dim(), 4);
        assert_eq!(state.probabilities(), vec![1.0, 0.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_from_amplitudes_rejects_odd_length() {
        let amps = vec![Complex::new(1.0, 0.0); 3];
        assert!(StateVector::from_amplitudes(amps).is_err());
    }

    #[test]
    fn test_from_amplitudes_infers_qubits() -> Result<()> {
        let mut amps = vec![Complex::zero(); 8];
        amps[5] = Complex::new(0.0, 1.0);
        let state = StateVector::from_amplitudes(amps)?;
        assert_eq!(state.num_qubits(), 3);
        assert_eq!(state.probability(5), 1.0);
        assert_eq!(state.probability(99), 0.0);
        Ok(())
    }
}
