// src/distribution/mod.rs

//! Turns caller-supplied weights into a probability vector and pads its
//! square roots out to a power-of-two amplitude vector.

use crate::core::{DiceError, MAX_OUTCOMES, MIN_OUTCOMES, Result};
use serde::Serialize;

/// Qubits needed to address `n` outcomes: `max(1, ceil(log2 n))`.
///
/// `n = 1` still gets one qubit.
pub fn qubits_for(n: usize) -> usize {
    let k = n.max(1).next_power_of_two().trailing_zeros() as usize;
    k.max(1)
}

/// Rejects outcome counts the core cannot synthesize for. Never clamps.
pub fn check_outcome_count(n: usize) -> Result<()> {
    if !(MIN_OUTCOMES..=MAX_OUTCOMES).contains(&n) {
        return Err(DiceError::OutOfRange {
            n,
            min: MIN_OUTCOMES,
            max: MAX_OUTCOMES,
        });
    }
    Ok(())
}

fn empty_distribution() -> DiceError {
    DiceError::OutOfRange {
        n: 0,
        min: MIN_OUTCOMES,
        max: MAX_OUTCOMES,
    }
}

/// A normalized probability vector over outcomes `0..n`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityDistribution {
    probabilities: Vec<f64>,
}

impl ProbabilityDistribution {
    /// Normalizes non-negative `weights` by their sum.
    ///
    /// # Errors
    /// * `OutOfRange` for an empty input. There is no upper bound here.
    /// * `InvalidWeight` for a negative or non-finite weight.
    /// * `DegenerateDistribution` if the weights sum to zero.
    ///
    /// Weights are scaled by the largest one before summing, so finite
    /// weights never overflow the sum.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(empty_distribution());
        }
        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(DiceError::InvalidWeight { index, value });
            }
        }
        let largest = weights.iter().copied().fold(0.0f64, f64::max);
        if largest <= 0.0 {
            return Err(DiceError::DegenerateDistribution { sum: 0.0 });
        }
        let scaled: Vec<f64> = weights.iter().map(|w| w / largest).collect();
        let sum: f64 = scaled.iter().sum();
        Ok(Self {
            probabilities: scaled.iter().map(|w| w / sum).collect(),
        })
    }

    /// Uniform distribution `1/n` over `n` outcomes.
    pub fn uniform(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(empty_distribution());
        }
        Self::from_weights(&vec![1.0 / n as f64; n])
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of outcomes `n`.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Square roots of the probabilities, zero-extended to `2^k` entries.
    pub fn pad(&self) -> PaddedAmplitudes {
        let outcomes = self.len();
        let num_qubits = qubits_for(outcomes);
        let mut amplitudes: Vec<f64> = self.probabilities.iter().map(|p| p.sqrt()).collect();
        amplitudes.resize(1 << num_qubits, 0.0);
        PaddedAmplitudes {
            amplitudes,
            num_qubits,
            outcomes,
        }
    }
}

/// Real, non-negative amplitudes of length `2^num_qubits`. Entries at index
/// `outcomes` and above are exactly zero; the vector is not renormalized
/// after padding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaddedAmplitudes {
    amplitudes: Vec<f64>,
    num_qubits: usize,
    outcomes: usize,
}

impl PaddedAmplitudes {
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Register width `k`.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of meaningful outcomes `n` (before padding).
    pub fn outcome_count(&self) -> usize {
        self.outcomes
    }

    /// L2 norm of the amplitude vector.
    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(|a| a * a).sum::<f64>().sqrt()
    }

    /// The padding tail beyond `n - 1`.
    pub fn padding(&self) -> &[f64] {
        &self.amplitudes[self.outcomes..]
    }
}
