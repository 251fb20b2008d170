// src/validation/mod.rs

//! Invariant checks for amplitude vectors and probability vectors.

use crate::core::{DiceError, NORM_TOLERANCE, Result, StateVector};
use crate::distribution::PaddedAmplitudes;

/// Checks that the state vector is normalized (sum of |c_i|^2 ≈ 1).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `NORM_TOLERANCE`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(DiceError::Simulation)` otherwise.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        return Err(DiceError::simulation(format!(
            "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
            norm_sq, effective_tolerance
        )));
    }
    Ok(())
}

/// Checks that probabilities are non-negative and sum to 1.
pub fn check_probability_sum(probabilities: &[f64], tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    if let Some((index, &value)) = probabilities.iter().enumerate().find(|(_, p)| **p < 0.0) {
        return Err(DiceError::InvalidWeight { index, value });
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > effective_tolerance {
        return Err(DiceError::DegenerateDistribution { sum });
    }
    Ok(())
}

/// Checks the padded-amplitude invariants: unit norm, and exact zeros from
/// index `n` on.
pub fn check_padding(padded: &PaddedAmplitudes, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm = padded.norm();
    if (norm - 1.0).abs() > effective_tolerance {
        return Err(DiceError::simulation(format!(
            "Padded amplitudes have norm {} (Deviation > {})",
            norm, effective_tolerance
        )));
    }
    if let Some(pos) = padded.padding().iter().position(|a| *a != 0.0) {
        return Err(DiceError::simulation(format!(
            "Padding amplitude at index {} is non-zero",
            padded.outcome_count() + pos
        )));
    }
    Ok(())
}

/// Basic validation of a simulated state. Only normalization for now.
pub fn validate_state(state: &StateVector, norm_tolerance: Option<f64>) -> Result<()> {
    check_normalization(state, norm_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::ProbabilityDistribution;
    use num_complex::Complex;

    #[test]
    fn test_unnormalized_state_fails() {
        let state = StateVector::from_amplitudes(vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)]).unwrap();
        assert!(check_normalization(&state, None).is_err());
        assert!(check_normalization(&state, Some(1.5)).is_ok());
    }

    #[test]
    fn test_probability_sum() {
        assert!(check_probability_sum(&[0.5, 0.5], None).is_ok());
        assert!(matches!(
            check_probability_sum(&[0.5, 0.4], None),
            Err(DiceError::DegenerateDistribution { .. })
        ));
        assert!(matches!(
            check_probability_sum(&[1.5, -0.5], None),
            Err(DiceError::InvalidWeight { index: 1, .. })
        ));
    }

    #[test]
    fn test_padding_ok_for_uniform() {
        for n in 1..=20 {
            let padded = ProbabilityDistribution::uniform(n).unwrap().pad();
            assert!(check_padding(&padded, None).is_ok(), "n = {}", n);
        }
    }
}
