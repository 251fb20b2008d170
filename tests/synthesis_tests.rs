// tests/synthesis_tests.rs

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use qdice::core::PI;
use qdice::synthesis::synthesize_with;
use qdice::{
    AngleTree, DiceError, ExecutionEngine, NodeKey, PolarityEncoding, ProbabilityDistribution, Simulator,
    SynthesisOptions, check_padding, prepare_distribution,
};

fn simulated_probabilities(weights: &[f64]) -> Result<Vec<f64>, DiceError> {
    let program = prepare_distribution(weights)?;
    Ok(Simulator::new().statevector(&program)?.probabilities())
}

#[test]
fn test_four_outcomes_all_angles_half_pi() -> Result<(), DiceError> {
    let tree = AngleTree::build(&ProbabilityDistribution::uniform(4)?.pad());
    assert_eq!(tree.len(), 3);
    for (key, theta) in tree.iter() {
        assert_abs_diff_eq!(*theta, PI / 2.0, epsilon = 1e-12);
        assert!(key.level < 2);
    }
    let probs = simulated_probabilities(&[1.0; 4])?;
    for p in probs {
        assert_abs_diff_eq!(p, 0.25, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_three_outcomes_never_reach_padding() -> Result<(), DiceError> {
    let probs = simulated_probabilities(&[1.0; 3])?;
    assert_eq!(probs.len(), 4);
    for p in &probs[..3] {
        assert_abs_diff_eq!(*p, 1.0 / 3.0, epsilon = 1e-12);
    }
    assert_eq!(probs[3], 0.0);
    Ok(())
}

#[test]
fn test_normalization_is_idempotent() -> Result<(), DiceError> {
    let once = ProbabilityDistribution::from_weights(&[3.0, 1.0, 0.0, 4.0])?;
    let twice = ProbabilityDistribution::from_weights(once.probabilities())?;
    for (a, b) in once.probabilities().iter().zip(twice.probabilities()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-15);
    }
    Ok(())
}

#[test]
fn test_angle_tree_is_deterministic() -> Result<(), DiceError> {
    let padded = ProbabilityDistribution::from_weights(&[0.2, 0.5, 0.1, 0.05, 0.15])?.pad();
    assert_eq!(AngleTree::build(&padded), AngleTree::build(&padded));
    assert_eq!(prepare_distribution(&[0.2, 0.5, 0.3])?, prepare_distribution(&[0.2, 0.5, 0.3])?);
    Ok(())
}

#[test]
fn test_rotation_count_is_strict_with_degenerate_splits() -> Result<(), DiceError> {
    // full support on 8 states: every node rotates
    let full = prepare_distribution(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])?;
    assert_eq!(full.rotation_count(), 7);

    // 5 outcomes on 3 qubits: (1, "1"), (2, "10") and (2, "11") rotate by zero
    let padded = prepare_distribution(&[1.0; 5])?;
    assert_eq!(padded.rotation_count(), 4);

    // a point mass on |00> needs no rotation, on |11> one per level
    assert_eq!(prepare_distribution(&[1.0, 0.0, 0.0, 0.0])?.rotation_count(), 0);
    assert_eq!(prepare_distribution(&[0.0, 0.0, 0.0, 1.0])?.rotation_count(), 2);
    Ok(())
}

#[test]
fn test_polarity_encodings_prepare_the_same_state() -> Result<(), DiceError> {
    let padded = ProbabilityDistribution::from_weights(&[0.3, 0.1, 0.25, 0.05, 0.2, 0.1])?.pad();
    let tree = AngleTree::build(&padded);
    let sim = Simulator::new();
    for polarity in [PolarityEncoding::FlipConjugation, PolarityEncoding::Native] {
        let options = SynthesisOptions {
            polarity,
            ..SynthesisOptions::default()
        };
        let state = sim.statevector(&synthesize_with(&tree, &options)?)?;
        for (amp, expected) in state.vector().iter().zip(padded.amplitudes()) {
            assert_abs_diff_eq!(amp.re, *expected, epsilon = 1e-9);
            assert_abs_diff_eq!(amp.im, 0.0, epsilon = 1e-12);
        }
    }
    Ok(())
}

#[test]
fn test_invalid_weights() {
    assert!(matches!(
        ProbabilityDistribution::from_weights(&[0.0, 0.0]),
        Err(DiceError::DegenerateDistribution { .. })
    ));
    assert!(matches!(
        ProbabilityDistribution::from_weights(&[1.0, -0.5]),
        Err(DiceError::InvalidWeight { index: 1, .. })
    ));
    assert!(matches!(
        ProbabilityDistribution::from_weights(&[f64::NAN]),
        Err(DiceError::InvalidWeight { index: 0, .. })
    ));
    assert!(matches!(
        ProbabilityDistribution::from_weights(&[]),
        Err(DiceError::OutOfRange { n: 0, .. })
    ));
}

#[test]
fn test_huge_weights_do_not_overflow() -> Result<(), DiceError> {
    let dist = ProbabilityDistribution::from_weights(&[f64::MAX, f64::MAX])?;
    assert_eq!(dist.probabilities(), &[0.5, 0.5]);

    let skewed = ProbabilityDistribution::from_weights(&[f64::MAX, f64::MAX / 2.0, 0.0])?;
    assert_abs_diff_eq!(skewed.probabilities()[0], 2.0 / 3.0, epsilon = 1e-15);
    assert_abs_diff_eq!(skewed.probabilities()[1], 1.0 / 3.0, epsilon = 1e-15);
    assert!(prepare_distribution(&[f64::MAX, f64::MAX, f64::MAX]).is_ok());
    Ok(())
}

#[test]
fn test_root_key_first() -> Result<(), DiceError> {
    let tree = AngleTree::build(&ProbabilityDistribution::uniform(8)?.pad());
    let first = tree.iter().next().map(|(k, _)| *k);
    assert_eq!(first, Some(NodeKey::root()));
    assert_eq!(tree.len(), 7);
    Ok(())
}

fn weights_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..10.0, 1..40).prop_filter("needs positive mass", |w| w.iter().sum::<f64>() > 1e-6)
}

proptest! {
    #[test]
    fn prop_padded_norm_is_one(weights in weights_strategy()) {
        let padded = ProbabilityDistribution::from_weights(&weights).unwrap().pad();
        prop_assert!((padded.norm() - 1.0).abs() < 1e-9);
        prop_assert!(check_padding(&padded, None).is_ok());
        prop_assert_eq!(padded.amplitudes().len(), 1usize << padded.num_qubits());
    }

    #[test]
    fn prop_tree_reconstructs_amplitudes(weights in weights_strategy()) {
        let padded = ProbabilityDistribution::from_weights(&weights).unwrap().pad();
        let tree = AngleTree::build(&padded);
        prop_assert_eq!(tree.len(), (1usize << padded.num_qubits()) - 1);
        for (a, b) in tree.reconstruct_amplitudes().iter().zip(padded.amplitudes()) {
            prop_assert!((a - b).abs() < 1e-9, "reconstructed {} vs padded {}", a, b);
        }
        let squared: Vec<f64> = padded.amplitudes().iter().map(|a| a * a).collect();
        for (p, q) in tree.reconstruct_probabilities().iter().zip(&squared) {
            prop_assert!((p - q).abs() < 1e-9, "reconstructed probability {} vs {}", p, q);
        }
        for (_, theta) in tree.iter() {
            prop_assert!((0.0..=PI).contains(theta));
        }
    }

    #[test]
    fn prop_simulated_state_matches_distribution(weights in weights_strategy()) {
        let expected = ProbabilityDistribution::from_weights(&weights).unwrap();
        let probs = simulated_probabilities(&weights).unwrap();
        for (i, p) in probs.iter().enumerate() {
            let target = expected.probabilities().get(i).copied().unwrap_or(0.0);
            prop_assert!((p - target).abs() < 1e-9, "index {}: {} vs {}", i, p, target);
        }
        let program = prepare_distribution(&weights).unwrap();
        prop_assert!(program.rotation_count() < 1usize << program.num_qubits());
    }
}
