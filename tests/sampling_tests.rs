// tests/sampling_tests.rs

use approx::assert_abs_diff_eq;
use qdice::core::MAX_OUTCOMES;
use qdice::render::RENDER_PLACEHOLDER;
use qdice::{
    CircuitProgram, Counts, DiceError, ExecutionEngine, Method, QuantumDice, RenderChain, Simulator,
    StateVector,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_rejection_three_keeps_modulo_bias() -> Result<(), DiceError> {
    let inspection = QuantumDice::default().inspect(3, Method::Rejection)?;
    assert_eq!(inspection.num_qubits, 2);
    assert_eq!(inspection.gate_count, 2);
    for p in &inspection.raw_probabilities {
        assert_abs_diff_eq!(*p, 0.25, epsilon = 1e-12);
    }
    let mapped = &inspection.outcome_probabilities;
    assert_abs_diff_eq!(mapped.probabilities[0], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(mapped.probabilities[1], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(mapped.probabilities[2], 0.25, epsilon = 1e-12);
    assert_eq!(mapped.rejected, 0.0);
    Ok(())
}

#[test]
fn test_exact_three_is_uniform() -> Result<(), DiceError> {
    let inspection = QuantumDice::default().inspect(3, Method::Exact)?;
    assert_eq!(inspection.raw_probabilities[3], 0.0);
    for p in &inspection.outcome_probabilities.probabilities {
        assert_abs_diff_eq!(*p, 1.0 / 3.0, epsilon = 1e-12);
    }
    assert_eq!(inspection.outcome_probabilities.rejected, 0.0);
    Ok(())
}

#[test]
fn test_exact_never_rejects_across_range() -> Result<(), DiceError> {
    let dice = QuantumDice::default();
    let mut rng = rng(11);
    for n in 2..=20 {
        let result = dice.roll_many(n, Method::Exact, 500, &mut rng)?;
        assert_eq!(result.counts.rejected, 0, "n = {}", n);
        assert_eq!(result.counts.total(), 500);
        assert!(result.counts_raw.iter().all(|(raw, _)| raw < n), "n = {}", n);
    }
    Ok(())
}

#[test]
fn test_seeded_rolls_are_reproducible() -> Result<(), DiceError> {
    let dice = QuantumDice::default();
    let a = dice.roll_many(7, Method::Exact, 300, &mut rng(99))?;
    let b = dice.roll_many(7, Method::Exact, 300, &mut rng(99))?;
    assert_eq!(a, b);

    let first = dice.roll(6, Method::Rejection, &mut rng(5))?;
    let second = dice.roll(6, Method::Rejection, &mut rng(5))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_single_roll_in_range() -> Result<(), DiceError> {
    let dice = QuantumDice::default();
    let mut rng = rng(3);
    for method in [Method::Rejection, Method::Exact] {
        for _ in 0..50 {
            let roll = dice.roll(5, method, &mut rng)?;
            let value = roll.outcome.value().expect("roll produced a value");
            assert!(value < 5);
            assert_eq!(roll.num_qubits, 3);
        }
    }
    Ok(())
}

#[test]
fn test_invalid_method_name() {
    let err = "quantum".parse::<Method>().unwrap_err();
    assert_eq!(err.to_string(), "Invalid method 'quantum'. Use 'rejection' or 'exact'.");
    assert!(err.is_input_error());
}

#[test]
fn test_out_of_range_requests() {
    let dice = QuantumDice::default();
    let mut rng = rng(0);
    assert!(matches!(
        dice.roll_many(0, Method::Exact, 10, &mut rng),
        Err(DiceError::OutOfRange { n: 0, .. })
    ));
    assert!(matches!(
        dice.inspect(MAX_OUTCOMES + 1, Method::Rejection),
        Err(DiceError::OutOfRange { .. })
    ));
}

#[test]
fn test_engine_unavailable_above_capacity() {
    let dice = QuantumDice::new(Simulator::with_max_qubits(3));
    let mut rng = rng(0);
    assert!(dice.roll(8, Method::Exact, &mut rng).is_ok());
    let err = dice.roll(9, Method::Exact, &mut rng).unwrap_err();
    assert!(matches!(err, DiceError::EngineUnavailable { .. }));
    assert!(!err.is_input_error());
}

#[test]
fn test_counts_serialize_with_string_keys() -> Result<(), DiceError> {
    let result = QuantumDice::default().roll_many(4, Method::Rejection, 100, &mut rng(8))?;
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["method"], "rejection");
    let counts = json["counts"].as_object().unwrap();
    assert!(counts.keys().all(|k| k.parse::<usize>().is_ok()));
    assert!(!counts.contains_key("_rejected"));
    Ok(())
}

#[test]
fn test_inspect_falls_back_to_placeholder() -> Result<(), DiceError> {
    let dice = QuantumDice::default().with_renderer(RenderChain::new(Vec::new()));
    let inspection = dice.inspect(4, Method::Exact)?;
    assert_eq!(inspection.diagram, RENDER_PLACEHOLDER);
    assert_eq!(inspection.raw_probabilities.len(), 4);
    Ok(())
}

#[test]
fn test_steps_end_in_inspected_state() -> Result<(), DiceError> {
    let dice = QuantumDice::default();
    let inspection = dice.inspect(6, Method::Exact)?;
    let steps = dice.step_states(6, Method::Exact)?;
    assert_eq!(steps.len(), inspection.gate_count);
    let last = steps.last().unwrap();
    for (a, b) in last.probabilities.iter().zip(&inspection.raw_probabilities) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
    assert!(steps[0].description.starts_with("RY on qubits [0]"));
    Ok(())
}

/// Engine whose exact programs leak a fixed share of shots onto raw value `n`.
struct LeakyEngine {
    leak_to: usize,
}

impl ExecutionEngine for LeakyEngine {
    fn name(&self) -> &str {
        "leaky"
    }

    fn ensure_available(&self, _num_qubits: usize) -> Result<(), DiceError> {
        Ok(())
    }

    fn statevector(&self, program: &CircuitProgram) -> Result<StateVector, DiceError> {
        Simulator::new().statevector(program)
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        program: &CircuitProgram,
        shots: usize,
        rng: &mut R,
    ) -> Result<Counts, DiceError> {
        let honest = Simulator::new().sample(program, shots.saturating_sub(2), rng)?;
        Ok(honest.iter().chain([(self.leak_to, 2)]).collect())
    }
}

#[test]
fn test_exact_leak_is_reported_not_masked() {
    let dice = QuantumDice::new(LeakyEngine { leak_to: 3 });
    let err = dice.roll_many(3, Method::Exact, 50, &mut rng(1)).unwrap_err();
    assert_eq!(
        err,
        DiceError::SynthesisNumericAnomaly {
            n: 3,
            raw_value: 3,
            count: 2
        }
    );

    // the same leak under rejection just wraps around
    let ok = dice.roll_many(3, Method::Rejection, 50, &mut rng(1)).unwrap();
    assert_eq!(ok.counts.rejected, 0);
    assert_eq!(ok.counts.total(), 50);
    assert!(ok.counts.get(0) >= 2);
}
