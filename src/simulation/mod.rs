// src/simulation/mod.rs

//! Executes a `CircuitProgram` on a state-vector backend.
//! This module contains the `ExecutionEngine` seam, the `Simulator`
//! implementation and the internal `SimulationEngine` that evolves the state.

mod results;
pub(crate) mod engine;

pub use results::{Counts, StepState};

use crate::circuits::CircuitProgram;
use crate::core::{DiceError, MAX_QUBITS, QubitId, Result, StateVector};
use crate::operations::GateOp;
use crate::validation::validate_state;
use engine::SimulationEngine;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use tracing::{debug, warn};

/// A backend able to run synthesized programs.
pub trait ExecutionEngine {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Fails with `EngineUnavailable` when the backend cannot run a
    /// `num_qubits` register.
    fn ensure_available(&self, num_qubits: usize) -> Result<()>;

    /// Exact final state of the unitary part of `program`. Measurements
    /// are ignored.
    fn statevector(&self, program: &CircuitProgram) -> Result<StateVector>;

    /// Runs `program` `shots` times and histograms the raw measured values.
    /// The program must end in a measurement.
    fn sample<R: Rng + ?Sized>(&self, program: &CircuitProgram, shots: usize, rng: &mut R) -> Result<Counts>;

    /// State after every non-measurement operation, in program order.
    fn step_states(&self, program: &CircuitProgram) -> Result<Vec<StepState>> {
        let _ = program;
        Err(DiceError::EngineUnavailable {
            engine: self.name().to_string(),
            reason: "stepwise inspection is not supported".to_string(),
        })
    }
}

/// Dense state-vector simulator.
#[derive(Debug, Clone)]
pub struct Simulator {
    max_qubits: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self { max_qubits: MAX_QUBITS }
    }
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator refusing registers wider than `max_qubits`.
    pub fn with_max_qubits(max_qubits: usize) -> Self {
        Self { max_qubits }
    }

    fn run_unitary(&self, program: &CircuitProgram) -> Result<StateVector> {
        self.ensure_available(program.num_qubits())?;
        let mut engine = SimulationEngine::init(program.num_qubits())?;
        for op in unitary_ops(program) {
            engine.apply_operation(op)?;
        }
        let state = engine.into_state();
        validate_state(&state, None)?;
        Ok(state)
    }
}

impl ExecutionEngine for Simulator {
    fn name(&self) -> &str {
        "statevector"
    }

    fn ensure_available(&self, num_qubits: usize) -> Result<()> {
        if num_qubits > self.max_qubits {
            return Err(DiceError::EngineUnavailable {
                engine: self.name().to_string(),
                reason: format!(
                    "{} qubits requested, simulator is limited to {}",
                    num_qubits, self.max_qubits
                ),
            });
        }
        Ok(())
    }

    fn statevector(&self, program: &CircuitProgram) -> Result<StateVector> {
        self.run_unitary(program)
    }

    fn sample<R: Rng + ?Sized>(&self, program: &CircuitProgram, shots: usize, rng: &mut R) -> Result<Counts> {
        let measured = program
            .measured_qubits()
            .ok_or_else(|| DiceError::invalid_program("Program has no measurement to sample"))?
            .to_vec();
        let state = self.run_unitary(program)?;
        let distribution = marginal_probabilities(&state, &measured);
        let cdf = cumulative(&distribution);
        let fallback = distribution.iter().rposition(|p| *p > 0.0).unwrap_or(0);

        let mut counts = Counts::new();
        for _ in 0..shots {
            let r: f64 = StandardUniform.sample(rng);
            let idx = cdf.partition_point(|c| *c <= r);
            if idx >= cdf.len() {
                // r landed in the rounding gap above the last cumulative value
                warn!(r, total = cdf.last().copied().unwrap_or(0.0), "sample fell past the cdf");
                counts.record(fallback, 1);
            } else {
                counts.record(idx, 1);
            }
        }
        debug!(shots, outcomes = counts.iter().count(), "sampled program");
        Ok(counts)
    }

    fn step_states(&self, program: &CircuitProgram) -> Result<Vec<StepState>> {
        self.ensure_available(program.num_qubits())?;
        let mut engine = SimulationEngine::init(program.num_qubits())?;
        let mut steps = Vec::with_capacity(program.len());
        for op in unitary_ops(program) {
            engine.apply_operation(op)?;
            steps.push(StepState::after(op, engine.get_state()));
        }
        Ok(steps)
    }
}

fn unitary_ops(program: &CircuitProgram) -> impl Iterator<Item = &GateOp> {
    program
        .operations()
        .iter()
        .filter(|op| !matches!(op, GateOp::Measure { .. }))
}

/// Probability of each raw value over `measured`. The first listed qubit is
/// the most significant bit of the raw value.
fn marginal_probabilities(state: &StateVector, measured: &[QubitId]) -> Vec<f64> {
    let n = state.num_qubits();
    let mut marginal = vec![0.0; 1usize << measured.len()];
    for (index, amp) in state.vector().iter().enumerate() {
        let p = amp.norm_sqr();
        if p == 0.0 {
            continue;
        }
        let raw = measured
            .iter()
            .fold(0usize, |acc, q| (acc << 1) | ((index >> (n - 1 - q.0)) & 1));
        marginal[raw] += p;
    }
    marginal
}

fn cumulative(probabilities: &[f64]) -> Vec<f64> {
    probabilities
        .iter()
        .scan(0.0, |acc, p| {
            *acc += p;
            Some(*acc)
        })
        .collect()
}
