// src/sampling/service.rs

use super::{MappedCounts, MappedDistribution, MeasurementMapper, Method, Outcome, build_program};
use crate::circuits::CircuitProgram;
use crate::core::{DiceError, Result};
use crate::operations::GateOp;
use crate::distribution::{check_outcome_count, qubits_for};
use crate::render::RenderChain;
use crate::simulation::{Counts, ExecutionEngine, Simulator, StepState};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, instrument};

/// One die roll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roll {
    pub n: usize,
    pub method: Method,
    pub num_qubits: usize,
    /// Value read from the register before mapping.
    pub raw_value: usize,
    pub outcome: Outcome,
}

/// Histogram of many rolls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollMany {
    pub n: usize,
    pub method: Method,
    pub num_qubits: usize,
    pub shots: usize,
    pub counts_raw: Counts,
    pub counts: MappedCounts,
}

/// Static description of the program for (n, method).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub n: usize,
    pub method: Method,
    pub num_qubits: usize,
    /// Unitary gates, measurement excluded.
    pub gate_count: usize,
    pub rotation_count: usize,
    /// Probability of every raw value, from the engine's state vector.
    pub raw_probabilities: Vec<f64>,
    pub outcome_probabilities: MappedDistribution,
    pub program: CircuitProgram,
    pub diagram: String,
}

/// Ties strategy selection, an execution engine, the measurement mapper and
/// the renderer together. Holds no per-request state.
pub struct QuantumDice<E: ExecutionEngine = Simulator> {
    engine: E,
    renderer: RenderChain,
}

impl Default for QuantumDice<Simulator> {
    fn default() -> Self {
        Self::new(Simulator::new())
    }
}

impl<E: ExecutionEngine> QuantumDice<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            renderer: RenderChain::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: RenderChain) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validates `n`, checks the engine and builds the measured program.
    fn prepare(&self, n: usize, method: Method) -> Result<(CircuitProgram, MeasurementMapper)> {
        check_outcome_count(n)?;
        self.engine.ensure_available(qubits_for(n))?;
        let program = build_program(n, method)?;
        let mapper = MeasurementMapper::new(n, method)?;
        Ok((program, mapper))
    }

    /// Draws a single outcome in `[0, n)`.
    #[instrument(level = "debug", skip(self, rng))]
    pub fn roll<R: Rng + ?Sized>(&self, n: usize, method: Method, rng: &mut R) -> Result<Roll> {
        let (program, mapper) = self.prepare(n, method)?;
        let counts = self.engine.sample(&program, 1, rng)?;
        let raw_value = counts
            .iter()
            .next()
            .map(|(raw, _)| raw)
            .ok_or_else(|| DiceError::simulation("engine returned no shot"))?;
        let outcome = mapper.map_value(raw_value);
        if outcome == Outcome::Rejected {
            return Err(anomaly(n, raw_value, 1));
        }
        Ok(Roll {
            n,
            method,
            num_qubits: program.num_qubits(),
            raw_value,
            outcome,
        })
    }

    /// Runs `shots` rolls and returns raw and mapped histograms.
    #[instrument(level = "debug", skip(self, rng))]
    pub fn roll_many<R: Rng + ?Sized>(
        &self,
        n: usize,
        method: Method,
        shots: usize,
        rng: &mut R,
    ) -> Result<RollMany> {
        let (program, mapper) = self.prepare(n, method)?;
        let counts_raw = self.engine.sample(&program, shots, rng)?;
        let counts = mapper.map_counts(&counts_raw);
        if method == Method::Exact && counts.rejected > 0 {
            let raw_value = counts_raw.iter().map(|(raw, _)| raw).find(|raw| *raw >= n).unwrap_or(n);
            return Err(anomaly(n, raw_value, counts.rejected));
        }
        debug!(n, %method, shots, distinct = counts.counts.len(), "rolled");
        Ok(RollMany {
            n,
            method,
            num_qubits: program.num_qubits(),
            shots,
            counts_raw,
            counts,
        })
    }

    /// Describes the program for (n, method) without sampling. The diagram
    /// is best effort and never causes a failure.
    #[instrument(level = "debug", skip(self))]
    pub fn inspect(&self, n: usize, method: Method) -> Result<Inspection> {
        let (program, mapper) = self.prepare(n, method)?;
        let raw_probabilities = self.engine.statevector(&program)?.probabilities();
        let outcome_probabilities = mapper.map_probabilities(&raw_probabilities);
        let diagram = self.renderer.render_best_effort(&program);
        Ok(Inspection {
            n,
            method,
            num_qubits: program.num_qubits(),
            gate_count: program
                .operations()
                .iter()
                .filter(|op| !matches!(op, GateOp::Measure { .. }))
                .count(),
            rotation_count: program.rotation_count(),
            raw_probabilities,
            outcome_probabilities,
            program,
            diagram,
        })
    }

    /// State vector and probabilities after each gate of the program.
    #[instrument(level = "debug", skip(self))]
    pub fn step_states(&self, n: usize, method: Method) -> Result<Vec<StepState>> {
        let (program, _) = self.prepare(n, method)?;
        self.engine.step_states(&program)
    }
}

fn anomaly(n: usize, raw_value: usize, count: usize) -> DiceError {
    error!(n, raw_value, count, "exact program measured an out-of-range value");
    DiceError::SynthesisNumericAnomaly { n, raw_value, count }
}
