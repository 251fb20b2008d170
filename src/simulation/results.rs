// src/simulation/results.rs
use crate::core::StateVector;
use crate::operations::GateOp;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Histogram of raw measured values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<usize, usize>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` occurrences of `raw_value`.
    pub fn record(&mut self, raw_value: usize, count: usize) {
        if count > 0 {
            *self.counts.entry(raw_value).or_insert(0) += count;
        }
    }

    /// Occurrences of `raw_value`.
    pub fn get(&self, raw_value: usize) -> usize {
        self.counts.get(&raw_value).copied().unwrap_or(0)
    }

    /// Total number of shots recorded.
    pub fn shots(&self) -> usize {
        self.counts.values().sum()
    }

    /// (raw value, count) pairs in ascending raw value order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(raw, count)| (*raw, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(usize, usize)> for Counts {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (raw, count) in iter {
            counts.record(raw, count);
        }
        counts
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Counts ({} shots):", self.shots())?;
        for (raw, count) in self.iter() {
            writeln!(f, "  {}: {}", raw, count)?;
        }
        Ok(())
    }
}

/// State after one gate of a program, for stepwise inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepState {
    /// Lowercase gate name.
    pub gate: String,
    pub params: Vec<f64>,
    pub qubits: Vec<usize>,
    pub description: String,
    pub statevector: StateVector,
    pub probabilities: Vec<f64>,
}

impl StepState {
    pub(crate) fn after(op: &GateOp, state: &StateVector) -> Self {
        Self {
            gate: op.name().to_string(),
            params: op.params(),
            qubits: op.involved_qubits().iter().map(|q| q.0).collect(),
            description: op.to_string(),
            statevector: state.clone(),
            probabilities: state.probabilities(),
        }
    }
}
