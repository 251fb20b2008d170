// src/sampling/mapper.rs

use super::Method;
use crate::core::Result;
use crate::distribution::check_outcome_count;
use crate::simulation::Counts;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for rejected shots in serialized counts.
pub const REJECTED_KEY: &str = "_rejected";

/// Result of mapping one raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Value(usize),
    Rejected,
}

impl Outcome {
    pub fn value(&self) -> Option<usize> {
        match self {
            Outcome::Value(v) => Some(*v),
            Outcome::Rejected => None,
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Outcome::Value(v) => serializer.serialize_u64(*v as u64),
            Outcome::Rejected => serializer.serialize_str(REJECTED_KEY),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::Rejected => f.write_str(REJECTED_KEY),
        }
    }
}

/// Outcome histogram. Serializes as a string-keyed map; `_rejected` only
/// appears when non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedCounts {
    pub counts: BTreeMap<usize, usize>,
    pub rejected: usize,
}

impl MappedCounts {
    pub fn get(&self, outcome: usize) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Accepted plus rejected shots.
    pub fn total(&self) -> usize {
        self.counts.values().sum::<usize>() + self.rejected
    }
}

impl Serialize for MappedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.counts.len() + usize::from(self.rejected > 0);
        let mut map = serializer.serialize_map(Some(len))?;
        for (outcome, count) in &self.counts {
            map.serialize_entry(&outcome.to_string(), count)?;
        }
        if self.rejected > 0 {
            map.serialize_entry(REJECTED_KEY, &self.rejected)?;
        }
        map.end()
    }
}

/// Outcome probabilities derived from raw-value probabilities.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MappedDistribution {
    /// Probability of each outcome `0..n`.
    pub probabilities: Vec<f64>,
    /// Probability mass that maps to `Rejected`.
    pub rejected: f64,
}

/// Maps raw measured values to dice outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementMapper {
    n: usize,
    method: Method,
}

impl MeasurementMapper {
    pub fn new(n: usize, method: Method) -> Result<Self> {
        check_outcome_count(n)?;
        Ok(Self { n, method })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Rejection: `raw mod n`. Exact: `raw` when below `n`, else `Rejected`.
    pub fn map_value(&self, raw: usize) -> Outcome {
        match self.method {
            Method::Rejection => Outcome::Value(raw % self.n),
            Method::Exact if raw < self.n => Outcome::Value(raw),
            Method::Exact => Outcome::Rejected,
        }
    }

    pub fn map_counts(&self, counts: &Counts) -> MappedCounts {
        let mut mapped = MappedCounts::default();
        for (raw, count) in counts.iter() {
            match self.map_value(raw) {
                Outcome::Value(v) => *mapped.counts.entry(v).or_insert(0) += count,
                Outcome::Rejected => mapped.rejected += count,
            }
        }
        mapped
    }

    /// Folds raw-value probabilities (indexed by raw value) into outcome
    /// probabilities.
    pub fn map_probabilities(&self, raw_probabilities: &[f64]) -> MappedDistribution {
        let mut probabilities = vec![0.0; self.n];
        let mut rejected = 0.0;
        for (raw, p) in raw_probabilities.iter().enumerate() {
            match self.map_value(raw) {
                Outcome::Value(v) => probabilities[v] += p,
                Outcome::Rejected => rejected += p,
            }
        }
        MappedDistribution { probabilities, rejected }
    }
}
