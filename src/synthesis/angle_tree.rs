// src/synthesis/angle_tree.rs

use crate::core::DEGENERATE_MASS_EPSILON;
use crate::distribution::PaddedAmplitudes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// Identifies an internal node of the binary decomposition tree.
///
/// `prefix` holds the leading `level` bits of the basis indices below the
/// node, most significant first. Ordering is by level, then prefix, which is
/// the order the synthesizer must emit rotations in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
    pub level: usize,
    pub prefix: usize,
}

impl NodeKey {
    /// The root node (empty prefix).
    pub fn root() -> Self {
        Self { level: 0, prefix: 0 }
    }

    /// Prefix bit `i` (0 is the first, most significant bit).
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.level);
        (self.prefix >> (self.level - 1 - i)) & 1 == 1
    }

    /// Prefix as a `'0'`/`'1'` string of length `level`.
    pub fn prefix_bits(&self) -> String {
        (0..self.level).map(|i| if self.bit(i) { '1' } else { '0' }).collect()
    }

    /// Basis indices covered by this node in a `num_qubits` register.
    pub fn span(&self, num_qubits: usize) -> std::ops::Range<usize> {
        let width = 1usize << (num_qubits - self.level);
        let start = self.prefix * width;
        start..start + width
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, \"{}\")", self.level, self.prefix_bits())
    }
}

/// Rotation angles for every internal node of the complete binary tree over
/// `2^num_qubits` basis states. There are exactly `2^num_qubits - 1` nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTree {
    num_qubits: usize,
    angles: BTreeMap<NodeKey, f64>,
}

impl AngleTree {
    /// Decomposes `amplitudes` into conditional split angles.
    ///
    /// Each node's basis states form a contiguous block; the first half has
    /// next bit 0 and the second half next bit 1. A level touches every
    /// amplitude once, so the whole build is O(k * 2^k).
    pub fn build(amplitudes: &PaddedAmplitudes) -> Self {
        let num_qubits = amplitudes.num_qubits();
        let amps = amplitudes.amplitudes();
        let mut angles = BTreeMap::new();

        for level in 0..num_qubits {
            for prefix in 0..(1usize << level) {
                let key = NodeKey { level, prefix };
                let span = key.span(num_qubits);
                let mid = span.start + span.len() / 2;
                let s0 = mass(&amps[span.start..mid]);
                let s1 = mass(&amps[mid..span.end]);
                let theta = split_angle(s0, s1);
                trace!(node = %key, s0, s1, theta, "angle tree node");
                angles.insert(key, theta);
            }
        }

        Self { num_qubits, angles }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Angle stored at `key`, if it is an internal node.
    pub fn angle(&self, key: &NodeKey) -> Option<f64> {
        self.angles.get(key).copied()
    }

    /// Nodes in (level, prefix) order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, &f64)> {
        self.angles.iter()
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Re-derives the amplitude vector analytically from the angles.
    ///
    /// The amplitude of index `i` is the product along its root-to-leaf path
    /// of `cos(θ/2)` for a 0 bit and `sin(θ/2)` for a 1 bit.
    pub fn reconstruct_amplitudes(&self) -> Vec<f64> {
        let dim = 1usize << self.num_qubits;
        let mut amps = vec![1.0; 1];
        for level in 0..self.num_qubits {
            let mut next = Vec::with_capacity(amps.len() * 2);
            for (prefix, amp) in amps.iter().enumerate() {
                let theta = self.angles.get(&NodeKey { level, prefix }).copied().unwrap_or(0.0);
                let half = theta / 2.0;
                next.push(amp * half.cos());
                next.push(amp * half.sin());
            }
            amps = next;
        }
        debug_assert_eq!(amps.len(), dim);
        amps
    }

    /// Squared reconstructed amplitudes.
    pub fn reconstruct_probabilities(&self) -> Vec<f64> {
        self.reconstruct_amplitudes().iter().map(|a| a * a).collect()
    }
}

fn mass(amps: &[f64]) -> f64 {
    amps.iter().map(|a| a * a).sum()
}

/// θ = 2·arccos(√(S0 / (S0 + S1))), or 0 for a negligible subtree.
fn split_angle(s0: f64, s1: f64) -> f64 {
    let total = s0 + s1;
    if total < DEGENERATE_MASS_EPSILON {
        return 0.0;
    }
    // rounding can push the ratio a hair above 1
    let ratio = (s0 / total).clamp(0.0, 1.0);
    2.0 * ratio.sqrt().acos()
}
