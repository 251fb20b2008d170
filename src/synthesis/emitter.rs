// src/synthesis/emitter.rs

use super::angle_tree::{AngleTree, NodeKey};
use crate::circuits::CircuitProgram;
use crate::core::{QubitId, ROTATION_SKIP_THRESHOLD, Result};
use crate::operations::{Control, GateOp};
use tracing::{debug, trace};

/// How zero-bit prefix controls are expressed in the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolarityEncoding {
    /// Conjugate each zero-bit control with a `Flip` before and after the
    /// rotation, leaving only positive controls on the rotation itself.
    #[default]
    FlipConjugation,
    /// Put the polarity on the control and emit no flips.
    Native,
}

/// Knobs for [`synthesize_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisOptions {
    /// Rotations with |θ| at or below this are dropped.
    pub rotation_threshold: f64,
    pub polarity: PolarityEncoding,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            rotation_threshold: ROTATION_SKIP_THRESHOLD,
            polarity: PolarityEncoding::default(),
        }
    }
}

/// Emits the state-preparation program for `tree` with default options.
pub fn synthesize(tree: &AngleTree) -> Result<CircuitProgram> {
    synthesize_with(tree, &SynthesisOptions::default())
}

/// Walks the tree in (level, prefix) order and emits one rotation per
/// non-negligible node. The node at (level, prefix) rotates qubit `level`,
/// controlled by qubits `0..level` each matching its prefix bit. The program
/// has no measurement.
pub fn synthesize_with(tree: &AngleTree, options: &SynthesisOptions) -> Result<CircuitProgram> {
    let mut program = CircuitProgram::new(tree.num_qubits())?;
    let mut skipped = 0usize;

    for (key, &theta) in tree.iter() {
        if theta.abs() <= options.rotation_threshold {
            skipped += 1;
            continue;
        }
        trace!(node = %key, theta, "emitting rotation");
        program.add_operations(node_ops(key, theta, options.polarity))?;
    }

    debug!(
        num_qubits = tree.num_qubits(),
        rotations = program.rotation_count(),
        skipped,
        operations = program.len(),
        "synthesized state preparation"
    );
    Ok(program)
}

fn node_ops(key: &NodeKey, theta: f64, polarity: PolarityEncoding) -> Vec<GateOp> {
    let target = QubitId(key.level);
    if key.level == 0 {
        return vec![GateOp::Rotation { target, theta }];
    }

    let controls: Vec<Control> = (0..key.level)
        .map(|i| Control {
            qubit: QubitId(i),
            polarity: key.bit(i),
        })
        .collect();

    match polarity {
        PolarityEncoding::Native => vec![GateOp::ControlledRotation { controls, target, theta }],
        PolarityEncoding::FlipConjugation => {
            let flips: Vec<GateOp> = controls
                .iter()
                .filter(|c| !c.polarity)
                .map(|c| GateOp::Flip { target: c.qubit })
                .collect();
            let positive = controls.iter().map(|c| Control::positive(c.qubit)).collect();

            let mut ops = Vec::with_capacity(flips.len() * 2 + 1);
            ops.extend(flips.iter().cloned());
            ops.push(GateOp::ControlledRotation {
                controls: positive,
                target,
                theta,
            });
            ops.extend(flips);
            ops
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::ProbabilityDistribution;

    fn tree_for(weights: &[f64]) -> AngleTree {
        AngleTree::build(&ProbabilityDistribution::from_weights(weights).unwrap().pad())
    }

    #[test]
    fn test_root_is_uncontrolled() -> Result<()> {
        let program = synthesize(&tree_for(&[1.0, 1.0]))?;
        assert_eq!(program.len(), 1);
        assert!(matches!(
            program.operations()[0],
            GateOp::Rotation { target: QubitId(0), .. }
        ));
        Ok(())
    }

    #[test]
    fn test_zero_prefix_is_flip_conjugated() -> Result<()> {
        let program = synthesize(&tree_for(&[1.0, 1.0, 1.0, 1.0]))?;
        // root, then node "0" wrapped in flips, then node "1"
        let names: Vec<&str> = program.operations().iter().map(|op| op.name()).collect();
        assert_eq!(names, vec!["ry", "x", "mcry", "x", "mcry"]);
        for op in program.operations() {
            if let GateOp::ControlledRotation { controls, .. } = op {
                assert!(controls.iter().all(|c| c.polarity));
            }
        }
        Ok(())
    }

    #[test]
    fn test_native_polarity_carries_prefix() -> Result<()> {
        let options = SynthesisOptions {
            polarity: PolarityEncoding::Native,
            ..SynthesisOptions::default()
        };
        let program = synthesize_with(&tree_for(&[1.0, 1.0, 1.0, 1.0]), &options)?;
        assert_eq!(program.len(), 3);
        match &program.operations()[1] {
            GateOp::ControlledRotation { controls, target, .. } => {
                assert_eq!(*target, QubitId(1));
                assert_eq!(controls, &vec![Control::negative(QubitId(0))]);
            }
            other => panic!("unexpected op {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_degenerate_nodes_are_skipped() -> Result<()> {
        // all mass on index 0: every angle is 0
        let program = synthesize(&tree_for(&[1.0, 0.0, 0.0, 0.0, 0.0]))?;
        assert!(program.is_empty());
        assert_eq!(program.num_qubits(), 3);
        Ok(())
    }
}
