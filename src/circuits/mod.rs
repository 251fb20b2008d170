// src/circuits/mod.rs

//! Defines the circuit program: a fixed-width qubit register and an ordered
//! sequence of `GateOp`s.
//!
//! Programs are immutable once built. The synthesizer and the strategy
//! selector produce them; the execution engine consumes them without
//! mutation.

use crate::core::{DiceError, QubitId, Result};
use crate::operations::GateOp;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// An ordered sequence of gate operations on a register of `num_qubits`.
///
/// Operation order is significant: controlled rotations at deeper levels
/// rely on shallower rotations having been applied first.
#[derive(Clone, PartialEq, Serialize)]
pub struct CircuitProgram {
    num_qubits: usize,
    operations: Vec<GateOp>,
}

impl CircuitProgram {
    /// Creates an empty program over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(DiceError::invalid_program("a program needs at least one qubit"));
        }
        Ok(Self {
            num_qubits,
            operations: Vec::new(),
        })
    }

    /// Validates `op` against the register and appends it.
    pub fn add_operation(&mut self, op: GateOp) -> Result<()> {
        self.validate_operation(&op)?;
        self.operations.push(op);
        Ok(())
    }

    /// Appends every operation from `ops`, stopping at the first invalid one.
    pub fn add_operations<I>(&mut self, ops: I) -> Result<()>
    where
        I: IntoIterator<Item = GateOp>,
    {
        for op in ops {
            self.add_operation(op)?;
        }
        Ok(())
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The ordered operations.
    pub fn operations(&self) -> &[GateOp] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of rotation gates (plain and controlled).
    pub fn rotation_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_rotation()).count()
    }

    /// Qubits of the last `Measure` operation, if the program measures.
    pub fn measured_qubits(&self) -> Option<&[QubitId]> {
        self.operations.iter().rev().find_map(|op| match op {
            GateOp::Measure { targets } => Some(targets.as_slice()),
            _ => None,
        })
    }

    /// Appends a measurement of every qubit, qubit 0 first.
    pub fn measure_all(&mut self) -> Result<()> {
        let targets = (0..self.num_qubits).map(QubitId).collect();
        self.add_operation(GateOp::Measure { targets })
    }

    fn check_qubit(&self, qubit: QubitId) -> Result<()> {
        if qubit.0 >= self.num_qubits {
            return Err(DiceError::invalid_program(format!(
                "qubit {} out of range for a {}-qubit register",
                qubit, self.num_qubits
            )));
        }
        Ok(())
    }

    fn validate_operation(&self, op: &GateOp) -> Result<()> {
        for qubit in op.involved_qubits() {
            self.check_qubit(qubit)?;
        }
        match op {
            GateOp::ControlledRotation { controls, target, theta } => {
                let mut seen = HashSet::with_capacity(controls.len());
                for control in controls {
                    if control.qubit == *target {
                        return Err(DiceError::invalid_program(format!(
                            "{} is both control and target",
                            target
                        )));
                    }
                    if !seen.insert(control.qubit) {
                        return Err(DiceError::invalid_program(format!(
                            "duplicate control {}",
                            control.qubit
                        )));
                    }
                }
                check_angle(*theta)
            }
            GateOp::Rotation { theta, .. } => check_angle(*theta),
            GateOp::Measure { targets } => {
                if targets.is_empty() {
                    return Err(DiceError::invalid_program("measurement without targets"));
                }
                let unique: HashSet<_> = targets.iter().collect();
                if unique.len() != targets.len() {
                    return Err(DiceError::invalid_program("qubit measured twice"));
                }
                Ok(())
            }
            GateOp::Hadamard { .. } | GateOp::Flip { .. } => Ok(()),
        }
    }
}

fn check_angle(theta: f64) -> Result<()> {
    if theta.is_finite() {
        Ok(())
    } else {
        Err(DiceError::invalid_program(format!("non-finite rotation angle {}", theta)))
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Builds a `CircuitProgram` by method chaining. Validation is deferred to
/// [`CircuitBuilder::build`].
pub struct CircuitBuilder {
    num_qubits: usize,
    operations: Vec<GateOp>,
}

impl CircuitBuilder {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    /// Adds a single operation.
    pub fn add_op(mut self, op: GateOp) -> Self {
        self.operations.push(op);
        self
    }

    /// Adds multiple operations in order.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = GateOp>,
    {
        self.operations.extend(ops);
        self
    }

    /// Validates every operation and returns the program.
    pub fn build(self) -> Result<CircuitProgram> {
        let mut program = CircuitProgram::new(self.num_qubits)?;
        program.add_operations(self.operations)?;
        Ok(program)
    }
}

impl fmt::Display for CircuitProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = &self.operations;
        let num_ops = ops.len();
        let num_rows = self.num_qubits;

        if num_ops == 0 {
            return writeln!(f, "qdice::CircuitProgram[0 operations on {} qubits]", num_rows);
        }

        let labels: Vec<String> = (0..num_rows).map(|q| format!("{}", QubitId(q))).collect();
        let max_label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the cell, v_connect[row][time] the connector below it
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_rows];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                GateOp::Hadamard { target } => op_grid[target.0][t] = format_gate("H"),
                GateOp::Rotation { target, .. } => op_grid[target.0][t] = format_gate("RY"),
                GateOp::Flip { target } => op_grid[target.0][t] = format_gate("X"),
                GateOp::ControlledRotation { controls, target, .. } => {
                    op_grid[target.0][t] = format_gate("RY");
                    let mut r_min = target.0;
                    let mut r_max = target.0;
                    for control in controls {
                        let symbol = if control.polarity { "●" } else { "○" };
                        op_grid[control.qubit.0][t] = format_gate(symbol);
                        r_min = r_min.min(control.qubit.0);
                        r_max = r_max.max(control.qubit.0);
                    }
                    for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row_vec[t] = V_WIRE;
                    }
                }
                GateOp::Measure { targets } => {
                    for target in targets {
                        op_grid[target.0][t] = format_gate("M");
                    }
                }
            }
        }

        writeln!(f, "qdice::CircuitProgram[{} operations on {} qubits]", num_ops, num_rows)?;
        for r in 0..num_rows {
            let label = format!("{}: ", labels[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CircuitProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
