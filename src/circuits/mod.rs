// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`collapse::operations::Operation`) over a fixed quantum
//! register and a classical readout register.
//!
//! A [`Circuit`] is never mutated after it is built. Lowering with
//! [`Circuit::decompose`] produces a new, behaviourally equivalent circuit.

use crate::core::{CollapseError, PI, QubitId};
use crate::operations::{Gate, Operation, OperationCategory};
use std::collections::HashSet;
use std::fmt;

/// An ordered sequence of operations applied to `num_qubits` qubits, with
/// measurement results written to `num_clbits` classical bits.
///
/// Analogy: Similar to `qiskit.QuantumCircuit(n, c)`.
#[derive(Clone, PartialEq)] // PartialEq useful for testing circuits
pub struct Circuit {
    /// Label used in logs and diagrams.
    name: String,
    num_qubits: usize,
    num_clbits: usize,
    /// The order is significant: it is the execution order.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates an empty circuit over the given registers.
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            name: String::from("circuit"),
            num_qubits,
            num_clbits,
            operations: Vec::new(),
        }
    }

    /// Appends an operation without validating it; see [`Circuit::validate`].
    pub fn add_operation(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Appends several operations in order.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        self.operations.extend(ops);
    }

    /// The circuit label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the quantum register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Size of the classical register.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Returns the ordered operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the total number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Counts operations of a noise category (e.g. idle slots).
    pub fn count_category(&self, category: OperationCategory) -> usize {
        self.operations
            .iter()
            .filter(|op| op.category() == Some(category))
            .count()
    }

    /// Checks that every referenced qubit and classical bit exists and that
    /// multi-qubit operations act on distinct qubits.
    pub fn validate(&self) -> Result<(), CollapseError> {
        for (position, op) in self.operations.iter().enumerate() {
            let qubits = op.involved_qubits();
            for qubit in &qubits {
                if qubit.index() >= self.num_qubits {
                    return Err(CollapseError::ReferenceViolation {
                        message: format!(
                            "operation {} references {} but the register has {} qubits",
                            position, qubit, self.num_qubits
                        ),
                    });
                }
            }
            if let Operation::Measure { clbit, .. } = op {
                if *clbit >= self.num_clbits {
                    return Err(CollapseError::ReferenceViolation {
                        message: format!(
                            "operation {} writes classical bit {} but the register has {} bits",
                            position, clbit, self.num_clbits
                        ),
                    });
                }
            }
            let is_gate = matches!(
                op,
                Operation::Controlled { .. } | Operation::MultiControlled { .. }
            );
            if is_gate {
                let distinct: HashSet<QubitId> = qubits.iter().copied().collect();
                if distinct.len() != qubits.len() {
                    return Err(CollapseError::InvalidOperation {
                        message: format!(
                            "operation {} uses the same qubit as control and target",
                            position
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns an equivalent circuit in which every multi-controlled gate is
    /// expanded into `H`, `CX` and phase gates.
    ///
    /// Other operations, idle slots included, are copied unchanged.
    pub fn decompose(&self) -> Result<Circuit, CollapseError> {
        let mut lowered = Circuit {
            name: self.name.clone(),
            num_qubits: self.num_qubits,
            num_clbits: self.num_clbits,
            operations: Vec::with_capacity(self.operations.len()),
        };
        for op in &self.operations {
            match op {
                Operation::MultiControlled { controls, target, gate } => {
                    lower_multi_controlled(controls, *target, gate, &mut lowered.operations)?;
                }
                other => lowered.operations.push(other.clone()),
            }
        }
        Ok(lowered)
    }
}

/// Expands a multi-controlled X or Z.
///
/// `C^k X = H_t · C^k Z · H_t`, and `C^k Z` is a multi-controlled phase of π.
fn lower_multi_controlled(
    controls: &[QubitId],
    target: QubitId,
    gate: &Gate,
    out: &mut Vec<Operation>,
) -> Result<(), CollapseError> {
    let is_flip = match gate {
        Gate::PauliX => true,
        Gate::PauliZ => false,
        other => {
            return Err(CollapseError::InvalidOperation {
                message: format!("cannot lower multi-controlled {}; only X and Z are supported", other),
            });
        }
    };

    match controls {
        [] => out.push(Operation::Gate { target, gate: *gate }),
        [control] => out.push(Operation::Controlled { control: *control, target, gate: *gate }),
        _ => {
            let mut qubits = controls.to_vec();
            qubits.push(target);
            if is_flip {
                out.push(Operation::Gate { target, gate: Gate::Hadamard });
            }
            multi_controlled_phase(PI, &qubits, out);
            if is_flip {
                out.push(Operation::Gate { target, gate: Gate::Hadamard });
            }
        }
    }
    Ok(())
}

/// Phase `e^(iλ)` on the all-ones state of `qubits`, using
/// `x_1...x_m = 2^(1-m) Σ_{S≠∅} (-1)^(|S|-1) ⊕_{i∈S} x_i`.
/// Each parity is computed onto the last qubit of `S` with CX, phased, and
/// uncomputed.
fn multi_controlled_phase(lambda: f64, qubits: &[QubitId], out: &mut Vec<Operation>) {
    let m = qubits.len();
    let theta = lambda / (1u64 << (m - 1)) as f64;
    for mask in 1usize..(1 << m) {
        let subset: Vec<QubitId> = (0..m)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| qubits[bit])
            .collect();
        let sign = if subset.len() % 2 == 1 { 1.0 } else { -1.0 };
        if let Some((last, rest)) = subset.split_last() {
            for control in rest {
                out.push(Operation::Controlled { control: *control, target: *last, gate: Gate::PauliX });
            }
            out.push(Operation::Gate { target: *last, gate: Gate::Phase(sign * theta) });
            for control in rest.iter().rev() {
                out.push(Operation::Controlled { control: *control, target: *last, gate: Gate::PauliX });
            }
        }
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a builder over `num_qubits` qubits and `num_clbits` classical bits.
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits, num_clbits),
        }
    }

    /// Sets the circuit label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.circuit.name = name.into();
        self
    }

    /// Adds a single operation.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Adds multiple operations from an iterator.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Hadamard on `q`.
    pub fn h(self, q: usize) -> Self {
        self.add_op(Operation::Gate { target: QubitId(q), gate: Gate::Hadamard })
    }

    /// Pauli X on `q`.
    pub fn x(self, q: usize) -> Self {
        self.add_op(Operation::Gate { target: QubitId(q), gate: Gate::PauliX })
    }

    /// Controlled X.
    pub fn cx(self, control: usize, target: usize) -> Self {
        self.add_op(Operation::Controlled {
            control: QubitId(control),
            target: QubitId(target),
            gate: Gate::PauliX,
        })
    }

    /// Multi-controlled X.
    pub fn mcx(self, controls: &[usize], target: usize) -> Self {
        self.add_op(Operation::MultiControlled {
            controls: controls.iter().map(|q| QubitId(*q)).collect(),
            target: QubitId(target),
            gate: Gate::PauliX,
        })
    }

    /// Idle slot on `q`.
    pub fn id(self, q: usize) -> Self {
        self.add_op(Operation::Idle { target: QubitId(q) })
    }

    /// Barrier across the whole register.
    pub fn barrier(self) -> Self {
        let targets = (0..self.circuit.num_qubits).map(QubitId).collect();
        self.add_op(Operation::Barrier { targets })
    }

    /// Measures qubit `q` into classical bit `clbit`.
    pub fn measure(self, q: usize, clbit: usize) -> Self {
        self.add_op(Operation::Measure { qubit: QubitId(q), clbit })
    }

    /// Validates and returns the built `Circuit`.
    pub fn build(self) -> Result<Circuit, CollapseError> {
        self.circuit.validate()?;
        Ok(self.circuit)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_ops = self.operations.len();
        let num_qubits = self.num_qubits;
        writeln!(
            f,
            "collapse::Circuit '{}' [{} operations on {} qubits, {} clbits]",
            self.name, num_ops, num_qubits, self.num_clbits
        )?;
        if num_ops == 0 || num_qubits == 0 {
            return Ok(());
        }

        let max_label_width = format!("{}", QubitId(num_qubits - 1)).len();
        let label_padding = " ".repeat(max_label_width + 2); // Label + ": "

        const GATE_WIDTH: usize = 5; // e.g. "──H──"
        const WIRE: &str = "─────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the cell text, v_connect[row][time] the
        // connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total = GATE_WIDTH - slen;
                let pre = total / 2;
                let post = total - pre;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre), symbol, H_WIRE.to_string().repeat(post))
            }
        }

        fn connect(v_connect: &mut [Vec<char>], rows: &[usize], t: usize) {
            let (Some(r_min), Some(r_max)) = (rows.iter().min(), rows.iter().max()) else {
                return;
            };
            for row_vec in v_connect.iter_mut().take(*r_max).skip(*r_min) {
                row_vec[t] = V_WIRE;
            }
        }

        for (t, op) in self.operations.iter().enumerate() {
            match op {
                Operation::Gate { target, gate } => {
                    op_grid[target.index()][t] = format_gate(gate.symbol());
                }
                Operation::Controlled { control, target, gate } => {
                    op_grid[control.index()][t] = format_gate("@");
                    op_grid[target.index()][t] = format_gate(gate.symbol());
                    connect(&mut v_connect, &[control.index(), target.index()], t);
                }
                Operation::MultiControlled { controls, target, gate } => {
                    for control in controls {
                        op_grid[control.index()][t] = format_gate("@");
                    }
                    op_grid[target.index()][t] = format_gate(gate.symbol());
                    let rows: Vec<usize> = op.involved_qubits().iter().map(|q| q.index()).collect();
                    connect(&mut v_connect, &rows, t);
                }
                Operation::Idle { target } => {
                    op_grid[target.index()][t] = format_gate("I");
                }
                Operation::Barrier { targets } => {
                    for target in targets {
                        op_grid[target.index()][t] = format_gate("░");
                    }
                }
                Operation::Measure { qubit, .. } => {
                    op_grid[qubit.index()][t] = format_gate("M");
                }
            }
        }

        for r in 0..num_qubits {
            let label = format!("{}: ", QubitId(r));
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), v_connect[r][t], " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
