// src/operations/mod.rs

//! Defines the operations a circuit is made of: unitary gates, idle
//! slots that act as noise sites, ordering barriers and measurements.

use crate::core::{PI, QubitId};
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// A single-qubit unitary.
#[derive(Debug, Clone, Copy, PartialEq)] // f64 payload, so no Eq
pub enum Gate {
    /// Hadamard: basis change between Z and X eigenbases.
    Hadamard,
    /// Pauli X (bit flip).
    PauliX,
    /// Pauli Z (phase flip).
    PauliZ,
    /// Phase gate `diag(1, e^(iθ))`.
    Phase(f64),
}

impl Gate {
    /// Returns the 2x2 matrix of the gate in the `{|0>, |1>}` basis.
    pub fn matrix(&self) -> [[Complex<f64>; 2]; 2] {
        let one = Complex::new(1.0, 0.0);
        match self {
            Gate::Hadamard => [
                [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(FRAC_1_SQRT_2, 0.0)],
                [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(-FRAC_1_SQRT_2, 0.0)],
            ],
            Gate::PauliX => [[Complex::zero(), one], [one, Complex::zero()]],
            Gate::PauliZ => [[one, Complex::zero()], [Complex::zero(), -one]],
            Gate::Phase(theta) => [
                [one, Complex::zero()],
                [Complex::zero(), Complex::new(theta.cos(), theta.sin())], // e^(i*theta)
            ],
        }
    }

    /// Short label used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::Hadamard => "H",
            Gate::PauliX => "X",
            Gate::PauliZ => "Z",
            Gate::Phase(theta) if (*theta - PI).abs() < 1e-12 => "Z",
            Gate::Phase(_) => "P",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Phase(theta) => write!(f, "P({:.4})", theta),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

/// Categories a noise specification can attach an error channel to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationCategory {
    /// Explicit no-op time slice on one qubit.
    Idle,
}

/// One step of a circuit.
///
/// Analogy: the instruction set of `qiskit.QuantumCircuit` restricted to what
/// the three experiment families need.
#[derive(Debug, Clone, PartialEq)] // Using PartialEq so circuits can be compared structurally.
pub enum Operation {
    /// Single-qubit gate.
    Gate {
        /// Qubit the gate acts on.
        target: QubitId,
        /// The unitary applied.
        gate: Gate,
    },

    /// Gate applied to `target` when `control` is `|1>` (e.g. CX, CZ).
    Controlled {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
        /// Gate applied to the target.
        gate: Gate,
    },

    /// Gate applied to `target` when every control is `|1>`.
    ///
    /// The simulator does not execute this form directly; lower it with
    /// [`Circuit::decompose`](crate::circuits::Circuit::decompose) first.
    MultiControlled {
        /// Control qubits.
        controls: Vec<QubitId>,
        /// Target qubit.
        target: QubitId,
        /// Gate applied to the target. Only X and Z can be lowered.
        gate: Gate,
    },

    /// Identity time slice. This is where idle noise acts, so it must never
    /// be optimised away.
    Idle {
        /// Qubit left idle.
        target: QubitId,
    },

    /// Ordering marker with no effect on the state.
    Barrier {
        /// Qubits the barrier spans.
        targets: Vec<QubitId>,
    },

    /// Computational-basis measurement into a classical bit.
    Measure {
        /// Measured qubit.
        qubit: QubitId,
        /// Destination classical bit.
        clbit: usize,
    },
}

impl Operation {
    /// Returns all qubits directly mentioned by the operation.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Gate { target, .. } => vec![*target],
            Operation::Controlled { control, target, .. } => vec![*control, *target],
            Operation::MultiControlled { controls, target, .. } => {
                let mut qubits = controls.clone();
                qubits.push(*target);
                qubits
            }
            Operation::Idle { target } => vec![*target],
            Operation::Barrier { targets } => targets.clone(),
            Operation::Measure { qubit, .. } => vec![*qubit],
        }
    }

    /// Noise category of the operation, if any channel can attach to it.
    pub fn category(&self) -> Option<OperationCategory> {
        match self {
            Operation::Idle { .. } => Some(OperationCategory::Idle),
            _ => None,
        }
    }
}
