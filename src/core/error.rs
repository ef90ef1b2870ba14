//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Index of a qubit inside a circuit's quantum register.
///
/// Qubit `q` maps to bit `q` of a basis-state index (little-endian), so the
/// lowest-numbered qubit is the right-most character of a measured bitstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl QubitId {
    /// Returns the register index as a plain `usize`.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Error types raised while building circuits, simulating them or
/// reporting their results.
#[derive(Debug, Error)]
pub enum CollapseError {
    /// An operation is inconsistent with the circuit or with what the
    /// simulator can execute (e.g. an unlowered multi-controlled gate).
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// A qubit or classical bit outside its register was referenced.
    #[error("Reference Violation: {message}")]
    ReferenceViolation {
        /// ReferenceViolation failure message
        message: String,
    },

    /// A numeric or structural parameter is outside its valid range.
    #[error("Invalid Parameter: {message}")]
    InvalidParameter {
        /// InvalidParameter failure message
        message: String,
    },

    /// The state vector lost its normalisation.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },

    /// General error encountered during the simulation process itself.
    #[error("Simulation Process Error: {message}")]
    SimulationError {
        /// SimulationError failure message
        message: String,
    },

    /// The plotting backend failed to render a chart.
    #[error("Report Error: {message}")]
    Report {
        /// Report failure message
        message: String,
    },

    /// Filesystem failure while writing artifacts.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
