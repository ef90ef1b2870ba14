// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{CollapseError, QubitId};
pub use state::StateVector;

pub mod constants;
pub use constants::collapse_constants::{MAX_QUBITS, NORM_TOLERANCE, PI}; // Re-export
