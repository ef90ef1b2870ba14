//! Numeric constants shared by the simulator and the validators.

/// Tolerances and hard limits used throughout the crate
pub mod collapse_constants {
    /// Largest register the state-vector simulator accepts (2^24 amplitudes).
    pub const MAX_QUBITS: usize = 24;
    /// Allowed deviation of the squared state norm from 1.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Basis-state probabilities below this are dropped from sampling.
    pub const PROBABILITY_FLOOR: f64 = 1e-15;
    /// Used for phase angles (`e^(iθ)`)
    pub const PI: f64 = std::f64::consts::PI;
}
