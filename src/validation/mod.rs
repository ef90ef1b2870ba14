// src/validation/mod.rs

//! Invariant checks on simulator state and output.

use crate::core::{CollapseError, NORM_TOLERANCE, StateVector};
use crate::simulation::OutcomeCounts;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `NORM_TOLERANCE`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(CollapseError::Incoherence)` otherwise.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<(), CollapseError> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sq: f64 = state.amplitudes().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(CollapseError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks that a backend's outcome table accounts for every shot.
pub fn check_counts(counts: &OutcomeCounts) -> Result<(), CollapseError> {
    let total = counts.total();
    if total != counts.shots() {
        return Err(CollapseError::SimulationError {
            message: format!("Outcome counts sum to {} but {} shots were requested", total, counts.shots()),
        });
    }
    Ok(())
}
