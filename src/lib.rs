// src/lib.rs

//! `collapse` - mass-dependent decoherence experiments on simulated circuits
//!
//! The library builds three families of test circuits (GHZ parity, branch
//! isolation and Grover search), executes each under a dephasing model
//! whose strength grows with a "mass" parameter and under a constant
//! baseline, and reduces the sampled outcomes to one scalar per point.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod noise;
pub mod simulation;
pub mod validation;
pub mod statistics;
pub mod experiments;
pub mod report;

// Re-export the most common types for easier top-level use
pub use core::{CollapseError, QubitId, StateVector};
pub use operations::{Gate, Operation, OperationCategory};
pub use circuits::{Circuit, CircuitBuilder};
pub use noise::{NoiseConstants, NoisePair, NoiseSpec, dephasing_probability};
pub use simulation::{Backend, OutcomeCounts, Simulator};
pub use validation::{check_counts, check_normalization};
pub use experiments::{
    Experiment, ExperimentContext, ExperimentParameters, SweepAxis, SweepConfig, SweepResult,
    run_search_grid, run_sweep,
};

// Example 1: Noiseless GHZ parity
// A two-qubit GHZ state read out in the X basis only ever yields even
// parity, so the visibility is exactly one.
/// ```
/// use collapse::{Backend, CircuitBuilder, CollapseError, NoiseSpec, Simulator};
/// use collapse::statistics::parity_visibility;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let circuit = CircuitBuilder::new(2, 2)
///     .h(0)
///     .cx(0, 1)
///     .id(0)
///     .id(1)
///     .h(0)
///     .h(1)
///     .measure(0, 0)
///     .measure(1, 1)
///     .build()?;
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let counts = Simulator::new().execute(&circuit, &NoiseSpec::noiseless(), 500, &mut rng)?;
/// println!("{}", counts);
/// assert_eq!(counts.total(), 500);
/// assert!((parity_visibility(&counts) - 1.0).abs() < 1e-12);
/// # Ok::<(), CollapseError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Noise pair for one sweep point
/// ```
/// use collapse::{NoiseConstants, NoisePair, OperationCategory, dephasing_probability};
///
/// assert_eq!(dephasing_probability(0.0, 0.02, 2.0), 0.0);
///
/// let pair = NoisePair::new(4.0, &NoiseConstants::new(0.02, 2.0, 0.01));
/// let p = pair.mass_dependent.dephasing(OperationCategory::Idle);
/// assert!((p.unwrap_or(0.0) - (1.0 - (-0.32f64).exp())).abs() < 1e-12);
/// assert_eq!(pair.baseline.dephasing(OperationCategory::Idle), Some(0.01));
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
