// src/experiments/ghz.rs

//! Entanglement-spread protocol.
//!
//! An `n`-qubit GHZ state idles for a number of time-slices and is read out
//! in the X basis. The parity visibility of the result decays as dephasing
//! accumulates on the shared coherence.

use super::{Experiment, ExperimentParameters, SweepAxis, SweepConfig};
use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::CollapseError;
use crate::noise::NoiseConstants;
use crate::simulation::OutcomeCounts;
use crate::statistics::parity_visibility;

/// Register sizes swept by default.
pub const REGISTER_SIZES: [usize; 5] = [2, 4, 6, 8, 10];
/// Idle slices between preparation and readout.
pub const IDLE_SLICES: usize = 20;
pub const NOISE: NoiseConstants = NoiseConstants { k: 0.02, alpha: 2.0, p_const: 0.01 };
pub const OUTPUT_PATH: &str = "results/ghz_parity.svg";

/// Default sweep over [`REGISTER_SIZES`].
pub fn default_config(shots: u64) -> SweepConfig {
    SweepConfig {
        axis: SweepAxis::RegisterSize,
        register_size: REGISTER_SIZES[0],
        depth: IDLE_SLICES,
        shots,
        noise: NOISE,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EntanglementSpread;

impl Experiment for EntanglementSpread {
    fn name(&self) -> &'static str {
        "entanglement-spread"
    }

    fn generate(&self, params: &ExperimentParameters) -> Result<Circuit, CollapseError> {
        let n = params.register_size;
        if n == 0 {
            return Err(CollapseError::InvalidParameter {
                message: "entanglement spread needs at least one qubit".to_string(),
            });
        }

        let mut builder = CircuitBuilder::new(n, n)
            .named(format!("ghz_n{}_d{}", n, params.depth))
            .h(0);
        for q in 1..n {
            builder = builder.cx(0, q);
        }
        builder = builder.barrier();
        for _ in 0..params.depth {
            for q in 0..n {
                builder = builder.id(q);
            }
        }
        builder = builder.barrier();
        for q in 0..n {
            builder = builder.h(q);
        }
        for q in 0..n {
            builder = builder.measure(q, q);
        }
        builder.build()
    }

    fn extract(&self, _params: &ExperimentParameters, counts: &OutcomeCounts) -> f64 {
        parity_visibility(counts)
    }
}
