// src/experiments/grover.rs

//! Search-amplification protocol.
//!
//! Each iteration applies the marked-state oracle (multi-controlled X onto
//! the last qubit), a Hadamard layer, the oracle again, another Hadamard
//! layer, and one idle slot per qubit. The success statistic is the
//! frequency of the all-ones outcome.
//!
//! The iteration is the two-oracle variant, not the textbook diffusion
//! operator; changing it changes every reported number.

use super::{Experiment, ExperimentParameters, SweepAxis, SweepConfig};
use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::CollapseError;
use crate::noise::NoiseConstants;
use crate::simulation::OutcomeCounts;
use crate::statistics::success_probability;

/// Register sizes, one grid row each.
pub const REGISTER_SIZES: [usize; 3] = [3, 4, 5];
pub const MAX_ITERATIONS: usize = 7;
pub const NOISE: NoiseConstants = NoiseConstants { k: 0.0015, alpha: 2.0, p_const: 0.002 };
pub const MIN_SHOTS: u64 = 1200;
pub const OUTPUT_PATH: &str = "results/grover_results.svg";

/// Iteration axis `1..=MAX_ITERATIONS`.
pub fn iteration_counts() -> Vec<usize> {
    (1..=MAX_ITERATIONS).collect()
}

/// Depth-axis config; `run_search_grid` fills in the register size per row.
pub fn default_config(shots: u64) -> SweepConfig {
    SweepConfig {
        axis: SweepAxis::Depth,
        register_size: REGISTER_SIZES[0],
        depth: 1,
        shots: super::effective_shots(shots, MIN_SHOTS),
        noise: NOISE,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchAmplification;

impl SearchAmplification {
    fn hadamard_layer(builder: CircuitBuilder, n: usize) -> CircuitBuilder {
        (0..n).fold(builder, |b, q| b.h(q))
    }
}

impl Experiment for SearchAmplification {
    fn name(&self) -> &'static str {
        "search-amplification"
    }

    fn generate(&self, params: &ExperimentParameters) -> Result<Circuit, CollapseError> {
        let n = params.register_size;
        if n < 2 {
            return Err(CollapseError::InvalidParameter {
                message: format!("search amplification needs at least two qubits, got {}", n),
            });
        }
        let controls: Vec<usize> = (0..n - 1).collect();
        let target = n - 1;

        let mut builder = CircuitBuilder::new(n, n).named(format!("grover_n{}_it{}", n, params.depth));
        builder = Self::hadamard_layer(builder, n);
        for _ in 0..params.depth {
            builder = builder.mcx(&controls, target);
            builder = Self::hadamard_layer(builder, n);
            builder = builder.mcx(&controls, target);
            builder = Self::hadamard_layer(builder, n);
            builder = (0..n).fold(builder, |b, q| b.id(q));
        }
        builder = (0..n).fold(builder, |b, q| b.measure(q, q));
        builder.build()
    }

    fn extract(&self, params: &ExperimentParameters, counts: &OutcomeCounts) -> f64 {
        success_probability(counts, params.register_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{Operation, OperationCategory};

    #[test]
    fn two_oracles_per_iteration() -> Result<(), CollapseError> {
        let params = default_config(10).parameters_at(3);
        let c = SearchAmplification.generate(&params)?;
        let oracles = c
            .operations()
            .iter()
            .filter(|op| matches!(op, Operation::MultiControlled { .. }))
            .count();
        assert_eq!(oracles, 6);
        assert_eq!(c.count_category(OperationCategory::Idle), 3 * 3);
        Ok(())
    }

    #[test]
    fn lowering_removes_oracles() -> Result<(), CollapseError> {
        let c = SearchAmplification.generate(&default_config(10).parameters_at(2))?;
        let lowered = c.decompose()?;
        assert!(lowered.operations().iter().all(|op| !matches!(op, Operation::MultiControlled { .. })));
        assert_eq!(lowered.count_category(OperationCategory::Idle), c.count_category(OperationCategory::Idle));
        Ok(())
    }

    #[test]
    fn too_small_register_rejected() {
        let params = SweepConfig { register_size: 1, ..default_config(10) }.parameters_at(2);
        let err = SearchAmplification.generate(&params).unwrap_err();
        assert!(matches!(err, CollapseError::InvalidParameter { .. }));
    }

    #[test]
    fn iteration_axis() {
        assert_eq!(iteration_counts(), vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
