// src/experiments/branch.rs

//! Branch-isolation protocol.
//!
//! A control qubit in superposition is copied onto `m` ancillas ("branch
//! mass"), the ancillas idle, and the copy is undone before reading the
//! control in the X basis. Any dephasing on the ancillas leaks which-branch
//! information and shows up as lost polarisation of the control.

use super::{Experiment, ExperimentParameters, SweepAxis, SweepConfig};
use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::CollapseError;
use crate::noise::NoiseConstants;
use crate::simulation::OutcomeCounts;
use crate::statistics::control_polarization;

/// Ancilla counts swept by default.
pub const ANCILLA_COUNTS: [usize; 7] = [0, 2, 4, 6, 8, 10, 12];
pub const IDLE_SLICES: usize = 25;
pub const NOISE: NoiseConstants = NoiseConstants { k: 0.02, alpha: 1.0, p_const: 0.01 };
/// Minimum shots per execution.
pub const MIN_SHOTS: u64 = 1200;
pub const OUTPUT_PATH: &str = "results/branch_mass.svg";

/// Default sweep over [`ANCILLA_COUNTS`]; the shot floor is applied here.
pub fn default_config(shots: u64) -> SweepConfig {
    SweepConfig {
        axis: SweepAxis::RegisterSize,
        register_size: ANCILLA_COUNTS[0],
        depth: IDLE_SLICES,
        shots: super::effective_shots(shots, MIN_SHOTS),
        noise: NOISE,
    }
}

/// `register_size` is the number of ancillas; the circuit has one more qubit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchIsolation;

impl Experiment for BranchIsolation {
    fn name(&self) -> &'static str {
        "branch-isolation"
    }

    fn generate(&self, params: &ExperimentParameters) -> Result<Circuit, CollapseError> {
        let m = params.register_size;
        let ancillas = 1..=m;

        let mut builder = CircuitBuilder::new(m + 1, 1)
            .named(format!("branch_m{}_d{}", m, params.depth))
            .h(0);
        for a in ancillas.clone() {
            builder = builder.cx(0, a);
        }
        builder = builder.barrier();
        for _ in 0..params.depth {
            for a in ancillas.clone() {
                builder = builder.id(a);
            }
        }
        builder = builder.barrier();
        for a in ancillas {
            builder = builder.cx(0, a);
        }
        builder.h(0).measure(0, 0).build()
    }

    fn extract(&self, _params: &ExperimentParameters, counts: &OutcomeCounts) -> f64 {
        control_polarization(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{Operation, OperationCategory};
    use crate::core::QubitId;

    #[test]
    fn idles_only_on_ancillas() -> Result<(), CollapseError> {
        let params = default_config(10).parameters_at(3);
        let c = BranchIsolation.generate(&params)?;
        assert_eq!(c.num_qubits(), 4);
        assert_eq!(c.num_clbits(), 1);
        assert_eq!(c.count_category(OperationCategory::Idle), 3 * IDLE_SLICES);
        assert!(c.operations().iter().all(|op| !matches!(op, Operation::Idle { target: QubitId(0) })));
        Ok(())
    }

    #[test]
    fn zero_ancillas() -> Result<(), CollapseError> {
        let c = BranchIsolation.generate(&default_config(10).parameters_at(0))?;
        assert_eq!(c.num_qubits(), 1);
        assert_eq!(c.count_category(OperationCategory::Idle), 0);
        Ok(())
    }

    #[test]
    fn shot_floor_applied() {
        assert_eq!(default_config(1000).shots, MIN_SHOTS);
        assert_eq!(default_config(4000).shots, 4000);
    }

    #[test]
    fn deterministic() -> Result<(), CollapseError> {
        let p = default_config(10).parameters_at(6);
        assert_eq!(BranchIsolation.generate(&p)?, BranchIsolation.generate(&p)?);
        Ok(())
    }
}
