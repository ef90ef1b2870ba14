// src/simulation/mod.rs

//! Noisy execution of `collapse::circuits::Circuit`.
//!
//! The experiment runners only see the [`Backend`] trait: a circuit, a noise
//! specification and a shot count go in, an [`OutcomeCounts`] table comes
//! out. [`Simulator`] is the state-vector implementation used by the CLI.

mod results;
pub(crate) mod engine;

pub use results::OutcomeCounts;

use crate::circuits::Circuit;
use crate::core::{CollapseError, MAX_QUBITS};
use crate::noise::NoiseSpec;
use crate::validation::{check_counts, check_normalization};
use engine::{SimulationEngine, compile, measurement_distribution};
use log::{debug, trace};
use rand::{Rng, RngCore};
use rand::distributions::{Distribution, WeightedIndex};
use std::collections::BTreeMap;

/// Executes circuits under a noise specification and samples outcomes.
pub trait Backend {
    /// Runs `circuit` for `shots` shots under `noise`, drawing all
    /// randomness from `rng`. The returned counts sum to `shots`.
    fn execute(
        &self,
        circuit: &Circuit,
        noise: &NoiseSpec,
        shots: u64,
        rng: &mut dyn RngCore,
    ) -> Result<OutcomeCounts, CollapseError>;
}

/// Quantum-trajectory state-vector sampler.
///
/// Every shot draws a Z-flip pattern over the circuit's dephasing sites.
/// Shots sharing a pattern share one state-vector evolution, after which
/// their outcomes are sampled from the classical-register distribution.
/// Idle slots are always kept as noise sites.
#[derive(Debug, Default)] // Allows Simulator::default() -> Simulator::new()
pub struct Simulator {}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for Simulator {
    fn execute(
        &self,
        circuit: &Circuit,
        noise: &NoiseSpec,
        shots: u64,
        rng: &mut dyn RngCore,
    ) -> Result<OutcomeCounts, CollapseError> {
        if shots == 0 {
            return Err(CollapseError::InvalidParameter {
                message: "shot count must be positive".to_string(),
            });
        }
        if circuit.num_qubits() > MAX_QUBITS {
            return Err(CollapseError::InvalidParameter {
                message: format!(
                    "circuit '{}' has {} qubits, the simulator supports at most {}",
                    circuit.name(),
                    circuit.num_qubits(),
                    MAX_QUBITS
                ),
            });
        }
        circuit.validate()?;
        trace!("executing\n{}", circuit);

        let schedule = compile(circuit, noise)?;
        if schedule.measurements.is_empty() {
            return Err(CollapseError::SimulationError {
                message: format!("circuit '{}' has no measurements", circuit.name()),
            });
        }

        // 1. Draw one flip pattern per shot and group identical patterns.
        let mut patterns: BTreeMap<Vec<bool>, u64> = BTreeMap::new();
        for _ in 0..shots {
            let flips: Vec<bool> = schedule
                .flip_probabilities
                .iter()
                .map(|p| *p > 0.0 && rng.gen_bool(p.min(1.0)))
                .collect();
            *patterns.entry(flips).or_insert(0) += 1;
        }
        debug!(
            "circuit '{}': {} dephasing sites, {} distinct trajectories over {} shots ({})",
            circuit.name(),
            schedule.flip_probabilities.len(),
            patterns.len(),
            shots,
            noise
        );

        // 2. Evolve each distinct trajectory once and sample its shots.
        let mut counts = OutcomeCounts::with_shots(shots);
        for (flips, multiplicity) in patterns {
            let mut engine = SimulationEngine::init(schedule.num_qubits)?;
            engine.run_schedule(&schedule, &flips)?;
            let state = engine.into_state();
            check_normalization(&state, None)?;

            let distribution = measurement_distribution(&state, &schedule.measurements, schedule.num_clbits);
            let sampler = WeightedIndex::new(distribution.iter().map(|(_, p)| *p)).map_err(|e| {
                CollapseError::SimulationError {
                    message: format!("cannot sample outcome distribution: {}", e),
                }
            })?;
            let mut tally = vec![0u64; distribution.len()];
            for _ in 0..multiplicity {
                tally[sampler.sample(rng)] += 1;
            }
            for ((outcome, _), count) in distribution.into_iter().zip(tally) {
                if count > 0 {
                    counts.record(outcome, count);
                }
            }
        }

        check_counts(&counts)?;
        Ok(counts)
    }
}
