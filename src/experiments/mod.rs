// src/experiments/mod.rs

//! Experiment protocols and the sweep runners that drive them.
//!
//! A protocol implements [`Experiment`]: it turns [`ExperimentParameters`]
//! into a circuit and turns the resulting [`OutcomeCounts`] into one scalar.
//! [`run_sweep`] executes a protocol over a list of sweep points, twice per
//! point (mass-dependent noise, then constant baseline noise), against any
//! [`Backend`].

pub mod branch;
pub mod ghz;
pub mod grover;

pub use branch::BranchIsolation;
pub use ghz::EntanglementSpread;
pub use grover::SearchAmplification;

use crate::circuits::Circuit;
use crate::core::CollapseError;
use crate::noise::{NoiseConstants, NoisePair};
use crate::simulation::{Backend, OutcomeCounts};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// Parameters of a single protocol run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperimentParameters {
    /// Qubit count (entanglement spread, search) or ancilla count (branch).
    pub register_size: usize,
    /// Idle time-slices, or search iterations.
    pub depth: usize,
    /// Shots per execution.
    pub shots: u64,
    /// Noise model constants.
    pub noise: NoiseConstants,
}

impl ExperimentParameters {
    /// Mass fed to the noise model.
    pub fn mass(&self) -> f64 {
        self.register_size as f64
    }
}

/// Seeded randomness shared by every sweep of one run.
#[derive(Debug)]
pub struct ExperimentContext {
    seed: u64,
    rng: StdRng,
}

impl ExperimentContext {
    /// Creates a context whose generator is seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generator handed to the backend.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// A decoherence protocol: circuit generation plus statistic extraction.
pub trait Experiment {
    /// Short identifier used in logs and plot titles.
    fn name(&self) -> &'static str;

    /// Builds the circuit for `params`. Equal parameters give equal circuits.
    fn generate(&self, params: &ExperimentParameters) -> Result<Circuit, CollapseError>;

    /// Reduces a backend's outcome table to the protocol's statistic.
    fn extract(&self, params: &ExperimentParameters, counts: &OutcomeCounts) -> f64;

    /// Mass used to evaluate the mass-dependent noise model.
    fn mass(&self, params: &ExperimentParameters) -> f64 {
        params.mass()
    }
}

/// Which parameter the sweep points override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAxis {
    RegisterSize,
    Depth,
}

/// Fixed part of a sweep; the swept value replaces the field named by `axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    pub axis: SweepAxis,
    pub register_size: usize,
    pub depth: usize,
    pub shots: u64,
    pub noise: NoiseConstants,
}

impl SweepConfig {
    /// Parameters for the sweep point `value`.
    pub fn parameters_at(&self, value: usize) -> ExperimentParameters {
        let (register_size, depth) = match self.axis {
            SweepAxis::RegisterSize => (value, self.depth),
            SweepAxis::Depth => (self.register_size, value),
        };
        ExperimentParameters {
            register_size,
            depth,
            shots: self.shots,
            noise: self.noise,
        }
    }
}

/// Both statistics measured at one sweep point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub value: usize,
    pub mass_statistic: f64,
    pub baseline_statistic: f64,
}

/// Index-aligned output of [`run_sweep`].
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    experiment: String,
    axis: SweepAxis,
    points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    pub fn axis(&self) -> SweepAxis {
        self.axis
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Swept values in input order.
    pub fn values(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Statistic under the mass-dependent model, aligned with [`SweepResult::values`].
    pub fn mass_series(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mass_statistic).collect()
    }

    /// Statistic under the constant baseline, aligned with [`SweepResult::values`].
    pub fn baseline_series(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.baseline_statistic).collect()
    }
}

/// Search success over an iteration axis, one row per register size.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGridResult {
    pub iterations: Vec<usize>,
    pub mass_dependent: BTreeMap<usize, Vec<f64>>,
    pub baseline: BTreeMap<usize, Vec<f64>>,
}

/// Runs `experiment` at every value in `points`.
///
/// Each point builds one circuit, lowers it, and executes it under the
/// mass-dependent model and then under the baseline with `config.shots`
/// shots. The first error aborts the sweep.
pub fn run_sweep<E, B>(
    experiment: &E,
    config: &SweepConfig,
    points: &[usize],
    backend: &B,
    ctx: &mut ExperimentContext,
) -> Result<SweepResult, CollapseError>
where
    E: Experiment + ?Sized,
    B: Backend + ?Sized,
{
    let mut results = Vec::with_capacity(points.len());
    for &value in points {
        let params = config.parameters_at(value);
        let circuit = experiment.generate(&params)?;
        let lowered = circuit.decompose()?;
        debug!(
            "{} @ {:?}={}: {} ops, {} after lowering, {} qubits",
            experiment.name(),
            config.axis,
            value,
            circuit.len(),
            lowered.len(),
            lowered.num_qubits()
        );

        let noise = NoisePair::new(experiment.mass(&params), &params.noise);
        let mass_counts = backend.execute(&lowered, &noise.mass_dependent, params.shots, ctx.rng_mut())?;
        let baseline_counts = backend.execute(&lowered, &noise.baseline, params.shots, ctx.rng_mut())?;

        let point = SweepPoint {
            value,
            mass_statistic: experiment.extract(&params, &mass_counts),
            baseline_statistic: experiment.extract(&params, &baseline_counts),
        };
        info!(
            "{} {:?}={} mass-dependent={:.4} baseline={:.4}",
            experiment.name(),
            config.axis,
            value,
            point.mass_statistic,
            point.baseline_statistic
        );
        results.push(point);
    }

    Ok(SweepResult {
        experiment: experiment.name().to_string(),
        axis: config.axis,
        points: results,
    })
}

/// Runs the search protocol for every register size over `iteration_counts`.
pub fn run_search_grid<B>(
    register_sizes: &[usize],
    iteration_counts: &[usize],
    config: &SweepConfig,
    backend: &B,
    ctx: &mut ExperimentContext,
) -> Result<SearchGridResult, CollapseError>
where
    B: Backend + ?Sized,
{
    let mut grid = SearchGridResult {
        iterations: iteration_counts.to_vec(),
        mass_dependent: BTreeMap::new(),
        baseline: BTreeMap::new(),
    };
    for &n in register_sizes {
        let row_config = SweepConfig {
            axis: SweepAxis::Depth,
            register_size: n,
            ..*config
        };
        let row = run_sweep(&SearchAmplification, &row_config, iteration_counts, backend, ctx)?;
        grid.mass_dependent.insert(n, row.mass_series());
        grid.baseline.insert(n, row.baseline_series());
    }
    Ok(grid)
}

/// Shot count actually used when a protocol imposes a floor.
pub fn effective_shots(requested: u64, floor: u64) -> u64 {
    requested.max(floor)
}
