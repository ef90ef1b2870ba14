use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use collapse::experiments::{
    self, BranchIsolation, EntanglementSpread, ExperimentContext, branch, ghz, grover,
};
use collapse::report::{plot_search_grid, plot_sweep};
use collapse::simulation::Simulator;
use env_logger::Env;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExperimentChoice {
    /// GHZ parity visibility versus register size.
    #[value(alias = "entanglement-spread")]
    Ghz,
    /// Control polarisation versus branch mass.
    #[value(alias = "branch-isolation")]
    Branch,
    /// Grover success versus iterations.
    #[value(alias = "search-amplification")]
    Grover,
    All,
}

impl ExperimentChoice {
    fn includes(self, other: ExperimentChoice) -> bool {
        self == ExperimentChoice::All || self == other
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Mass-dependent dephasing experiments", long_about = None)]
struct Cli {
    /// Which experiment to run.
    #[arg(long = "exp", value_enum, default_value_t = ExperimentChoice::All)]
    exp: ExperimentChoice,
    /// Shots per circuit execution (some protocols raise this to a floor).
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    shots: u64,
    /// Seed for all sampling randomness.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn run_ghz(shots: u64, backend: &Simulator, ctx: &mut ExperimentContext) -> Result<()> {
    let config = ghz::default_config(shots);
    let result = experiments::run_sweep(&EntanglementSpread, &config, &ghz::REGISTER_SIZES, backend, ctx)
        .context("entanglement-spread sweep failed")?;
    let path = Path::new(ghz::OUTPUT_PATH);
    plot_sweep(
        &result,
        path,
        "GHZ parity visibility vs register size",
        "number of qubits n",
        "parity visibility",
    )
    .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn run_branch(shots: u64, backend: &Simulator, ctx: &mut ExperimentContext) -> Result<()> {
    let config = branch::default_config(shots);
    let result = experiments::run_sweep(&BranchIsolation, &config, &branch::ANCILLA_COUNTS, backend, ctx)
        .context("branch-isolation sweep failed")?;
    let path = Path::new(branch::OUTPUT_PATH);
    plot_sweep(
        &result,
        path,
        "Control polarisation vs branch mass",
        "ancillas entangled with control m",
        "<X> of control",
    )
    .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn run_grover(shots: u64, backend: &Simulator, ctx: &mut ExperimentContext) -> Result<()> {
    let config = grover::default_config(shots);
    let grid = experiments::run_search_grid(
        &grover::REGISTER_SIZES,
        &grover::iteration_counts(),
        &config,
        backend,
        ctx,
    )
    .context("search-amplification grid failed")?;
    let path = Path::new(grover::OUTPUT_PATH);
    plot_search_grid(&grid, path, "Grover success vs iterations")
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    log::debug!("Running with: {cli:?}");

    fs::create_dir_all("results").context("could not create results directory")?;
    let backend = Simulator::new();
    let mut ctx = ExperimentContext::seeded(cli.seed);

    if cli.exp.includes(ExperimentChoice::Ghz) {
        run_ghz(cli.shots, &backend, &mut ctx)?;
    }
    if cli.exp.includes(ExperimentChoice::Branch) {
        run_branch(cli.shots, &backend, &mut ctx)?;
    }
    if cli.exp.includes(ExperimentChoice::Grover) {
        run_grover(cli.shots, &backend, &mut ctx)?;
    }
    Ok(())
}
