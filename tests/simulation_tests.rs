// tests/simulation_tests.rs

// Import necessary types from the collapse crate
use collapse::experiments::{BranchIsolation, EntanglementSpread, SearchAmplification, ghz};
use collapse::statistics::{control_polarization, parity_visibility, success_probability};
use collapse::{
    Backend, CircuitBuilder, CollapseError, Experiment, ExperimentParameters, NoiseConstants,
    NoiseSpec, OutcomeCounts, Simulator,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TOLERANCE: f64 = 1e-12;

fn params(register_size: usize, depth: usize, shots: u64) -> ExperimentParameters {
    ExperimentParameters {
        register_size,
        depth,
        shots,
        noise: NoiseConstants::new(0.02, 2.0, 0.01),
    }
}

// Helper: generate, lower and execute one protocol circuit.
fn execute<E: Experiment>(
    experiment: &E,
    p: &ExperimentParameters,
    noise: &NoiseSpec,
    seed: u64,
) -> Result<OutcomeCounts, CollapseError> {
    let circuit = experiment.generate(p)?.decompose()?;
    Simulator::new().execute(&circuit, noise, p.shots, &mut StdRng::seed_from_u64(seed))
}

#[test]
fn test_noiseless_ghz_parity_is_one() -> Result<(), CollapseError> {
    for n in [1, 2, 5] {
        let p = params(n, 3, 400);
        let counts = execute(&EntanglementSpread, &p, &NoiseSpec::noiseless(), 11)?;
        assert_eq!(counts.total(), 400);
        let v = parity_visibility(&counts);
        assert!((v - 1.0).abs() < TOLERANCE, "n={} visibility {}", n, v);
    }
    Ok(())
}

#[test]
fn test_noiseless_branch_polarization_is_one() -> Result<(), CollapseError> {
    for m in [0, 1, 4] {
        let p = params(m, 5, 300);
        let counts = execute(&BranchIsolation, &p, &NoiseSpec::noiseless(), 5)?;
        assert_eq!(counts.get("0"), 300, "m={}", m);
        assert!((control_polarization(&counts) - 1.0).abs() < TOLERANCE);
    }
    Ok(())
}

#[test]
fn test_branch_without_ancillas_ignores_noise() -> Result<(), CollapseError> {
    // no ancillas means no idle slots, so no dephasing sites
    let p = params(0, 25, 200);
    let counts = execute(&BranchIsolation, &p, &NoiseSpec::constant(0.9), 5)?;
    assert_eq!(counts.get("0"), 200);
    Ok(())
}

#[test]
fn test_counts_sum_to_shots_under_noise() -> Result<(), CollapseError> {
    let p = params(4, 20, 777);
    let noise = NoiseSpec::mass_dependent(p.mass(), p.noise.k, p.noise.alpha);
    let counts = execute(&EntanglementSpread, &p, &noise, 99)?;
    assert_eq!(counts.shots(), 777);
    assert_eq!(counts.total(), 777);
    assert!(counts.iter().all(|(bits, _)| bits.len() == 4));
    Ok(())
}

#[test]
fn test_strong_dephasing_destroys_parity() -> Result<(), CollapseError> {
    // lambda close to one on every idle of a 10-qubit GHZ state
    let p = params(10, ghz::IDLE_SLICES, 2000);
    let counts = execute(&EntanglementSpread, &p, &NoiseSpec::constant(0.99), 3)?;
    assert!(parity_visibility(&counts).abs() < 0.1);
    Ok(())
}

#[test]
fn test_lowered_multi_controlled_x_flips_only_on_all_ones() -> Result<(), CollapseError> {
    let sim = Simulator::new();
    let mut rng = StdRng::seed_from_u64(1);

    let all_set = CircuitBuilder::new(4, 4)
        .x(0)
        .x(1)
        .x(2)
        .mcx(&[0, 1, 2], 3)
        .measure(0, 0)
        .measure(1, 1)
        .measure(2, 2)
        .measure(3, 3)
        .build()?
        .decompose()?;
    let counts = sim.execute(&all_set, &NoiseSpec::noiseless(), 50, &mut rng)?;
    assert_eq!(counts.get("1111"), 50);

    let one_missing = CircuitBuilder::new(4, 4)
        .x(0)
        .x(2)
        .mcx(&[0, 1, 2], 3)
        .measure(0, 0)
        .measure(1, 1)
        .measure(2, 2)
        .measure(3, 3)
        .build()?
        .decompose()?;
    let counts = sim.execute(&one_missing, &NoiseSpec::noiseless(), 50, &mut rng)?;
    assert_eq!(counts.get("0101"), 50);
    Ok(())
}

#[test]
fn test_unlowered_oracle_is_rejected() -> Result<(), CollapseError> {
    let circuit = SearchAmplification.generate(&params(3, 1, 10))?;
    let err = Simulator::new()
        .execute(&circuit, &NoiseSpec::noiseless(), 10, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(err, CollapseError::InvalidOperation { .. }));
    Ok(())
}

#[test]
fn test_search_statistic_is_a_probability() -> Result<(), CollapseError> {
    for depth in 1..=3 {
        let p = params(3, depth, 500);
        let counts = execute(&SearchAmplification, &p, &NoiseSpec::constant(0.002), 21)?;
        let s = success_probability(&counts, 3);
        assert!((0.0..=1.0).contains(&s));
        assert_eq!(s, SearchAmplification.extract(&p, &counts));
    }
    Ok(())
}

#[test]
fn test_seed_reproduces_counts() -> Result<(), CollapseError> {
    let p = params(6, 20, 500);
    let noise = NoiseSpec::constant(0.05);
    let a = execute(&EntanglementSpread, &p, &noise, 42)?;
    let b = execute(&EntanglementSpread, &p, &noise, 42)?;
    assert_eq!(a, b);
    Ok(())
}
