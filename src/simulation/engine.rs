// src/simulation/engine.rs
use crate::circuits::Circuit;
use crate::core::{CollapseError, MAX_QUBITS, QubitId, StateVector};
use crate::noise::NoiseSpec;
use crate::operations::{Gate, Operation, OperationCategory};
use num_complex::Complex;
use std::collections::BTreeMap;

/// One executable step of a compiled circuit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step<'a> {
    /// A gate from the circuit.
    Unitary(&'a Operation),
    /// A merged run of idle slots on `qubit`; flips with the probability of
    /// dephasing site `site`.
    Dephase { qubit: QubitId, site: usize },
}

/// A circuit prepared for trajectory sampling under one noise spec.
#[derive(Debug, Clone)]
pub(crate) struct Schedule<'a> {
    pub(crate) num_qubits: usize,
    pub(crate) num_clbits: usize,
    pub(crate) steps: Vec<Step<'a>>,
    /// Z-flip probability of every dephasing site, indexed by `site`.
    pub(crate) flip_probabilities: Vec<f64>,
    /// Terminal measurements as `(qubit, clbit)` in circuit order.
    pub(crate) measurements: Vec<(QubitId, usize)>,
}

/// Probability that an odd number of two independent flips happened.
fn combine_flips(a: f64, b: f64) -> f64 {
    a + b - 2.0 * a * b
}

/// Compiles `circuit` for sampling under `noise`.
///
/// Idle slots become dephasing sites. Consecutive idles on one qubit with no
/// gate on that qubit in between collapse into a single site, which is exact
/// because Z errors only matter through their parity. Barriers are dropped.
pub(crate) fn compile<'a>(circuit: &'a Circuit, noise: &NoiseSpec) -> Result<Schedule<'a>, CollapseError> {
    let n = circuit.num_qubits();
    let p_idle = noise.phase_flip_probability(OperationCategory::Idle);

    let mut schedule = Schedule {
        num_qubits: n,
        num_clbits: circuit.num_clbits(),
        steps: Vec::with_capacity(circuit.len()),
        flip_probabilities: Vec::new(),
        measurements: Vec::new(),
    };
    let mut pending = vec![0.0f64; n];
    let mut measured = vec![false; n];

    fn flush(schedule: &mut Schedule<'_>, pending: &mut [f64], qubit: QubitId) {
        let p = pending[qubit.index()];
        if p > 0.0 {
            let site = schedule.flip_probabilities.len();
            schedule.flip_probabilities.push(p);
            schedule.steps.push(Step::Dephase { qubit, site });
            pending[qubit.index()] = 0.0;
        }
    }

    for (position, op) in circuit.operations().iter().enumerate() {
        match op {
            Operation::Barrier { .. } => {}
            Operation::Idle { target } => {
                let q = target.index();
                pending[q] = combine_flips(pending[q], p_idle);
            }
            Operation::Measure { qubit, clbit } => {
                flush(&mut schedule, &mut pending, *qubit);
                measured[qubit.index()] = true;
                schedule.measurements.push((*qubit, *clbit));
            }
            Operation::MultiControlled { .. } => {
                return Err(CollapseError::InvalidOperation {
                    message: format!(
                        "operation {} is a multi-controlled gate; lower the circuit with decompose() before execution",
                        position
                    ),
                });
            }
            Operation::Gate { .. } | Operation::Controlled { .. } => {
                for qubit in op.involved_qubits() {
                    if measured[qubit.index()] {
                        return Err(CollapseError::InvalidOperation {
                            message: format!(
                                "operation {} acts on {} after it was measured; only terminal measurements are supported",
                                position, qubit
                            ),
                        });
                    }
                    flush(&mut schedule, &mut pending, qubit);
                }
                schedule.steps.push(Step::Unitary(op));
            }
        }
    }
    // Dephasing left pending on a qubit after its last gate cannot change
    // computational-basis statistics, so it is dropped.
    Ok(schedule)
}

/// Evolves a state vector through a schedule for one flip pattern.
pub(crate) struct SimulationEngine {
    state: StateVector,
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes `|0...0>` for `num_qubits` qubits.
    pub(crate) fn init(num_qubits: usize) -> Result<Self, CollapseError> {
        if num_qubits == 0 {
            return Err(CollapseError::InvalidOperation {
                message: "Cannot initialize simulation engine with zero qubits".to_string(),
            });
        }
        if num_qubits > MAX_QUBITS {
            return Err(CollapseError::InvalidParameter {
                message: format!(
                    "{} qubits exceed the state-vector limit of {}",
                    num_qubits, MAX_QUBITS
                ),
            });
        }
        Ok(Self {
            state: StateVector::zeros(num_qubits),
            num_qubits,
        })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<(), CollapseError> {
        if state.dim() != self.state.dim() {
            Err(CollapseError::SimulationError {
                message: format!(
                    "Cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.state.dim()
                ),
            })
        } else {
            self.state = state;
            Ok(())
        }
    }

    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    pub(crate) fn into_state(self) -> StateVector {
        self.state
    }

    /// Runs every step of `schedule`; `flips[site]` says whether dephasing
    /// site `site` applies its Z in this trajectory.
    pub(crate) fn run_schedule(&mut self, schedule: &Schedule<'_>, flips: &[bool]) -> Result<(), CollapseError> {
        for step in &schedule.steps {
            match step {
                Step::Unitary(op) => self.apply_operation(op)?,
                Step::Dephase { qubit, site } => {
                    if flips.get(*site).copied().unwrap_or(false) {
                        self.apply_single_qubit_gate(qubit.index(), &Gate::PauliZ.matrix())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Applies a gate operation. Idles and barriers leave the state alone;
    /// measurements are handled by the caller.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<(), CollapseError> {
        match op {
            Operation::Gate { target, gate } => {
                let idx = self.check_index(*target)?;
                self.apply_single_qubit_gate(idx, &gate.matrix())?;
            }
            Operation::Controlled { control, target, gate } => {
                let c = self.check_index(*control)?;
                let t = self.check_index(*target)?;
                if c == t {
                    return Err(CollapseError::InvalidOperation {
                        message: "Control and target qubits cannot be the same for controlled operation".to_string(),
                    });
                }
                self.apply_controlled_gate(c, t, &gate.matrix());
            }
            Operation::Idle { .. } | Operation::Barrier { .. } => {}
            Operation::MultiControlled { .. } => {
                return Err(CollapseError::InvalidOperation {
                    message: "Multi-controlled gates must be decomposed before execution".to_string(),
                });
            }
            Operation::Measure { .. } => {
                return Err(CollapseError::InvalidOperation {
                    message: "Measure operation should not be passed directly to apply_operation".to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_index(&self, qubit: QubitId) -> Result<usize, CollapseError> {
        if qubit.index() < self.num_qubits {
            Ok(qubit.index())
        } else {
            Err(CollapseError::ReferenceViolation {
                message: format!("{} not found in a register of {} qubits", qubit, self.num_qubits),
            })
        }
    }

    /// Applies a 2x2 matrix to qubit `target`.
    fn apply_single_qubit_gate(&mut self, target: usize, matrix: &[[Complex<f64>; 2]; 2]) -> Result<(), CollapseError> {
        let k_mask = 1usize << target; // Mask for the target bit
        let lower_mask = k_mask - 1; // Mask for bits to the right
        let upper_mask = !lower_mask; // Counter bits shifted past the target

        let dim = self.state.dim();
        let amplitudes = self.state.amplitudes_mut();

        // Iterate over pairs of basis states differing only at the target bit
        for i in 0..dim / 2 {
            let i0 = ((i & upper_mask) << 1) | (i & lower_mask);
            let i1 = i0 | k_mask;
            if i1 >= dim {
                return Err(CollapseError::SimulationError {
                    message: format!("Index out of bounds during single qubit gate. i0={}, i1={}, dim={}", i0, i1, dim),
                });
            }
            let psi_0 = amplitudes[i0];
            let psi_1 = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
        Ok(())
    }

    /// Applies `matrix` to `target` on the subspace where `control` is 1.
    fn apply_controlled_gate(&mut self, control: usize, target: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let c_mask = 1usize << control;
        let t_mask = 1usize << target;
        let amplitudes = self.state.amplitudes_mut();
        for i0 in 0..amplitudes.len() {
            if i0 & c_mask == 0 || i0 & t_mask != 0 {
                continue;
            }
            let i1 = i0 | t_mask;
            let psi_0 = amplitudes[i0];
            let psi_1 = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }
}

/// Classical-register distribution of a final state: the probability of
/// every bitstring the terminal measurements can write.
pub(crate) fn measurement_distribution(
    state: &StateVector,
    measurements: &[(QubitId, usize)],
    num_clbits: usize,
) -> Vec<(String, f64)> {
    let mut distribution: BTreeMap<String, f64> = BTreeMap::new();
    for (k, p) in state.probabilities() {
        let mut bits = vec!['0'; num_clbits];
        for (qubit, clbit) in measurements {
            bits[num_clbits - 1 - clbit] = if (k >> qubit.index()) & 1 == 1 { '1' } else { '0' };
        }
        *distribution.entry(bits.into_iter().collect()).or_insert(0.0) += p;
    }
    distribution.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use num_traits::Zero;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    /// Asserts that two complex state vectors are approximately equal component-wise.
    fn assert_complex_vec_approx_equal(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i, actual[i], expected[i], context
            );
        }
    }

    #[test]
    fn bell_pair_amplitudes() -> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(2, 2).h(0).cx(0, 1).build()?;
        let schedule = compile(&circuit, &NoiseSpec::noiseless())?;
        let mut engine = SimulationEngine::init(2)?;
        engine.run_schedule(&schedule, &[])?;
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert_complex_vec_approx_equal(
            engine.state().amplitudes(),
            &[h, Complex::zero(), Complex::zero(), h],
            "H(0) CX(0,1) on |00>",
        );
        Ok(())
    }

    #[test]
    fn little_endian_qubit_order() -> Result<(), CollapseError> {
        // X on qubit 1 gives basis index 0b10
        let circuit = CircuitBuilder::new(2, 2).x(1).build()?;
        let schedule = compile(&circuit, &NoiseSpec::noiseless())?;
        let mut engine = SimulationEngine::init(2)?;
        engine.run_schedule(&schedule, &[])?;
        assert_eq!(engine.state().probabilities(), vec![(2, 1.0)]);
        Ok(())
    }

    #[test]
    fn single_qubit_gate_touches_every_pair() -> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(3, 3).x(0).x(2).h(1).build()?;
        let schedule = compile(&circuit, &NoiseSpec::noiseless())?;
        let mut engine = SimulationEngine::init(3)?;
        engine.run_schedule(&schedule, &[])?;
        let probs = engine.state().probabilities();
        assert_eq!(probs.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![0b101, 0b111]);
        assert!(probs.iter().all(|(_, p)| (p - 0.5).abs() < TEST_TOLERANCE));
        Ok(())
    }

    #[test]
    fn idle_runs_merge_into_one_site()-> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(2, 2)
            .h(0)
            .barrier()
            .id(0)
            .id(1)
            .id(0)
            .id(1)
            .barrier()
            .h(0)
            .h(1)
            .measure(0, 0)
            .measure(1, 1)
            .build()?;
        let noise = NoiseSpec::constant(0.2);
        let q = noise.phase_flip_probability(OperationCategory::Idle);
        let schedule = compile(&circuit, &noise)?;
        assert_eq!(schedule.flip_probabilities.len(), 2);
        for p in &schedule.flip_probabilities {
            assert!((p - combine_flips(q, q)).abs() < 1e-15);
        }
        assert_eq!(schedule.measurements, vec![(QubitId(0), 0), (QubitId(1), 1)]);
        Ok(())
    }

    #[test]
    fn noiseless_compile_has_no_sites() -> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(1, 1).id(0).h(0).measure(0, 0).build()?;
        let schedule = compile(&circuit, &NoiseSpec::noiseless())?;
        assert!(schedule.flip_probabilities.is_empty());
        assert_eq!(schedule.steps.len(), 1);
        Ok(())
    }

    #[test]
    fn compile_rejects_unlowered_oracle() -> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(3, 3).mcx(&[0, 1], 2).build()?;
        let err = compile(&circuit, &NoiseSpec::noiseless()).unwrap_err();
        assert!(matches!(err, CollapseError::InvalidOperation { .. }));
        Ok(())
    }

    #[test]
    fn compile_rejects_gate_after_measure() -> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(1, 1).measure(0, 0).h(0).build()?;
        let err = compile(&circuit, &NoiseSpec::noiseless()).unwrap_err();
        assert!(matches!(err, CollapseError::InvalidOperation { .. }));
        Ok(())
    }

    #[test]
    fn phase_flip_on_plus_state_gives_minus() -> Result<(), CollapseError> {
        let circuit = CircuitBuilder::new(1, 1).h(0).id(0).h(0).measure(0, 0).build()?;
        let schedule = compile(&circuit, &NoiseSpec::constant(0.5))?;
        assert_eq!(schedule.flip_probabilities.len(), 1);

        let mut clean = SimulationEngine::init(1)?;
        clean.run_schedule(&schedule, &[false])?;
        let probs = clean.state().probabilities();
        assert_eq!(probs.len(), 1);
        assert_eq!(probs[0].0, 0);
        assert!((probs[0].1 - 1.0).abs() < TEST_TOLERANCE);

        let mut flipped = SimulationEngine::init(1)?;
        flipped.run_schedule(&schedule, &[true])?;
        let probs = flipped.into_state().probabilities();
        assert_eq!(probs.len(), 1);
        assert_eq!(probs[0].0, 1);
        assert!((probs[0].1 - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn distribution_marginalises_unmeasured_qubits() -> Result<(), CollapseError> {
        let mut engine = SimulationEngine::init(2)?;
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        // (|00> + |11>)/sqrt(2), measure only qubit 1 into the single bit
        engine.set_state(StateVector::from_amplitudes(vec![h, Complex::zero(), Complex::zero(), h]))?;
        let dist = measurement_distribution(engine.state(), &[(QubitId(1), 0)], 1);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].0, "0");
        assert!((dist[0].1 - 0.5).abs() < TEST_TOLERANCE);
        assert_eq!(dist[1].0, "1");
        Ok(())
    }

    #[test]
    fn init_rejects_empty_and_oversized_registers() {
        assert!(matches!(SimulationEngine::init(0), Err(CollapseError::InvalidOperation { .. })));
        assert!(matches!(
            SimulationEngine::init(MAX_QUBITS + 1),
            Err(CollapseError::InvalidParameter { .. })
        ));
    }
}
