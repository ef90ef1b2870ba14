// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

use super::constants::collapse_constants::PROBABILITY_FLOOR;

/// Pure state of an `n`-qubit register as `2^n` complex amplitudes.
///
/// Index `k` is the basis state whose bit `q` is the value of qubit `q`.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl StateVector {
    /// Creates the all-zeros state `|0...0>` for `num_qubits` qubits.
    pub(crate) fn zeros(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self { amplitudes, num_qubits }
    }

    /// Wraps an explicit amplitude vector. The length must be a power of two.
    pub(crate) fn from_amplitudes(amplitudes: Vec<Complex<f64>>) -> Self {
        debug_assert!(amplitudes.len().is_power_of_two());
        let num_qubits = amplitudes.len().trailing_zeros() as usize;
        Self { amplitudes, num_qubits }
    }

    /// Provides read-only access to the amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Number of qubits represented.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Dimension of the vector (`2^n`).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Born-rule probabilities `|c_k|^2` for every basis state with a
    /// non-negligible weight, in ascending index order.
    pub fn probabilities(&self) -> Vec<(usize, f64)> {
        self.amplitudes
            .iter()
            .enumerate()
            .map(|(k, c)| (k, c.norm_sqr()))
            .filter(|(_, p)| *p > PROBABILITY_FLOOR)
            .collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_is_basis_state_zero() {
        let state = StateVector::zeros(3);
        assert_eq!(state.dim(), 8);
        assert_eq!(state.num_qubits(), 3);
        assert_eq!(state.probabilities(), vec![(0, 1.0)]);
    }

    #[test]
    fn from_amplitudes_infers_qubit_count() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let state = StateVector::from_amplitudes(vec![
            Complex::new(h, 0.0),
            Complex::zero(),
            Complex::zero(),
            Complex::new(0.0, h),
        ]);
        assert_eq!(state.num_qubits(), 2);
        let probs = state.probabilities();
        assert_eq!(probs.len(), 2);
        assert!((probs[0].1 - 0.5).abs() < 1e-12);
        assert_eq!(probs[1].0, 3);
    }
}
