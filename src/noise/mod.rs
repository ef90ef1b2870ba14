// src/noise/mod.rs

//! Noise model builder.
//!
//! Turns a scalar "mass" into a per-idle dephasing probability
//! `p(m) = 1 - exp(-k * m^alpha)` and packages it, or a constant baseline
//! probability, as a [`NoiseSpec`] keyed by [`OperationCategory`].
//!
//! The channel attached to a category is phase damping with parameter
//! `λ = p`: Kraus operators `diag(1, sqrt(1-λ))` and `[[0,0],[0,sqrt(λ)]]`.
//! It scales the off-diagonal coherence by `sqrt(1-λ)`, which is the same
//! channel as a Pauli-Z applied with probability `(1 - sqrt(1-λ)) / 2`.

use crate::operations::OperationCategory;
use std::collections::BTreeMap;
use std::fmt;

/// Mass-dependent dephasing probability `1 - exp(-k * m^alpha)`.
///
/// For finite `m >= 0` and `k >= 0` the result lies in `[0, 1)`, is `0` at
/// `m = 0` (for `alpha > 0`) and is non-decreasing in `m`. Negative masses are
/// outside the model and must not be passed.
pub fn dephasing_probability(m: f64, k: f64, alpha: f64) -> f64 {
    debug_assert!(m >= 0.0, "mass must be non-negative, got {}", m);
    debug_assert!(k >= 0.0, "k must be non-negative, got {}", k);
    // -expm1(-x) is 1 - exp(-x) without cancellation for small x
    -(-k * m.powf(alpha)).exp_m1()
}

/// Model constants for one experiment protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConstants {
    /// Rate prefactor `k`.
    pub k: f64,
    /// Mass exponent `alpha`.
    pub alpha: f64,
    /// Baseline probability used by the constant model.
    pub p_const: f64,
}

impl NoiseConstants {
    /// Bundles the three constants.
    pub fn new(k: f64, alpha: f64, p_const: f64) -> Self {
        Self { k, alpha, p_const }
    }
}

/// Mapping from operation category to a dephasing probability in `[0, 1)`.
///
/// The channel applies uniformly to every qubit. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSpec {
    channels: BTreeMap<OperationCategory, f64>,
}

impl NoiseSpec {
    /// No channel on any category.
    pub fn noiseless() -> Self {
        Self { channels: BTreeMap::new() }
    }

    /// Idle dephasing whose probability grows with mass `m`.
    pub fn mass_dependent(m: f64, k: f64, alpha: f64) -> Self {
        Self::idle(dephasing_probability(m, k, alpha))
    }

    /// Idle dephasing with a fixed probability `p_const` (`0 <= p_const < 1`).
    pub fn constant(p_const: f64) -> Self {
        debug_assert!(
            (0.0..1.0).contains(&p_const),
            "constant dephasing probability must be in [0, 1), got {}",
            p_const
        );
        Self::idle(p_const)
    }

    fn idle(p: f64) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(OperationCategory::Idle, p);
        Self { channels }
    }

    /// Dephasing probability attached to `category`, if any.
    pub fn dephasing(&self, category: OperationCategory) -> Option<f64> {
        self.channels.get(&category).copied()
    }

    /// Probability of a Pauli-Z flip that reproduces the phase-damping
    /// channel of `category`. Zero when no channel is attached.
    pub fn phase_flip_probability(&self, category: OperationCategory) -> f64 {
        match self.dephasing(category) {
            Some(lambda) => (1.0 - (1.0 - lambda).max(0.0).sqrt()) / 2.0,
            None => 0.0,
        }
    }

    /// Returns `true` if no category carries a channel.
    pub fn is_noiseless(&self) -> bool {
        self.channels.values().all(|p| *p == 0.0)
    }
}

impl fmt::Display for NoiseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.channels.is_empty() {
            return write!(f, "Noise[none]");
        }
        write!(f, "Noise[")?;
        for (i, (category, p)) in self.channels.iter().enumerate() {
            write!(f, "{}{:?}: p={:.5}", if i > 0 { ", " } else { "" }, category, p)?;
        }
        write!(f, "]")
    }
}

/// The two noise specifications every sweep point is executed under.
#[derive(Debug, Clone, PartialEq)]
pub struct NoisePair {
    /// Mass-dependent model evaluated at the point's mass.
    pub mass_dependent: NoiseSpec,
    /// Constant baseline model.
    pub baseline: NoiseSpec,
}

impl NoisePair {
    /// Builds both specs for a given mass.
    pub fn new(mass: f64, constants: &NoiseConstants) -> Self {
        Self {
            mass_dependent: NoiseSpec::mass_dependent(mass, constants.k, constants.alpha),
            baseline: NoiseSpec::constant(constants.p_const),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mass_means_no_dephasing() {
        assert_eq!(dephasing_probability(0.0, 0.02, 2.0), 0.0);
        assert_eq!(dephasing_probability(0.0, 0.02, 1.0), 0.0);
    }

    #[test]
    fn matches_closed_form() {
        let p = dephasing_probability(4.0, 0.02, 2.0);
        let expected = 1.0 - (-0.02f64 * 16.0).exp();
        assert!((p - expected).abs() < 1e-12);
    }

    #[test]
    fn mass_dependent_spec_uses_idle_category() {
        let spec = NoiseSpec::mass_dependent(2.0, 0.02, 1.0);
        let p = spec.dephasing(OperationCategory::Idle).unwrap();
        assert!((p - (1.0 - (-0.04f64).exp())).abs() < 1e-12);
        assert!(!spec.is_noiseless());
    }

    #[test]
    fn constant_spec_keeps_probability() {
        let spec = NoiseSpec::constant(0.01);
        assert_eq!(spec.dephasing(OperationCategory::Idle), Some(0.01));
    }

    #[test]
    fn noiseless_has_no_channel() {
        let spec = NoiseSpec::noiseless();
        assert_eq!(spec.dephasing(OperationCategory::Idle), None);
        assert_eq!(spec.phase_flip_probability(OperationCategory::Idle), 0.0);
        assert!(spec.is_noiseless());
    }

    #[test]
    fn phase_flip_reproduces_coherence_decay() {
        // Z with probability q scales coherence by 1 - 2q; phase damping by sqrt(1 - λ)
        let lambda = 0.3;
        let q = NoiseSpec::constant(lambda).phase_flip_probability(OperationCategory::Idle);
        assert!(((1.0 - 2.0 * q) - (1.0f64 - lambda).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn pair_evaluates_mass_model_at_point() {
        let constants = NoiseConstants::new(0.02, 2.0, 0.01);
        let pair = NoisePair::new(3.0, &constants);
        assert_eq!(pair.baseline, NoiseSpec::constant(0.01));
        assert_eq!(pair.mass_dependent, NoiseSpec::mass_dependent(3.0, 0.02, 2.0));
    }
}
