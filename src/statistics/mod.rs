// src/statistics/mod.rs

//! Scalar statistics extracted from outcome tables.
//!
//! Every extractor normalises by the table's shot count and treats outcomes
//! missing from the table as zero. An empty (zero-shot) table yields `0.0`.

use crate::simulation::OutcomeCounts;

fn normalise(value: f64, counts: &OutcomeCounts) -> f64 {
    match counts.shots() {
        0 => 0.0,
        shots => value / shots as f64,
    }
}

/// Parity visibility: (even-popcount counts − odd-popcount counts) / shots.
///
/// Lies in `[-1, 1]`. An ideal GHZ state read out in the X basis gives 1;
/// dephasing pulls it toward 0.
pub fn parity_visibility(counts: &OutcomeCounts) -> f64 {
    let signed: i64 = counts
        .iter()
        .map(|(bits, c)| {
            let ones = bits.chars().filter(|b| *b == '1').count();
            if ones % 2 == 0 { c as i64 } else { -(c as i64) }
        })
        .sum();
    normalise(signed as f64, counts)
}

/// Control-qubit polarisation `P(0) - P(1)` over single-bit outcomes, in `[-1, 1]`.
pub fn control_polarization(counts: &OutcomeCounts) -> f64 {
    let p0 = counts.get("0") as f64;
    let p1 = counts.get("1") as f64;
    normalise(p0 - p1, counts)
}

/// Frequency of the all-ones bitstring of width `num_bits`, in `[0, 1]`.
pub fn success_probability(counts: &OutcomeCounts, num_bits: usize) -> f64 {
    let target = "1".repeat(num_bits);
    normalise(counts.get(&target) as f64, counts)
}
