// src/simulation/results.rs
use std::collections::BTreeMap;
use std::fmt;

/// Measurement outcome frequencies of one circuit execution.
///
/// Keys are classical-register bitstrings with classical bit 0 as the
/// right-most character. For tables produced by a backend the counts sum to
/// `shots`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeCounts {
    counts: BTreeMap<String, u64>,
    shots: u64,
}

impl OutcomeCounts {
    /// Creates an empty table for `shots` shots.
    pub(crate) fn with_shots(shots: u64) -> Self {
        Self {
            counts: BTreeMap::new(),
            shots,
        }
    }

    /// Builds a table from `(bitstring, count)` pairs; the shot count is the
    /// sum of the counts. Repeated keys are added together.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut table = Self::with_shots(0);
        for (outcome, count) in pairs {
            table.record(outcome.into(), count);
            table.shots += count;
        }
        table
    }

    /// Adds `count` occurrences of `outcome` without touching `shots`.
    pub(crate) fn record(&mut self, outcome: String, count: u64) {
        *self.counts.entry(outcome).or_insert(0) += count;
    }

    /// Occurrences of `outcome`; absent outcomes count as zero.
    pub fn get(&self, outcome: &str) -> u64 {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// Number of shots the table was sampled with.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Sum of all recorded counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates outcomes in lexicographic bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct outcomes observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Outcome Counts ({} shots):", self.shots)?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes recorded.")?;
        }
        for (outcome, count) in &self.counts {
            writeln!(f, "    {}: {}", outcome, count)?;
        }
        Ok(())
    }
}
