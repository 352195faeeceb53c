//! Randomness primitives
//!
//! Seeded RNG construction, standard-normal draws and a weighted-choice
//! table. Every stochastic component in the workspace draws through these
//! helpers so that a seeded run is fully reproducible.

use rand::prelude::*;
use rand_distr::StandardNormal;

/// Build an RNG from an optional seed.
///
/// `Some(seed)` gives a reproducible stream, `None` seeds from entropy.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw a single N(0, 1) sample.
#[inline]
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    rng.sample(StandardNormal)
}

/// Discrete distribution over an ordered list of (outcome, weight) pairs.
///
/// Replaces chained probability-threshold expressions with a single
/// auditable table. Non-positive weights contribute nothing; if every
/// weight is non-positive the first outcome is returned.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f64)>,
    total: f64,
}

impl<T> WeightedTable<T> {
    pub fn new(entries: Vec<(T, f64)>) -> Self {
        assert!(!entries.is_empty(), "weighted table requires at least one entry");
        let total = entries.iter().map(|(_, w)| w.max(0.0)).sum();
        Self { entries, total }
    }

    /// Sample one outcome proportionally to its weight.
    pub fn sample(&self, rng: &mut impl Rng) -> &T {
        if self.total <= 0.0 {
            return &self.entries[0].0;
        }
        let mut remaining = rng.gen_range(0.0..self.total);
        for (outcome, weight) in &self.entries {
            let weight = weight.max(0.0);
            if remaining < weight {
                return outcome;
            }
            remaining -= weight;
        }
        // Floating-point slack lands on the last entry.
        &self.entries[self.entries.len() - 1].0
    }
}
