//! Bounded rolling price window with percentile access

use std::collections::VecDeque;

/// Bounded FIFO of recent prices.
///
/// Pushing beyond capacity evicts the oldest sample. Percentile queries
/// operate on a sorted copy of the most recent `n` samples.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Add a sample, evicting the oldest if the window is full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ascending sort of the most recent `n` samples (all samples if fewer).
    pub fn sorted_tail(&self, n: usize) -> Vec<f64> {
        let skip = self.values.len().saturating_sub(n);
        let mut tail: Vec<f64> = self.values.iter().skip(skip).copied().collect();
        tail.sort_by(|a, b| a.total_cmp(b));
        tail
    }
}

/// Value at percentile `p` of an ascending-sorted slice.
///
/// Uses the floor index convention: index = floor((n - 1) * p).
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p.clamp(0.0, 1.0)).floor() as usize;
    sorted[idx]
}
