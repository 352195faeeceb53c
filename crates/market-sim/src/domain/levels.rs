//! Technical Level Engine
//!
//! Fibonacci retracements from a swing low/high pair and percentile-based
//! support/resistance bands from the rolling price window. Pure
//! computation: identical inputs always yield identical levels.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use sim_core::RollingWindow;
use sim_core::rolling::percentile;

/// Minimum samples before percentile bands are meaningful.
const MIN_WINDOW_SAMPLES: usize = 20;

/// Number of recent samples the percentile bands are computed over.
const BAND_SAMPLES: usize = 200;

/// Swing low/high reference pair for Fibonacci retracement levels.
///
/// Construction orders the inputs so `high > low > 0` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingAnchors {
    low: f64,
    high: f64,
}

impl SwingAnchors {
    /// Smallest representable anchor; keeps degenerate inputs positive.
    const FLOOR: f64 = 1e-6;

    pub fn new(a: f64, b: f64) -> Self {
        let low = a.min(b).max(Self::FLOOR);
        let mut high = a.max(b).max(Self::FLOOR);
        if high <= low {
            // Equal inputs: widen so the retracement span is non-zero.
            high = low * 1.0001;
        }
        Self { low, high }
    }

    /// Resample anchors around the current price, as done on ambient
    /// regime shocks: low in [0.60, 0.92) of price, high in [1.08, 1.55).
    pub fn resample(price: f64, rng: &mut impl Rng) -> Self {
        let low = price * rng.gen_range(0.60..0.92);
        let high = price * rng.gen_range(1.08..1.55);
        Self::new(low, high)
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Technical levels in effect for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    /// 0.618 Fibonacci retracement of the swing range.
    pub fib_618: f64,
    /// 0.55 retracement of the swing range.
    pub fib_55: f64,
    /// Support band values, nearest-first.
    pub supports: Vec<f64>,
    /// Resistance band values, nearest-first.
    pub resistances: Vec<f64>,
}

/// Compute fib retracements and support/resistance bands.
///
/// With fewer than 20 window samples the bands fall back to fixed offsets
/// off the last price; otherwise they come from the 20th/30th and
/// 80th/90th percentiles of the last 200 samples.
pub fn compute_levels(
    anchors: &SwingAnchors,
    window: &RollingWindow,
    last_price: f64,
) -> PriceLevels {
    let span = anchors.high() - anchors.low();
    let fib_618 = anchors.high() - span * 0.618;
    let fib_55 = anchors.high() - span * 0.55;

    let (supports, resistances) = if window.len() < MIN_WINDOW_SAMPLES {
        (vec![last_price * 0.92], vec![last_price * 1.08])
    } else {
        let sorted = window.sorted_tail(BAND_SAMPLES);
        (
            vec![percentile(&sorted, 0.20), percentile(&sorted, 0.30)],
            vec![percentile(&sorted, 0.80), percentile(&sorted, 0.90)],
        )
    };

    PriceLevels {
        fib_618,
        fib_55,
        supports,
        resistances,
    }
}
