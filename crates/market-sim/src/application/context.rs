//! Shared simulation context
//!
//! All mutable path state lives here: current price, rolling window,
//! regime controller, swing anchors, sold-supply counter, liquidity and
//! the simulated clock. Every step goes through `&mut self`, so price
//! effects form a strict causal sequence with a single writer.

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use sim_core::{RollingWindow, rng_from_seed, standard_normal};

use crate::application::price_step::price_step;
use crate::application::simulation::MarketSimConfig;
use crate::domain::levels::{SwingAnchors, compute_levels};
use crate::domain::regime::RegimeController;
use crate::domain::tick::PriceTick;

/// Rolling window capacity in price samples.
const WINDOW_CAPACITY: usize = 800;

/// Relative volatility of the ambient liquidity walk.
const LIQUIDITY_JITTER: f64 = 0.002;

pub struct SimulationContext {
    price: f64,
    window: RollingWindow,
    regime: RegimeController,
    anchors: SwingAnchors,
    cumulative_sold: u64,
    total_supply: u64,
    liquidity_usd: f64,
    clock: DateTime<Utc>,
    tick_minutes: f64,
    ticks_emitted: u64,
    rng: StdRng,
}

impl SimulationContext {
    pub fn new(config: &MarketSimConfig) -> Self {
        let mut rng = rng_from_seed(config.seed);
        let anchors = SwingAnchors::resample(config.base_price, &mut rng);
        let regime = RegimeController::new(&mut rng);

        Self {
            price: config.base_price,
            window: RollingWindow::new(WINDOW_CAPACITY),
            regime,
            anchors,
            cumulative_sold: 0,
            total_supply: config.total_supply,
            liquidity_usd: config.initial_liquidity_usd.max(1.0),
            clock: config.start_time,
            tick_minutes: config.tick_minutes.max(1) as f64,
            ticks_emitted: 0,
            rng,
        }
    }

    #[inline]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[inline]
    pub fn cumulative_sold(&self) -> u64 {
        self.cumulative_sold
    }

    #[inline]
    pub fn remaining_supply(&self) -> u64 {
        self.total_supply - self.cumulative_sold
    }

    #[inline]
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity_usd
    }

    #[inline]
    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    #[inline]
    pub fn ticks_emitted(&self) -> u64 {
        self.ticks_emitted
    }

    /// Current technical levels over the live window and anchors.
    pub fn levels(&self) -> crate::domain::levels::PriceLevels {
        compute_levels(&self.anchors, &self.window, self.price)
    }

    /// Record tokens leaving the sale supply. Saturates at total supply.
    pub fn record_sold(&mut self, tokens: u64) {
        self.cumulative_sold = (self.cumulative_sold + tokens).min(self.total_supply);
    }

    /// Advance the path by one tick and emit the resulting record.
    ///
    /// Ambient ticks pass zero flow and volume; trade-driven ticks carry
    /// the triggering trade's signed flow and its volume.
    pub fn step(&mut self, net_flow_usd: f64, volume_tokens: u64, volume_usd: f64) -> PriceTick {
        let regime_tick = self.regime.tick(&mut self.rng);
        if regime_tick.resample_anchors {
            self.anchors = SwingAnchors::resample(self.price, &mut self.rng);
        }

        let levels = compute_levels(&self.anchors, &self.window, self.price);
        self.price = price_step(
            self.price,
            regime_tick.regime,
            net_flow_usd,
            self.liquidity_usd,
            self.tick_minutes,
            &levels,
            &mut self.rng,
        );
        self.window.push(self.price);
        self.drift_liquidity();

        self.clock += Duration::minutes(self.tick_minutes as i64);
        self.ticks_emitted += 1;

        PriceTick {
            timestamp: self.clock,
            price: self.price,
            volume_tokens,
            volume_usd,
            cumulative_sold: self.cumulative_sold,
            regime: regime_tick.regime,
            levels,
            liquidity_usd: self.liquidity_usd,
        }
    }

    // Ambient liquidity wanders slightly so impact is not perfectly
    // constant across the run. Floored above zero for the impact law.
    fn drift_liquidity(&mut self) {
        let shock = 1.0 + LIQUIDITY_JITTER * standard_normal(&mut self.rng);
        self.liquidity_usd = (self.liquidity_usd * shock).max(1.0);
    }
}
