//! Challenge configuration and validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Drawdown limits are scaled by this factor on multi-phase challenges.
/// Applied identically to the daily and total checks.
const TWO_STEP_PASS_BIAS: f64 = 0.88;

/// Configuration errors surfaced before any simulation runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("challenge must have at least one phase")]
    EmptyPhases,
    #[error("account size must be positive, got {0}")]
    NonPositiveAccountSize(f64),
    #[error("profit share must be within [0, 1], got {0}")]
    ProfitShareOutOfRange(f64),
}

/// Synthetic trader performance parameters behind the daily returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraderProfile {
    /// Mean daily return as a fraction.
    pub daily_drift: f64,
    /// Daily return standard deviation as a fraction.
    pub daily_vol: f64,
    /// Scales the 3% fat-tail shock probability.
    pub risk_factor: f64,
}

impl Default for TraderProfile {
    fn default() -> Self {
        Self {
            daily_drift: 0.0008,
            daily_vol: 0.012,
            risk_factor: 1.0,
        }
    }
}

/// Rules for one challenge phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRule {
    pub index: usize,
    /// Cumulative profit required to pass, in USD.
    pub profit_target: f64,
    /// Largest tolerated single-day loss, in USD. `None` disables the check.
    pub max_daily_drawdown: Option<f64>,
    /// Largest tolerated loss from the initial balance, in USD.
    pub max_total_drawdown: Option<f64>,
    /// Trading days that must elapse before the phase can pass.
    pub min_trading_days: u32,
    /// Trading days before the phase times out.
    pub max_days: u32,
}

/// Full configuration for one challenge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    pub account_size: f64,
    /// Phases evaluated strictly in order.
    pub phases: Vec<PhaseRule>,
    /// Fraction of net profit paid out on a pass.
    pub profit_share: f64,
    pub trader: TraderProfile,
    /// First candidate trading day (UTC).
    pub start_date: NaiveDate,
    pub seed: Option<u64>,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            account_size: 10_000.0,
            phases: vec![
                PhaseRule {
                    index: 0,
                    profit_target: 800.0,
                    max_daily_drawdown: Some(500.0),
                    max_total_drawdown: Some(1_000.0),
                    min_trading_days: 5,
                    max_days: 30,
                },
                PhaseRule {
                    index: 1,
                    profit_target: 500.0,
                    max_daily_drawdown: Some(500.0),
                    max_total_drawdown: Some(1_000.0),
                    min_trading_days: 5,
                    max_days: 60,
                },
            ],
            profit_share: 0.80,
            trader: TraderProfile::default(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            seed: Some(42),
        }
    }
}

impl ChallengeConfig {
    /// Reject structurally invalid configs and clamp repairable ones.
    ///
    /// A phase demanding more trading days than it allows is clamped to
    /// `min_trading_days = max_days` rather than rejected, with a warning.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::EmptyPhases);
        }
        if self.account_size <= 0.0 {
            return Err(ConfigError::NonPositiveAccountSize(self.account_size));
        }
        if !(0.0..=1.0).contains(&self.profit_share) {
            return Err(ConfigError::ProfitShareOutOfRange(self.profit_share));
        }

        for phase in &mut self.phases {
            if phase.min_trading_days > phase.max_days {
                warn!(
                    phase = phase.index,
                    min_trading_days = phase.min_trading_days,
                    max_days = phase.max_days,
                    "min trading days exceeds max days; clamping"
                );
                phase.min_trading_days = phase.max_days;
            }
        }
        Ok(())
    }

    /// Drawdown limit multiplier: 0.88 for multi-phase challenges,
    /// 1.0 for single-phase ones.
    pub fn pass_bias(&self) -> f64 {
        if self.phases.len() >= 2 {
            TWO_STEP_PASS_BIAS
        } else {
            1.0
        }
    }
}
