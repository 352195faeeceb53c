//! Challenge Evaluator
//!
//! Sequences phase simulations strictly in order, aggregates their daily
//! rows and computes the profit-share payout for passed challenges.

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::rng_from_seed;
use tracing::info;

use crate::config::{ChallengeConfig, ConfigError};
use crate::phase::{DailyStat, FailReason, PhaseSimulation, PhaseVerdict};

/// Overall challenge result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeResult {
    Passed,
    Failed,
}

/// Terminal outcome of one challenge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeOutcome {
    pub result: ChallengeResult,
    pub fail_reason: Option<FailReason>,
    /// Every simulated trading day across all phases, in order.
    pub daily_stats: Vec<DailyStat>,
    /// Profit-share payout; only present on a pass.
    pub payout_amount: Option<f64>,
    /// UTC calendar month ("YYYY-MM") of the last simulated day.
    pub payout_month: Option<String>,
}

/// Evaluate one challenge instance.
///
/// Phases run strictly in order, each starting fresh at the account size
/// on the first trading day after the previous phase ended. The first
/// failed phase aborts the challenge with its reason; a phase that runs
/// out of days fails the challenge with a timeout.
pub fn evaluate(config: &ChallengeConfig) -> Result<ChallengeOutcome, ConfigError> {
    let mut config = config.clone();
    config.validate()?;

    let mut rng = rng_from_seed(config.seed);
    evaluate_with_rng(&config, &mut rng)
}

/// Evaluate a batch of independent challenge instances.
///
/// Instances share no mutable state; a config error in one does not
/// abort the others.
pub fn evaluate_many(configs: &[ChallengeConfig]) -> Vec<Result<ChallengeOutcome, ConfigError>> {
    configs.iter().map(evaluate).collect()
}

fn evaluate_with_rng(
    config: &ChallengeConfig,
    rng: &mut impl Rng,
) -> Result<ChallengeOutcome, ConfigError> {
    let pass_bias = config.pass_bias();
    let mut daily_stats: Vec<DailyStat> = Vec::new();
    let mut cursor = config.start_date;

    for rule in &config.phases {
        let sim = PhaseSimulation::new(rule.clone(), config.account_size, pass_bias);
        let outcome = sim.run(&config.trader, cursor, rng);

        let had_days = !outcome.days.is_empty();
        daily_stats.extend(outcome.days);
        if had_days {
            cursor = outcome.end_date + Duration::days(1);
        }

        match outcome.verdict {
            PhaseVerdict::Passed => continue,
            PhaseVerdict::Failed(reason) => {
                info!(phase = rule.index, ?reason, "challenge failed");
                return Ok(ChallengeOutcome {
                    result: ChallengeResult::Failed,
                    fail_reason: Some(reason),
                    daily_stats,
                    payout_amount: None,
                    payout_month: None,
                });
            }
            PhaseVerdict::Exhausted => {
                info!(phase = rule.index, "challenge timed out");
                return Ok(ChallengeOutcome {
                    result: ChallengeResult::Failed,
                    fail_reason: Some(FailReason::Timeout),
                    daily_stats,
                    payout_amount: None,
                    payout_month: None,
                });
            }
        }
    }

    let net_profit: f64 = daily_stats.iter().map(|d| d.pnl).sum();
    let payout = round_cents(net_profit.max(0.0) * config.profit_share);
    let payout_month = daily_stats
        .last()
        .map(|d| d.date.format("%Y-%m").to_string())
        .unwrap_or_else(|| config.start_date.format("%Y-%m").to_string());

    info!(payout, month = %payout_month, "challenge passed");
    Ok(ChallengeOutcome {
        result: ChallengeResult::Passed,
        fail_reason: None,
        daily_stats,
        payout_amount: Some(payout),
        payout_month: Some(payout_month),
    })
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
