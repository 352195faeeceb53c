//! Phase-Rule Evaluator
//!
//! Synthesizes a day-by-day equity curve for one challenge phase and
//! checks it against the phase's drawdown and profit-target rules. UTC
//! weekends are skipped entirely and never count against elapsed or
//! maximum days.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sim_core::standard_normal;
use tracing::debug;

use crate::config::{PhaseRule, TraderProfile};

/// Probability of a fat-tail shock on any trading day, before the
/// trader's risk factor scaling.
const TAIL_SHOCK_PROB: f64 = 0.03;
/// Shock magnitude relative to daily volatility.
const TAIL_SHOCK_SCALE: f64 = 2.8;

/// Daily return clamp.
const MIN_DAILY_RETURN: f64 = -0.045;
const MAX_DAILY_RETURN: f64 = 0.035;

/// Daily PnL clamp relative to the initial account size.
const MAX_DAILY_PNL_FRAC: f64 = 0.06;

/// Why a phase (and therefore the challenge) failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailReason {
    MaxDailyDrawdown,
    MaxTotalDrawdown,
    Timeout,
}

/// Terminal verdict of one phase run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseVerdict {
    Passed,
    Failed(FailReason),
    /// Ran out of days without passing; mapped to a timeout failure at
    /// the challenge level.
    Exhausted,
}

/// One simulated trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub balance: f64,
    pub equity: f64,
    pub pnl: f64,
    pub daily_drawdown: f64,
    pub daily_profit: f64,
    pub phase_index: usize,
    pub metadata: Option<serde_json::Value>,
}

/// Result of running one phase.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    pub verdict: PhaseVerdict,
    pub days: Vec<DailyStat>,
    /// Date of the last simulated day; start date if no day ran.
    pub end_date: NaiveDate,
    pub final_balance: f64,
}

/// Day-by-day state machine for one phase.
///
/// `run` drives the full phase from drawn returns; `apply_day` applies a
/// single known pnl and is the unit the rule checks are tested against.
pub struct PhaseSimulation {
    rule: PhaseRule,
    account_size: f64,
    pass_bias: f64,
    balance: f64,
    trading_days: u32,
    days: Vec<DailyStat>,
}

impl PhaseSimulation {
    pub fn new(rule: PhaseRule, account_size: f64, pass_bias: f64) -> Self {
        Self {
            rule,
            account_size,
            pass_bias,
            balance: account_size,
            trading_days: 0,
            days: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn trading_days(&self) -> u32 {
        self.trading_days
    }

    /// Draw one day's raw pnl from the trader profile.
    fn draw_pnl(&self, trader: &TraderProfile, rng: &mut impl Rng) -> f64 {
        let mut ret = trader.daily_drift + standard_normal(rng) * trader.daily_vol;
        if rng.r#gen::<f64>() < TAIL_SHOCK_PROB * trader.risk_factor {
            ret += standard_normal(rng) * trader.daily_vol * TAIL_SHOCK_SCALE;
        }
        let ret = ret.clamp(MIN_DAILY_RETURN, MAX_DAILY_RETURN);

        let cap = self.account_size * MAX_DAILY_PNL_FRAC;
        (ret * self.balance).clamp(-cap, cap)
    }

    /// Apply one trading day's pnl, record its row and return the verdict
    /// if the day terminates the phase.
    ///
    /// Checks run in order: daily drawdown, total drawdown, profit
    /// target. Exactly one `DailyStat` is recorded per call, including
    /// the terminating day.
    pub fn apply_day(&mut self, date: NaiveDate, pnl: f64) -> Option<PhaseVerdict> {
        let new_balance = self.balance + pnl;
        self.trading_days += 1;

        let verdict = self.check_rules(new_balance, pnl);

        let metadata = match verdict {
            Some(PhaseVerdict::Failed(reason)) => Some(json!({ "fail_reason": reason })),
            Some(PhaseVerdict::Passed) => Some(json!({ "phase_passed": true })),
            _ => None,
        };

        self.days.push(DailyStat {
            date,
            balance: new_balance,
            equity: new_balance,
            pnl,
            daily_drawdown: (-pnl).max(0.0),
            daily_profit: pnl.max(0.0),
            phase_index: self.rule.index,
            metadata,
        });
        self.balance = new_balance;

        verdict
    }

    fn check_rules(&self, new_balance: f64, pnl: f64) -> Option<PhaseVerdict> {
        if let Some(limit) = self.rule.max_daily_drawdown {
            if pnl < 0.0 && -pnl > limit * self.pass_bias {
                return Some(PhaseVerdict::Failed(FailReason::MaxDailyDrawdown));
            }
        }

        if let Some(limit) = self.rule.max_total_drawdown {
            if self.account_size - new_balance > limit * self.pass_bias {
                return Some(PhaseVerdict::Failed(FailReason::MaxTotalDrawdown));
            }
        }

        let profit = new_balance - self.account_size;
        if profit >= self.rule.profit_target && self.trading_days >= self.rule.min_trading_days {
            return Some(PhaseVerdict::Passed);
        }

        None
    }

    /// Run the phase from `start_date` until a verdict or day exhaustion.
    pub fn run(
        mut self,
        trader: &TraderProfile,
        start_date: NaiveDate,
        rng: &mut impl Rng,
    ) -> PhaseOutcome {
        let mut date = start_date;
        let mut end_date = start_date;

        while self.trading_days < self.rule.max_days {
            date = skip_weekend(date);
            let pnl = self.draw_pnl(trader, rng);
            let verdict = self.apply_day(date, pnl);
            end_date = date;
            date += Duration::days(1);

            if let Some(verdict) = verdict {
                debug!(phase = self.rule.index, ?verdict, days = self.trading_days, "phase settled");
                return PhaseOutcome {
                    verdict,
                    days: self.days,
                    end_date,
                    final_balance: self.balance,
                };
            }
        }

        debug!(phase = self.rule.index, days = self.trading_days, "phase exhausted");
        PhaseOutcome {
            verdict: PhaseVerdict::Exhausted,
            days: self.days,
            end_date,
            final_balance: self.balance,
        }
    }
}

/// First date on or after `date` that is a UTC weekday.
pub fn skip_weekend(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}
