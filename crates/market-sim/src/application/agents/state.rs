//! Per-agent balance state

use serde::{Deserialize, Serialize};

/// Early-unlock fee, as a divisor: released amount forfeits 1/10th.
const EARLY_UNLOCK_FEE_DIV: u64 = 10;

/// Mutable balances for one synthetic agent.
///
/// Created once at simulation start, mutated by each executed action and
/// summarized into an output row at the end. Token amounts are whole
/// tokens; USD amounts are floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaState {
    pub usdt_balance: f64,
    pub token_balance: u64,
    pub staked_balance: u64,
    /// Weighted-average cost basis per token, updated on every buy.
    pub average_cost: f64,
    /// Lifetime tokens bought; the weight behind `average_cost`.
    pub total_bought: u64,
    /// Set permanently once an early unlock is taken.
    pub dividends_disabled: bool,
}

impl PersonaState {
    pub fn new(initial_usd: f64) -> Self {
        Self {
            usdt_balance: initial_usd.max(0.0),
            token_balance: 0,
            staked_balance: 0,
            average_cost: 0.0,
            total_bought: 0,
            dividends_disabled: false,
        }
    }

    /// Current price relative to the average cost basis. 1.0 when the
    /// agent has never bought.
    pub fn profit_ratio(&self, price: f64) -> f64 {
        if self.average_cost > 0.0 {
            price / self.average_cost
        } else {
            1.0
        }
    }

    /// Liquid plus staked holdings.
    pub fn total_tokens(&self) -> u64 {
        self.token_balance + self.staked_balance
    }

    /// Apply a buy of `tokens` at `price`. Returns the USD cost.
    pub fn record_buy(&mut self, tokens: u64, price: f64) -> f64 {
        let cost = tokens as f64 * price;
        self.usdt_balance = (self.usdt_balance - cost).max(0.0);
        self.token_balance += tokens;

        let prev_weight = self.total_bought as f64;
        let new_weight = prev_weight + tokens as f64;
        if new_weight > 0.0 {
            self.average_cost =
                (self.average_cost * prev_weight + price * tokens as f64) / new_weight;
        }
        self.total_bought += tokens;
        cost
    }

    /// Apply a sell of `tokens` at `price`. Returns the USD proceeds.
    /// The sell is capped at the liquid balance.
    pub fn record_sell(&mut self, tokens: u64, price: f64) -> f64 {
        let tokens = tokens.min(self.token_balance);
        let proceeds = tokens as f64 * price;
        self.token_balance -= tokens;
        self.usdt_balance += proceeds;
        proceeds
    }

    /// Move liquid tokens into the staked balance. Returns the amount
    /// actually staked.
    pub fn stake(&mut self, tokens: u64) -> u64 {
        let tokens = tokens.min(self.token_balance);
        self.token_balance -= tokens;
        self.staked_balance += tokens;
        tokens
    }

    /// Release staked tokens back to the liquid balance.
    ///
    /// The early-unlock branch forfeits 10% of the released amount as a
    /// fee and flags the holdings as dividend-ineligible from then on.
    /// Returns (tokens received, fee forfeited).
    pub fn unstake(&mut self, tokens: u64, early: bool) -> (u64, u64) {
        let tokens = tokens.min(self.staked_balance);
        self.staked_balance -= tokens;

        let fee = if early { tokens / EARLY_UNLOCK_FEE_DIV } else { 0 };
        let released = tokens - fee;
        self.token_balance += released;
        if early {
            self.dividends_disabled = true;
        }
        (released, fee)
    }
}
