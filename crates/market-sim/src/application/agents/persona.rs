//! Persona archetypes and their behavioral parameters

use serde::{Deserialize, Serialize};
use sim_core::WeightedTable;

/// Behavioral archetype assigned to a synthetic trading agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Persona {
    Whale,
    SwingTrader,
    DayTrader,
    Hodler,
    Casual,
    Inactive,
}

/// Tunable parameters for one persona.
///
/// Ranges are half-open `[lo, hi)` draws; probabilities are per evaluated
/// action, before level-proximity and profit-ratio modifiers.
#[derive(Debug, Clone)]
pub struct PersonaProfile {
    /// Initial USDT balance range.
    pub initial_usd: (f64, f64),
    /// Probability the agent links an external wallet at creation.
    pub wallet_link_prob: f64,
    /// Number of actions the agent attempts over a run.
    pub action_count: (u32, u32),
    /// Fraction of the relevant balance committed per buy/sell.
    pub trade_fraction: (f64, f64),
    /// Base buy propensity.
    pub buy_base: f64,
    /// Base sell propensity.
    pub sell_base: f64,
    /// Base stake propensity.
    pub stake_prob: f64,
    /// Base unstake propensity.
    pub unstake_prob: f64,
    /// Fraction of liquid tokens moved per stake.
    pub stake_fraction: (f64, f64),
    /// Fraction of staked tokens released per unstake.
    pub unstake_fraction: (f64, f64),
    /// Probability an unstake takes the early-unlock branch.
    pub early_unlock_prob: f64,
    /// Profit ratio above which the sell propensity is boosted.
    pub take_profit_ratio: f64,
}

impl Persona {
    pub fn profile(&self) -> PersonaProfile {
        match self {
            Persona::Whale => PersonaProfile {
                initial_usd: (50_000.0, 500_000.0),
                wallet_link_prob: 0.90,
                action_count: (8, 40),
                trade_fraction: (0.10, 0.40),
                buy_base: 0.50,
                sell_base: 0.25,
                stake_prob: 0.30,
                unstake_prob: 0.10,
                stake_fraction: (0.20, 0.60),
                unstake_fraction: (0.20, 0.50),
                early_unlock_prob: 0.05,
                take_profit_ratio: 1.50,
            },
            Persona::SwingTrader => PersonaProfile {
                initial_usd: (2_000.0, 20_000.0),
                wallet_link_prob: 0.70,
                action_count: (20, 120),
                trade_fraction: (0.10, 0.35),
                buy_base: 0.45,
                sell_base: 0.40,
                stake_prob: 0.15,
                unstake_prob: 0.15,
                stake_fraction: (0.10, 0.40),
                unstake_fraction: (0.30, 0.80),
                early_unlock_prob: 0.10,
                take_profit_ratio: 1.25,
            },
            Persona::DayTrader => PersonaProfile {
                initial_usd: (1_000.0, 10_000.0),
                wallet_link_prob: 0.80,
                action_count: (60, 300),
                trade_fraction: (0.15, 0.50),
                buy_base: 0.50,
                sell_base: 0.50,
                stake_prob: 0.05,
                unstake_prob: 0.20,
                stake_fraction: (0.05, 0.20),
                unstake_fraction: (0.50, 1.00),
                early_unlock_prob: 0.15,
                take_profit_ratio: 1.08,
            },
            Persona::Hodler => PersonaProfile {
                initial_usd: (500.0, 8_000.0),
                wallet_link_prob: 0.60,
                action_count: (4, 20),
                trade_fraction: (0.30, 0.80),
                buy_base: 0.55,
                sell_base: 0.05,
                stake_prob: 0.60,
                unstake_prob: 0.05,
                stake_fraction: (0.50, 1.00),
                unstake_fraction: (0.10, 0.40),
                early_unlock_prob: 0.02,
                take_profit_ratio: 2.00,
            },
            Persona::Casual => PersonaProfile {
                initial_usd: (100.0, 2_000.0),
                wallet_link_prob: 0.40,
                action_count: (2, 12),
                trade_fraction: (0.20, 0.60),
                buy_base: 0.35,
                sell_base: 0.20,
                stake_prob: 0.20,
                unstake_prob: 0.10,
                stake_fraction: (0.20, 0.70),
                unstake_fraction: (0.30, 0.90),
                early_unlock_prob: 0.10,
                take_profit_ratio: 1.30,
            },
            Persona::Inactive => PersonaProfile {
                initial_usd: (0.0, 500.0),
                wallet_link_prob: 0.20,
                action_count: (0, 3),
                trade_fraction: (0.10, 0.40),
                buy_base: 0.10,
                sell_base: 0.05,
                stake_prob: 0.05,
                unstake_prob: 0.02,
                stake_fraction: (0.10, 0.50),
                unstake_fraction: (0.20, 0.80),
                early_unlock_prob: 0.05,
                take_profit_ratio: 1.40,
            },
        }
    }

    /// Population mix used when assigning personas to a batch of agents.
    /// Whales are rare; casual and low-activity accounts dominate.
    pub fn assignment_table() -> WeightedTable<Persona> {
        WeightedTable::new(vec![
            (Persona::Whale, 3.0),
            (Persona::SwingTrader, 18.0),
            (Persona::DayTrader, 12.0),
            (Persona::Hodler, 22.0),
            (Persona::Casual, 30.0),
            (Persona::Inactive, 15.0),
        ])
    }
}
