//! Persona agent decision loop

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use sim_core::rng_from_seed;

use super::persona::{Persona, PersonaProfile};
use super::state::PersonaState;
use crate::application::context::SimulationContext;
use crate::domain::levels::PriceLevels;
use crate::domain::tick::PriceTick;

/// Relative distance within which a level counts as "near".
const NEAR_LEVEL: f64 = 0.015;

/// Smallest USD balance worth attempting a buy with.
const MIN_TRADE_USD: f64 = 1.0;

/// Propensity boost when price sits near a relevant level.
const LEVEL_BOOST: f64 = 1.5;
/// Propensity boost when the profit ratio crosses the take-profit bar.
const TAKE_PROFIT_BOOST: f64 = 1.6;
/// Dip-buying boost for the trader personas.
const DIP_BOOST: f64 = 1.25;
/// Profit ratio under which trader personas buy the dip.
const DIP_RATIO: f64 = 0.92;

/// One executed agent action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Buy { tokens: u64, cost_usd: f64 },
    Sell { tokens: u64, proceeds_usd: f64 },
    Stake { tokens: u64 },
    Unstake { released: u64, fee: u64, early: bool },
}

/// Result of a successful agent turn.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: TradeAction,
    /// Tick emitted by the trade's price impact; stake/unstake move no
    /// price and carry `None`.
    pub tick: Option<PriceTick>,
}

/// A synthetic trading agent with one persona and its own RNG stream.
pub struct PersonaAgent {
    id: String,
    persona: Persona,
    profile: PersonaProfile,
    state: PersonaState,
    wallet_linked: bool,
    actions_total: u32,
    actions_remaining: u32,
    buys: u32,
    sells: u32,
    stakes: u32,
    unstakes: u32,
    rng: StdRng,
}

impl PersonaAgent {
    pub fn new(id: impl Into<String>, persona: Persona, seed: Option<u64>) -> Self {
        Self::with_profile(id, persona, persona.profile(), seed)
    }

    /// Construct with an explicit profile, bypassing the persona defaults.
    pub fn with_profile(
        id: impl Into<String>,
        persona: Persona,
        profile: PersonaProfile,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = rng_from_seed(seed);

        let (usd_lo, usd_hi) = profile.initial_usd;
        let initial_usd = if usd_hi > usd_lo {
            rng.gen_range(usd_lo..usd_hi)
        } else {
            usd_lo
        };
        let wallet_linked = rng.r#gen::<f64>() < profile.wallet_link_prob;
        let actions_total = rng.gen_range(profile.action_count.0..=profile.action_count.1);

        Self {
            id: id.into(),
            persona,
            profile,
            state: PersonaState::new(initial_usd),
            wallet_linked,
            actions_total,
            actions_remaining: actions_total,
            buys: 0,
            sells: 0,
            stakes: 0,
            unstakes: 0,
            rng,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn state(&self) -> &PersonaState {
        &self.state
    }

    pub fn wallet_linked(&self) -> bool {
        self.wallet_linked
    }

    pub fn action_counts(&self) -> (u32, u32, u32, u32) {
        (self.buys, self.sells, self.stakes, self.unstakes)
    }

    /// Whether this agent takes a turn this tick. Spreads the drawn
    /// action budget roughly evenly across the run; a taken turn consumes
    /// budget whether or not an action ends up executing.
    pub fn wants_turn(&mut self, num_ticks: u64) -> bool {
        if self.actions_remaining == 0 {
            return false;
        }
        let engage = (self.actions_total as f64 / num_ticks.max(1) as f64).min(1.0);
        if self.rng.r#gen::<f64>() < engage {
            self.actions_remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Evaluate one action in strict priority order: buy, sell, stake,
    /// unstake. The first condition that fires wins; at most one action
    /// executes. Executed buys/sells step the price through the context.
    pub fn act(&mut self, ctx: &mut SimulationContext) -> Option<ActionOutcome> {
        let price = ctx.price();
        let levels = ctx.levels();

        if self.state.usdt_balance >= MIN_TRADE_USD
            && self.rng.r#gen::<f64>() < self.buy_probability(price, &levels)
        {
            return self.try_buy(ctx);
        }

        if self.state.token_balance > 0
            && self.rng.r#gen::<f64>() < self.sell_probability(price, &levels)
        {
            return self.try_sell(ctx);
        }

        if self.state.token_balance > 0 && self.rng.r#gen::<f64>() < self.profile.stake_prob {
            return self.try_stake();
        }

        if self.state.staked_balance > 0 && self.rng.r#gen::<f64>() < self.profile.unstake_prob {
            return self.try_unstake();
        }

        None
    }

    fn buy_probability(&self, price: f64, levels: &PriceLevels) -> f64 {
        let mut p = self.profile.buy_base;

        let near_support = near(price, levels.fib_618)
            || near(price, levels.fib_55)
            || levels.supports.iter().any(|&s| near(price, s));
        if near_support {
            p *= LEVEL_BOOST;
        }

        if matches!(self.persona, Persona::SwingTrader | Persona::DayTrader)
            && self.state.profit_ratio(price) < DIP_RATIO
        {
            p *= DIP_BOOST;
        }

        p.min(0.95)
    }

    fn sell_probability(&self, price: f64, levels: &PriceLevels) -> f64 {
        let mut p = self.profile.sell_base;

        if levels.resistances.iter().any(|&r| near(price, r)) {
            p *= LEVEL_BOOST;
        }
        if self.state.profit_ratio(price) >= self.profile.take_profit_ratio {
            p *= TAKE_PROFIT_BOOST;
        }

        p.min(0.95)
    }

    /// Buy a persona-scaled amount, capped by balance and remaining
    /// supply. A depleted supply refuses the buy and emits no tick.
    fn try_buy(&mut self, ctx: &mut SimulationContext) -> Option<ActionOutcome> {
        let remaining = ctx.remaining_supply();
        if remaining == 0 {
            return None;
        }

        let price = ctx.price();
        let (lo, hi) = self.profile.trade_fraction;
        let spend = self.state.usdt_balance * self.rng.gen_range(lo..hi);
        let tokens = ((spend / price).floor() as u64).min(remaining);
        if tokens == 0 {
            return None;
        }

        let cost = self.state.record_buy(tokens, price);
        ctx.record_sold(tokens);
        let tick = ctx.step(cost, tokens, cost);
        self.buys += 1;

        Some(ActionOutcome {
            action: TradeAction::Buy {
                tokens,
                cost_usd: cost,
            },
            tick: Some(tick),
        })
    }

    fn try_sell(&mut self, ctx: &mut SimulationContext) -> Option<ActionOutcome> {
        let price = ctx.price();
        let (lo, hi) = self.profile.trade_fraction;
        let tokens = (self.state.token_balance as f64 * self.rng.gen_range(lo..hi)).floor() as u64;
        if tokens == 0 {
            return None;
        }

        let proceeds = self.state.record_sell(tokens, price);
        let tick = ctx.step(-proceeds, tokens, proceeds);
        self.sells += 1;

        Some(ActionOutcome {
            action: TradeAction::Sell {
                tokens,
                proceeds_usd: proceeds,
            },
            tick: Some(tick),
        })
    }

    fn try_stake(&mut self) -> Option<ActionOutcome> {
        let (lo, hi) = self.profile.stake_fraction;
        let tokens = (self.state.token_balance as f64 * self.rng.gen_range(lo..hi)).floor() as u64;
        if tokens == 0 {
            return None;
        }

        let staked = self.state.stake(tokens);
        self.stakes += 1;

        Some(ActionOutcome {
            action: TradeAction::Stake { tokens: staked },
            tick: None,
        })
    }

    fn try_unstake(&mut self) -> Option<ActionOutcome> {
        let (lo, hi) = self.profile.unstake_fraction;
        let tokens = (self.state.staked_balance as f64 * self.rng.gen_range(lo..hi)).floor() as u64;
        if tokens == 0 {
            return None;
        }

        let early = self.rng.r#gen::<f64>() < self.profile.early_unlock_prob;
        let (released, fee) = self.state.unstake(tokens, early);
        self.unstakes += 1;

        Some(ActionOutcome {
            action: TradeAction::Unstake {
                released,
                fee,
                early,
            },
            tick: None,
        })
    }
}

#[inline]
fn near(price: f64, level: f64) -> bool {
    level > 0.0 && ((price - level) / level).abs() < NEAR_LEVEL
}
