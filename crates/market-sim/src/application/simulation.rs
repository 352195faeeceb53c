//! Market Simulation Runner
//!
//! Orchestrates the shared context and the persona agents across N ticks.
//! Every price effect runs in one strict causal sequence: an agent's trade
//! observes the current price, steps it, and only then is the next agent
//! evaluated.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::agents::{Persona, PersonaAgent, TradeAction};
use crate::application::context::SimulationContext;
use crate::domain::tick::PriceTick;

/// Which output streams the run materializes. Resolved once at startup;
/// the simulation itself runs identically either way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutputConfig {
    pub emit_price_ticks: bool,
    pub emit_trade_ledger: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            emit_price_ticks: true,
            emit_trade_ledger: true,
        }
    }
}

/// Configuration for one market simulation run.
#[derive(Debug, Clone)]
pub struct MarketSimConfig {
    /// Token symbol, carried through to logs only.
    pub symbol: String,
    /// Total sale supply in whole tokens.
    pub total_supply: u64,
    /// Starting price in USD.
    pub base_price: f64,
    /// Number of ambient ticks to simulate.
    pub num_ticks: u64,
    /// Tick duration in minutes.
    pub tick_minutes: u32,
    /// Ambient liquidity backing the impact law.
    pub initial_liquidity_usd: f64,
    /// Timestamp of the first tick.
    pub start_time: DateTime<Utc>,
    /// Random seed for determinism.
    pub seed: Option<u64>,
    pub output: OutputConfig,
}

impl Default for MarketSimConfig {
    fn default() -> Self {
        Self {
            symbol: "DEMO-USDT".to_string(),
            total_supply: 10_000_000,
            base_price: 0.5,
            num_ticks: 10_000,
            tick_minutes: 1,
            initial_liquidity_usd: 250_000.0,
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            seed: Some(42),
            output: OutputConfig::default(),
        }
    }
}

/// One row of the optional trade ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub action: TradeAction,
    /// Price after the action's impact (unchanged for stake/unstake).
    pub price: f64,
}

/// Terminal summary row for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub persona: Persona,
    pub wallet_linked: bool,
    pub usdt_balance: f64,
    pub token_balance: u64,
    pub staked_balance: u64,
    pub average_cost: f64,
    pub total_bought: u64,
    pub dividends_disabled: bool,
    pub buys: u32,
    pub sells: u32,
    pub stakes: u32,
    pub unstakes: u32,
}

/// Everything a run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutput {
    pub price_ticks: Vec<PriceTick>,
    pub trades: Vec<TradeRecord>,
    pub summaries: Vec<AgentSummary>,
}

/// Coordinates the context and agents for one run.
pub struct MarketSimulation {
    config: MarketSimConfig,
    context: SimulationContext,
    agents: Vec<PersonaAgent>,
}

impl MarketSimulation {
    pub fn new(config: MarketSimConfig) -> Self {
        let context = SimulationContext::new(&config);
        Self {
            config,
            context,
            agents: Vec::new(),
        }
    }

    pub fn add_agent(&mut self, agent: PersonaAgent) {
        self.agents.push(agent);
    }

    /// Assign personas to a batch of agent identifiers from the population
    /// mix, each agent with a seed derived from the run seed.
    pub fn spawn_agents(&mut self, ids: &[String]) {
        let table = Persona::assignment_table();
        let mut spawn_rng = sim_core::rng_from_seed(self.config.seed.map(|s| s.wrapping_add(1)));

        for (i, id) in ids.iter().enumerate() {
            let persona = *table.sample(&mut spawn_rng);
            let agent_seed = self
                .config
                .seed
                .map(|s| s.wrapping_add(1_000).wrapping_add(i as u64));
            self.agents.push(PersonaAgent::new(id, persona, agent_seed));
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn agents(&self) -> &[PersonaAgent] {
        &self.agents
    }

    /// Run the full simulation and collect its outputs.
    pub fn run(&mut self) -> RunOutput {
        let num_ticks = self.config.num_ticks;
        info!(
            symbol = %self.config.symbol,
            agents = self.agents.len(),
            ticks = num_ticks,
            "market simulation start"
        );

        let mut output = RunOutput::default();

        for _ in 0..num_ticks {
            let tick = self.context.step(0.0, 0, 0.0);
            if self.config.output.emit_price_ticks {
                output.price_ticks.push(tick);
            }

            for agent in &mut self.agents {
                if !agent.wants_turn(num_ticks) {
                    continue;
                }
                let Some(outcome) = agent.act(&mut self.context) else {
                    continue;
                };

                if self.config.output.emit_trade_ledger {
                    let timestamp = outcome
                        .tick
                        .as_ref()
                        .map(|t| t.timestamp)
                        .unwrap_or_else(|| self.context.clock());
                    output.trades.push(TradeRecord {
                        timestamp,
                        agent_id: agent.id().to_string(),
                        action: outcome.action.clone(),
                        price: self.context.price(),
                    });
                }
                if self.config.output.emit_price_ticks {
                    if let Some(tick) = outcome.tick {
                        output.price_ticks.push(tick);
                    }
                }
            }
        }

        output.summaries = self.agents.iter().map(summarize).collect();

        info!(
            symbol = %self.config.symbol,
            ticks_emitted = self.context.ticks_emitted(),
            trades = output.trades.len(),
            sold = self.context.cumulative_sold(),
            final_price = self.context.price(),
            "market simulation complete"
        );

        output
    }
}

fn summarize(agent: &PersonaAgent) -> AgentSummary {
    let state = agent.state();
    let (buys, sells, stakes, unstakes) = agent.action_counts();
    AgentSummary {
        id: agent.id().to_string(),
        persona: agent.persona(),
        wallet_linked: agent.wallet_linked(),
        usdt_balance: state.usdt_balance,
        token_balance: state.token_balance,
        staked_balance: state.staked_balance,
        average_cost: state.average_cost,
        total_bought: state.total_bought,
        dividends_disabled: state.dividends_disabled,
        buys,
        sells,
        stakes,
        unstakes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("agent-{i}")).collect()
    }

    #[test]
    fn test_run_emits_ordered_ticks() {
        let config = MarketSimConfig {
            num_ticks: 500,
            seed: Some(42),
            ..Default::default()
        };
        let mut sim = MarketSimulation::new(config);
        sim.spawn_agents(&agent_ids(20));

        let output = sim.run();
        assert!(output.price_ticks.len() >= 500);
        assert_eq!(output.summaries.len(), 20);

        for pair in output.price_ticks.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_sold_supply_never_exceeds_total() {
        let config = MarketSimConfig {
            num_ticks: 1_000,
            total_supply: 5_000,
            seed: Some(7),
            ..Default::default()
        };
        let mut sim = MarketSimulation::new(config);
        sim.spawn_agents(&agent_ids(30));

        let output = sim.run();
        for tick in &output.price_ticks {
            assert!(tick.cumulative_sold <= 5_000);
        }
        assert!(sim.context().cumulative_sold() <= 5_000);
    }

    #[test]
    fn test_output_flags_suppress_streams() {
        let config = MarketSimConfig {
            num_ticks: 200,
            seed: Some(3),
            output: OutputConfig {
                emit_price_ticks: false,
                emit_trade_ledger: false,
            },
            ..Default::default()
        };
        let mut sim = MarketSimulation::new(config);
        sim.spawn_agents(&agent_ids(10));

        let output = sim.run();
        assert!(output.price_ticks.is_empty());
        assert!(output.trades.is_empty());
        assert_eq!(output.summaries.len(), 10);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let run = || {
            let config = MarketSimConfig {
                num_ticks: 300,
                seed: Some(99),
                ..Default::default()
            };
            let mut sim = MarketSimulation::new(config);
            sim.spawn_agents(&agent_ids(15));
            sim.run()
        };

        let a = run();
        let b = run();
        assert_eq!(a.price_ticks, b.price_ticks);
        assert_eq!(a.trades.len(), b.trades.len());
    }
}
