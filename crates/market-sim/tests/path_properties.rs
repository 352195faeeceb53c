//! Property tests for the generated price path
//!
//! Verifies the hard guarantees of the path simulator: price bounds,
//! tick ordering, supply accounting and seed determinism, over full runs
//! with a mixed agent population.

use market_sim::{MarketSimConfig, MarketSimulation, OutputConfig};

const SEED: u64 = 42;

fn run_with(config: MarketSimConfig, agents: usize) -> market_sim::RunOutput {
    let ids: Vec<String> = (0..agents).map(|i| format!("agent-{i}")).collect();
    let mut sim = MarketSimulation::new(config);
    sim.spawn_agents(&ids);
    sim.run()
}

#[test]
fn test_prices_always_within_hard_clamp() {
    let config = MarketSimConfig {
        num_ticks: 20_000,
        base_price: 0.5,
        seed: Some(SEED),
        ..Default::default()
    };

    let output = run_with(config, 50);
    assert!(output.price_ticks.len() >= 20_000);

    for tick in &output.price_ticks {
        assert!(
            (0.001..=50.0).contains(&tick.price),
            "tick at {} escaped clamp: {}",
            tick.timestamp,
            tick.price
        );
        assert!(tick.price.is_finite());
        assert!(tick.liquidity_usd >= 1.0);
    }
}

#[test]
fn test_timestamps_strictly_increasing() {
    let config = MarketSimConfig {
        num_ticks: 5_000,
        seed: Some(SEED),
        ..Default::default()
    };

    let output = run_with(config, 25);
    for pair in output.price_ticks.windows(2) {
        assert!(
            pair[0].timestamp < pair[1].timestamp,
            "ticks out of order at {}",
            pair[1].timestamp
        );
    }
}

#[test]
fn test_cumulative_sold_is_monotone_and_capped() {
    let total_supply = 20_000;
    let config = MarketSimConfig {
        num_ticks: 3_000,
        total_supply,
        seed: Some(SEED),
        ..Default::default()
    };

    let output = run_with(config, 40);

    let mut prev = 0u64;
    for tick in &output.price_ticks {
        assert!(tick.cumulative_sold >= prev, "sold counter went backwards");
        assert!(tick.cumulative_sold <= total_supply);
        prev = tick.cumulative_sold;
    }
}

#[test]
fn test_trade_ledger_volume_matches_ticks() {
    let config = MarketSimConfig {
        num_ticks: 2_000,
        seed: Some(SEED),
        ..Default::default()
    };

    let output = run_with(config, 30);

    // Every trade tick (non-zero volume) must be backed by a ledger row.
    let trade_ticks = output
        .price_ticks
        .iter()
        .filter(|t| t.volume_tokens > 0)
        .count();
    let ledger_trades = output
        .trades
        .iter()
        .filter(|t| {
            matches!(
                t.action,
                market_sim::TradeAction::Buy { .. } | market_sim::TradeAction::Sell { .. }
            )
        })
        .count();
    assert_eq!(trade_ticks, ledger_trades);
}

#[test]
fn test_agent_balances_never_negative() {
    let config = MarketSimConfig {
        num_ticks: 5_000,
        seed: Some(SEED),
        ..Default::default()
    };

    let output = run_with(config, 60);
    for summary in &output.summaries {
        assert!(
            summary.usdt_balance >= 0.0,
            "agent {} has negative USDT {}",
            summary.id,
            summary.usdt_balance
        );
        // Buys are the only token source, so holdings can never exceed
        // the lifetime bought total.
        assert!(summary.token_balance + summary.staked_balance <= summary.total_bought);
    }
}

#[test]
fn test_same_seed_same_path() {
    let make = || {
        run_with(
            MarketSimConfig {
                num_ticks: 1_000,
                seed: Some(777),
                ..Default::default()
            },
            20,
        )
    };

    let a = make();
    let b = make();
    assert_eq!(a.price_ticks, b.price_ticks);
    assert_eq!(a.trades.len(), b.trades.len());
}

#[test]
fn test_different_seeds_diverge() {
    let make = |seed| {
        run_with(
            MarketSimConfig {
                num_ticks: 1_000,
                seed: Some(seed),
                ..Default::default()
            },
            20,
        )
    };

    let a = make(1);
    let b = make(2);
    assert_ne!(a.price_ticks, b.price_ticks);
}

#[test]
fn test_suppressed_outputs_still_summarize() {
    let config = MarketSimConfig {
        num_ticks: 1_000,
        seed: Some(SEED),
        output: OutputConfig {
            emit_price_ticks: false,
            emit_trade_ledger: false,
        },
        ..Default::default()
    };

    let output = run_with(config, 15);
    assert!(output.price_ticks.is_empty());
    assert!(output.trades.is_empty());
    assert_eq!(output.summaries.len(), 15);
}
