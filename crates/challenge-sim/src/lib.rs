//! Trading challenge outcome simulator
//!
//! Synthesizes day-by-day equity curves for multi-phase prop-firm style
//! challenges and evaluates them against drawdown and profit-target
//! rules. Challenge instances share no state; a batch can be evaluated
//! concurrently without coordination.

pub mod challenge;
pub mod config;
pub mod phase;

pub use challenge::{ChallengeOutcome, ChallengeResult, evaluate, evaluate_many};
pub use config::{ChallengeConfig, ConfigError, PhaseRule, TraderProfile};
pub use phase::{DailyStat, FailReason, PhaseSimulation, PhaseVerdict};
