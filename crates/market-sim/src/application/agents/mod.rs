//! Synthetic persona agents
//!
//! Each agent is assigned one behavioral archetype at creation and holds
//! per-agent balances. Decisions are evaluated in strict priority order
//! (buy, sell, stake, unstake) and executed trades feed their order flow
//! straight back into the price path.

mod agent;
mod persona;
mod state;

pub use agent::{ActionOutcome, PersonaAgent, TradeAction};
pub use persona::{Persona, PersonaProfile};
pub use state::PersonaState;
