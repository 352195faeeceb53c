//! Synthetic token market simulator
//!
//! Produces a plausible price path for a demo token: a regime-switching
//! random walk with technical-level magnetism, plus synthetic persona
//! agents whose buys and sells feed order-flow impact back into the path.
//! Not an exchange, not a live feed, not a backtester.

pub mod application;
pub mod domain;

// Re-export key types at crate root
pub use application::agents::{Persona, PersonaAgent, PersonaState, TradeAction};
pub use application::context::SimulationContext;
pub use application::simulation::{
    AgentSummary, MarketSimConfig, MarketSimulation, OutputConfig, RunOutput, TradeRecord,
};
pub use domain::levels::{PriceLevels, SwingAnchors, compute_levels};
pub use domain::regime::{Regime, RegimeController};
pub use domain::tick::PriceTick;
