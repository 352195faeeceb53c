//! Application layer: price stepping, shared context, agents and the runner

pub mod agents;
pub mod context;
pub mod price_step;
pub mod simulation;
