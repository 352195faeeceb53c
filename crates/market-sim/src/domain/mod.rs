//! Domain layer: market regimes, technical levels and emitted tick records

pub mod levels;
pub mod regime;
pub mod tick;
