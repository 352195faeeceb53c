//! Emitted price tick records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::levels::PriceLevels;
use super::regime::Regime;

/// One immutable tick of the synthetic price series.
///
/// Emitted by the simulation context with strictly increasing timestamps;
/// trade-driven ticks carry the triggering trade's volume, ambient ticks
/// carry zero volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume_tokens: u64,
    pub volume_usd: f64,
    /// Running total of tokens sold from the sale supply.
    pub cumulative_sold: u64,
    pub regime: Regime,
    pub levels: PriceLevels,
    /// Ambient liquidity backing the order-flow impact law.
    pub liquidity_usd: f64,
}
