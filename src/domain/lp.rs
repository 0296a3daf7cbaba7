use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of the synthesized pooled-liquidity counterparty
pub const POOLED_PROVIDER_ID: &str = "pooled";

/// A liquidity provider registered in the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityProvider {
    pub id: String,
    /// Collateral currently posted
    pub stake: Decimal,
    /// Quoted fiat-per-stablecoin rate
    pub rate: Decimal,
    /// Whether the provider accepts new orders right now
    pub available: bool,
}

impl LiquidityProvider {
    /// The always-available pooled counterparty, synthesized at match time
    /// with the direction-dependent pool rate.
    pub fn pooled(rate: Decimal) -> Self {
        Self {
            id: POOLED_PROVIDER_ID.to_string(),
            stake: Decimal::ZERO,
            rate,
            available: true,
        }
    }

    pub fn is_pooled(&self) -> bool {
        self.id == POOLED_PROVIDER_ID
    }
}

/// Where the matched counterparty came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// A registered provider with sufficient stake
    Dedicated,
    /// The shared liquidity pool
    Pooled,
}

/// Outcome of matching an order against the pool. Falling back to pooled
/// liquidity is a normal outcome, not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpMatch {
    pub provider: LiquidityProvider,
    pub source: MatchSource,
    /// Whether the order cleared the high-value threshold
    pub is_high_value: bool,
    /// Rate the counterparty quotes for this order
    pub rate: Decimal,
}

impl LpMatch {
    pub fn is_dedicated(&self) -> bool {
        self.source == MatchSource::Dedicated
    }
}
