//! Liquidity matching: dedicated LPs for high-value orders, the shared pool
//! for everything else.

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::MatchingConfig;
use crate::domain::{LiquidityProvider, LpMatch, MatchSource, TradeDirection};

/// Pooled-liquidity quoted rate for a direction.
pub fn pool_rate(direction: TradeDirection, config: &MatchingConfig) -> Decimal {
    match direction {
        TradeDirection::Buy => config.pool_buy_rate,
        TradeDirection::Sell => config.pool_sell_rate,
    }
}

/// Pick a counterparty for an order over a pool snapshot.
///
/// High-value orders (amount at or above the threshold) go to the available
/// provider with the greatest stake among those staking at least half the
/// order amount; ties keep the earliest pool entry, so iteration order is a
/// documented, stable tie-break. Everything else, and any high-value order no
/// provider can cover, falls back to pooled liquidity. Pure and synchronous;
/// falling back is a normal outcome, not an error.
pub fn match_lp(
    amount: Decimal,
    direction: TradeDirection,
    pool: &[LiquidityProvider],
    config: &MatchingConfig,
) -> LpMatch {
    let is_high_value = amount >= config.high_value_threshold;

    if is_high_value {
        let stake_floor = amount / Decimal::from(2);
        let mut best: Option<&LiquidityProvider> = None;
        for provider in pool {
            if !provider.available || provider.stake < stake_floor {
                continue;
            }
            // Strict comparison keeps the first entry on equal stakes.
            match best {
                Some(current) if provider.stake <= current.stake => {}
                _ => best = Some(provider),
            }
        }

        if let Some(provider) = best {
            debug!(
                provider = %provider.id,
                stake = %provider.stake,
                %amount,
                "matched dedicated LP"
            );
            return LpMatch {
                provider: provider.clone(),
                source: MatchSource::Dedicated,
                is_high_value,
                rate: provider.rate,
            };
        }
    }

    let rate = pool_rate(direction, config);
    LpMatch {
        provider: LiquidityProvider::pooled(rate),
        source: MatchSource::Pooled,
        is_high_value,
        rate,
    }
}

/// In-process LP pool. Membership and stake levels are external state fed in
/// by collaborators; the matcher only ever sees snapshots.
#[derive(Debug, Default)]
pub struct LpRegistry {
    providers: RwLock<Vec<LiquidityProvider>>,
}

impl LpRegistry {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
        }
    }

    /// Insert or replace a provider by id. Replacement keeps the original
    /// pool position so matching tie-breaks stay stable.
    pub async fn upsert(&self, provider: LiquidityProvider) {
        let mut pool = self.providers.write().await;
        match pool.iter_mut().find(|p| p.id == provider.id) {
            Some(existing) => *existing = provider,
            None => pool.push(provider),
        }
    }

    /// Remove a provider; `true` when one was registered under that id.
    pub async fn remove(&self, id: &str) -> bool {
        let mut pool = self.providers.write().await;
        let before = pool.len();
        pool.retain(|p| p.id != id);
        pool.len() < before
    }

    pub async fn snapshot(&self) -> Vec<LiquidityProvider> {
        self.providers.read().await.clone()
    }

    /// Posted stake summed across the whole pool.
    pub async fn total_liquidity(&self) -> Decimal {
        self.providers
            .read()
            .await
            .iter()
            .map(|p| p.stake)
            .sum()
    }

    pub async fn len(&self) -> usize {
        self.providers.read().await.len()
    }
}
