use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hours a brand-new lazily created record reports as wallet age. Keeps
/// first-time users exactly at the new-wallet threshold rather than inside it.
pub const DEFAULT_WALLET_AGE_HOURS: i64 = 168;

/// Rolling activity counters and aggregate trading statistics for one user.
///
/// Owned by the activity counter store; everything else reads snapshots.
/// Counters never go negative and only move backwards at an epoch reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistory {
    /// Orders placed since the last hourly reset
    pub orders_last_hour: u32,
    /// Orders placed since the last daily reset
    pub orders_last_day: u32,
    /// Running average amount over completed orders
    pub avg_order_amount: Decimal,
    /// Completed order count
    pub completed_orders: u32,
    /// Total completed volume
    pub total_volume: Decimal,
    /// Disputes this user has been a party to
    pub dispute_count: u32,
    /// When the wallet first appeared
    pub wallet_created_at: DateTime<Utc>,
}

impl UserHistory {
    /// Record for a user the platform has never seen: zero activity, wallet
    /// aged exactly [`DEFAULT_WALLET_AGE_HOURS`].
    pub fn new_default(now: DateTime<Utc>) -> Self {
        Self {
            orders_last_hour: 0,
            orders_last_day: 0,
            avg_order_amount: Decimal::ZERO,
            completed_orders: 0,
            total_volume: Decimal::ZERO,
            dispute_count: 0,
            wallet_created_at: now - Duration::hours(DEFAULT_WALLET_AGE_HOURS),
        }
    }

    /// Wallet age at `now`, saturating at zero for clock skew.
    pub fn wallet_age_hours(&self, now: DateTime<Utc>) -> i64 {
        (now - self.wallet_created_at).num_hours().max(0)
    }

    /// Recompute the running average as total volume over completed count,
    /// holding at zero while no order has completed.
    pub(crate) fn recompute_average(&mut self) {
        self.avg_order_amount = if self.completed_orders == 0 {
            Decimal::ZERO
        } else {
            self.total_volume / Decimal::from(self.completed_orders)
        };
    }

    /// Disputes as a percentage of completed trades. Zero-trade users have a
    /// zero rate, not an undefined one.
    pub fn dispute_rate_percent(&self) -> Decimal {
        if self.completed_orders == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.dispute_count) / Decimal::from(self.completed_orders)
            * Decimal::from(100)
    }
}
