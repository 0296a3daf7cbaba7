//! Per-user activity counters behind an injectable store abstraction.
//!
//! The store is the engine's one shared mutable resource. All mutations are
//! keyed by a case-normalized user identity and serialized per key, so
//! concurrent traffic for different users never contends and same-user
//! increments are never lost.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::UserHistory;

/// Rolling activity counters keyed by user identity.
///
/// `record_order` covers every activity event: order submission
/// (`completed=false`), trade completion (`completed=true`), and dispute
/// involvement (`disputed=true`). Hourly/daily counters move on every call;
/// the flags drive the aggregate statistics.
pub trait HistoryStore: Send + Sync {
    /// Record one activity event for `user`.
    fn record_order(
        &self,
        user: &str,
        amount: Decimal,
        completed: bool,
        disputed: bool,
        now: DateTime<Utc>,
    );

    /// Snapshot of the user's record, creating the default record on first
    /// access. Never touches any other user's record.
    fn get(&self, user: &str, now: DateTime<Utc>) -> UserHistory;

    /// Zero every user's hourly counter. Idempotent; leaves daily counters
    /// and aggregates untouched. Invoked by the external scheduler.
    fn reset_hourly(&self);

    /// Zero every user's daily counter. Idempotent.
    fn reset_daily(&self);

    /// Number of users with a record (health gauge).
    fn tracked_users(&self) -> usize;
}

fn normalize_key(user: &str) -> String {
    user.trim().to_lowercase()
}

/// DashMap-backed store: entry-level exclusive locking gives the per-key
/// serialization the contract requires without a process-wide lock.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: DashMap<String, UserHistory>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn record_order(
        &self,
        user: &str,
        amount: Decimal,
        completed: bool,
        disputed: bool,
        now: DateTime<Utc>,
    ) {
        let key = normalize_key(user);
        let mut entry = self
            .records
            .entry(key)
            .or_insert_with(|| UserHistory::new_default(now));
        let record = entry.value_mut();

        record.orders_last_hour += 1;
        record.orders_last_day += 1;
        if completed {
            record.completed_orders += 1;
            record.total_volume += amount;
            record.recompute_average();
        }
        if disputed {
            record.dispute_count += 1;
        }
    }

    fn get(&self, user: &str, now: DateTime<Utc>) -> UserHistory {
        let key = normalize_key(user);
        self.records
            .entry(key)
            .or_insert_with(|| UserHistory::new_default(now))
            .value()
            .clone()
    }

    fn reset_hourly(&self) {
        for mut entry in self.records.iter_mut() {
            entry.value_mut().orders_last_hour = 0;
        }
        info!(users = self.records.len(), "hourly activity counters reset");
    }

    fn reset_daily(&self) {
        for mut entry in self.records.iter_mut() {
            entry.value_mut().orders_last_day = 0;
        }
        info!(users = self.records.len(), "daily activity counters reset");
    }

    fn tracked_users(&self) -> usize {
        self.records.len()
    }
}
