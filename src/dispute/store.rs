//! Dispute records with an atomic resolved-once guard.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use super::resolver;
use crate::domain::{Dispute, DisputeDecision, DisputeStatus};
use crate::error::DisputeError;

/// In-memory dispute registry. Per-key entry locking makes the
/// transition-once check atomic: two racing resolutions of the same dispute
/// serialize, and the loser gets `AlreadyResolved`.
#[derive(Debug, Default)]
pub struct DisputeStore {
    disputes: DashMap<Uuid, Dispute>,
}

impl DisputeStore {
    pub fn new() -> Self {
        Self {
            disputes: DashMap::new(),
        }
    }

    /// Register a freshly opened dispute.
    pub fn insert(&self, dispute: Dispute) -> Dispute {
        let stored = dispute.clone();
        self.disputes.insert(dispute.id, dispute);
        stored
    }

    pub fn get(&self, id: &Uuid) -> Result<Dispute, DisputeError> {
        self.disputes
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DisputeError::NotFound {
                dispute_id: id.to_string(),
            })
    }

    /// Resolve a dispute in place. Validation happens against the live entry
    /// under its lock, so a second attempt always observes the first.
    pub fn resolve(
        &self,
        id: &Uuid,
        decision: DisputeDecision,
        slash_percent: Option<u8>,
        resolved_by: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Dispute, DisputeError> {
        let mut entry = self
            .disputes
            .get_mut(id)
            .ok_or_else(|| DisputeError::NotFound {
                dispute_id: id.to_string(),
            })?;
        let dispute = entry.value_mut();

        let resolution =
            resolver::resolve(dispute, decision, slash_percent, resolved_by, notes, now)?;

        dispute.status = DisputeStatus::Resolved;
        dispute.resolution = Some(resolution);
        info!(
            dispute_id = %dispute.id,
            decision = %decision,
            slash_percent = dispute
                .resolution
                .as_ref()
                .map(|r| r.slash_percent)
                .unwrap_or(0),
            "dispute resolved"
        );
        Ok(dispute.clone())
    }

    pub fn len(&self) -> usize {
        self.disputes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disputes.is_empty()
    }

    /// Disputes still awaiting a decision (health gauge).
    pub fn open_count(&self) -> usize {
        self.disputes
            .iter()
            .filter(|entry| entry.value().status == DisputeStatus::Opened)
            .count()
    }
}
