use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DisputeError;

/// Dispute lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    /// Raised, awaiting a decision
    Opened,
    /// Decided; terminal
    Resolved,
}

/// Who a resolved dispute goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeDecision {
    UserWins,
    LpWins,
}

impl DisputeDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeDecision::UserWins => "user_wins",
            DisputeDecision::LpWins => "lp_wins",
        }
    }
}

impl std::fmt::Display for DisputeDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DisputeDecision {
    type Err = DisputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_wins" => Ok(DisputeDecision::UserWins),
            "lp_wins" => Ok(DisputeDecision::LpWins),
            other => Err(DisputeError::UnknownDecision {
                value: other.to_string(),
            }),
        }
    }
}

/// Violation classes that forfeit LP stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlashReason {
    /// LP never released within the payment window
    Timeout,
    /// Fabricated payment evidence
    FakeProof,
    /// LP lost a dispute
    DisputeLost,
    /// Fiat payment charged back after release
    PaymentReversal,
    /// Released, but past the deadline
    LateRelease,
}

/// Which authority is expected to decide a dispute at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStage {
    /// Fresh dispute; the system may auto-resolve
    AutoWindow,
    /// Community arbitrators vote
    CommunityArbitration,
    /// An admin decides
    AdminReview,
}

/// Settlement commands a resolution implies. Derived, never hand-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionActions {
    pub funds_released: bool,
    pub funds_refunded: bool,
    pub lp_slashed: bool,
    pub lp_banned: bool,
    pub user_banned: bool,
}

/// The decision applied to a dispute, with its monetary consequences.
///
/// `slash_percent` is what the platform enforces; `submitted_slash_percent`
/// preserves the resolver's input when policy overrode it (a winning LP is
/// never slashed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub decision: DisputeDecision,
    #[serde(rename = "slashPercentage")]
    pub slash_percent: u8,
    #[serde(rename = "submittedSlashPercentage")]
    pub submitted_slash_percent: u8,
    pub notes: Option<String>,
    pub resolved_at: DateTime<Utc>,
    pub resolved_by: String,
    pub actions: ResolutionActions,
}

/// A contested trade awaiting or carrying an authority decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: Uuid,
    pub order_id: String,
    /// Disputed order amount, when the opener supplied it
    pub amount: Option<Decimal>,
    pub user_address: String,
    pub lp_address: String,
    pub status: DisputeStatus,
    /// Which side raised it ("user" or "lp")
    pub raised_by: String,
    pub raised_at: DateTime<Utc>,
    /// Opaque reference to submitted evidence
    pub evidence: Option<String>,
    pub resolution: Option<Resolution>,
}

impl Dispute {
    pub fn open(
        order_id: impl Into<String>,
        amount: Option<Decimal>,
        user_address: impl Into<String>,
        lp_address: impl Into<String>,
        raised_by: impl Into<String>,
        evidence: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: order_id.into(),
            amount,
            user_address: user_address.into(),
            lp_address: lp_address.into(),
            status: DisputeStatus::Opened,
            raised_by: raised_by.into(),
            raised_at: now,
            evidence,
            resolution: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == DisputeStatus::Resolved
    }
}
