//! Dispute Resolver - 爭議裁決
//!
//! 將已開立的爭議推進到終態，計算資金處置與抵押罰沒：
//! - user_wins: 放款給用戶，按比例罰沒 LP 抵押
//! - lp_wins: 退款給 LP，封禁濫訴用戶
//!
//! The transition itself is pure; the store provides the only-once guard.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::config::DisputeConfig;
use crate::domain::{
    Dispute, DisputeDecision, EscalationStage, Resolution, ResolutionActions, UserHistory,
};
use crate::error::DisputeError;

/// The only slash percentages a resolution may carry.
pub const VALID_SLASH_PERCENTS: [u8; 4] = [0, 20, 50, 100];

/// Advance an opened dispute to its resolution.
///
/// `slash_percent` defaults to 0 when absent and must otherwise be one of
/// [`VALID_SLASH_PERCENTS`]. A `lp_wins` decision forces the effective slash
/// to 0 whatever was submitted (slashing only targets the LP, and only when
/// the user prevails); the submitted value is preserved on the record for
/// audit. Validation failures reject before anything is derived, so an
/// invalid call leaves no trace.
pub fn resolve(
    dispute: &Dispute,
    decision: DisputeDecision,
    slash_percent: Option<u8>,
    resolved_by: &str,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<Resolution, DisputeError> {
    if dispute.is_resolved() {
        return Err(DisputeError::AlreadyResolved {
            dispute_id: dispute.id.to_string(),
        });
    }

    let submitted = slash_percent.unwrap_or(0);
    if !VALID_SLASH_PERCENTS.contains(&submitted) {
        return Err(DisputeError::InvalidSlashPercent { value: submitted });
    }

    let effective = match decision {
        DisputeDecision::UserWins => submitted,
        DisputeDecision::LpWins => 0,
    };

    let actions = ResolutionActions {
        funds_released: decision == DisputeDecision::UserWins,
        funds_refunded: decision == DisputeDecision::LpWins,
        lp_slashed: decision == DisputeDecision::UserWins && effective > 0,
        lp_banned: effective == 100,
        user_banned: decision == DisputeDecision::LpWins,
    };

    Ok(Resolution {
        decision,
        slash_percent: effective,
        submitted_slash_percent: submitted,
        notes,
        resolved_at: now,
        resolved_by: resolved_by.to_string(),
        actions,
    })
}

/// Which authority is expected to decide a dispute this old.
pub fn escalation_stage(
    raised_at: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &DisputeConfig,
) -> EscalationStage {
    let elapsed = now - raised_at;
    if elapsed <= Duration::minutes(config.auto_resolution_mins) {
        EscalationStage::AutoWindow
    } else if elapsed <= Duration::hours(config.community_window_hours) {
        EscalationStage::CommunityArbitration
    } else {
        EscalationStage::AdminReview
    }
}

/// Whether a user may arbitrate community disputes: enough stake, enough
/// completed trades, and a low enough own-dispute rate.
pub fn is_eligible_arbitrator(
    history: &UserHistory,
    stake: Decimal,
    config: &DisputeConfig,
) -> bool {
    stake >= config.min_arbitrator_stake
        && history.completed_orders >= config.min_arbitrator_trades
        && history.dispute_rate_percent() <= config.max_arbitrator_dispute_rate_percent
}

/// Reward paid to a deciding arbitrator, as a cut of the disputed order.
pub fn arbitrator_reward(order_amount: Decimal, config: &DisputeConfig) -> Decimal {
    order_amount * config.arbitrator_reward_percent / Decimal::from(100)
}

/// Collateral units forfeited for a slash. Deliberately uncapped: the
/// payment-reversal schedule runs to 200%, and the excess over the posted
/// stake is a claim the settlement collaborator pursues.
pub fn slash_amount(stake: Decimal, percent: u8) -> Decimal {
    stake * Decimal::from(percent) / Decimal::from(100)
}
