//! Fraud Scorer - 訂單風險評分
//!
//! 在訂單進入撮合前對請求者進行多信號評分：
//! - 下單頻率 (velocity)
//! - 錢包年齡
//! - 金額形態 (整數金額、金額跳升)
//! - 下單時段與支付方式
//! - 爭議歷史
//!
//! Additive model: each signal contributes a bounded point value, the sum is
//! clamped to [0, 100]. Deterministic for identical inputs; time enters only
//! through the supplied `now`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::{FraudConfig, PolicyConfig};
use crate::domain::{OrderAnalysisData, RequiredAction, RiskAssessment, RiskLevel, UserHistory};

/// Points for tripping either velocity limit
const VELOCITY_PENALTY: u32 = 50;
/// Velocity points above this deny the order outright, whatever the level
const VELOCITY_HARD_CAP: u32 = 40;
/// Penalty for a wallet created moments ago; decays to zero at the
/// configured age threshold
const NEW_WALLET_MAX_PENALTY: u32 = 25;
/// Amount is an exact multiple of the round-number threshold
const ROUND_AMOUNT_PENALTY: u32 = 5;
/// Amount jumped past the escalation ratio over the user's running average
const ESCALATION_PENALTY: u32 = 15;
/// Request landed inside the suspicious-hour window
const ODD_HOURS_PENALTY: u32 = 10;
/// Per-dispute penalty, capped
const DISPUTE_PENALTY_STEP: u32 = 10;
const DISPUTE_PENALTY_CAP: u32 = 30;

/// Score one order against the requester's history.
///
/// Pure: reads nothing but its arguments, so concurrent callers need no
/// synchronization.
pub fn analyze(
    order: &OrderAnalysisData,
    history: &UserHistory,
    now: DateTime<Utc>,
    config: &PolicyConfig,
) -> RiskAssessment {
    let fraud = &config.fraud;
    let mut score: u32 = 0;

    // 1. Velocity
    let velocity = velocity_points(history, fraud);
    score += velocity;

    // 2. Wallet age
    let wallet = new_wallet_points(history.wallet_age_hours(now), fraud);
    score += wallet;

    // 3. Amount shape
    if is_round_amount(order.amount, fraud.round_amount_multiple) {
        score += ROUND_AMOUNT_PENALTY;
    }
    if is_escalation(order.amount, history, fraud) {
        score += ESCALATION_PENALTY;
    }

    // 4. Timing
    if fraud.is_suspicious_hour(now) {
        score += ODD_HOURS_PENALTY;
    }

    // 5. Payment method base risk; unknown methods contribute nothing
    if let Some(method) = order.payment_method.as_deref() {
        if let Some(meta) = config.payment_method(method) {
            score += meta.risk_score;
        }
    }

    // 6. Dispute history
    score += dispute_points(history.dispute_count);

    let score = score.min(100);
    let level = config.risk_level_for(score);
    let blocked = level == RiskLevel::Critical || velocity > VELOCITY_HARD_CAP;

    let mut required_actions = Vec::new();
    if level >= RiskLevel::Medium {
        required_actions.push(RequiredAction::ManualReview);
    }
    if level >= RiskLevel::High {
        required_actions.push(RequiredAction::DelayedRelease);
    }
    if wallet > 0 {
        required_actions.push(RequiredAction::AdditionalVerification);
    }

    RiskAssessment {
        score,
        level,
        blocked,
        required_actions,
    }
}

fn velocity_points(history: &UserHistory, fraud: &FraudConfig) -> u32 {
    if history.orders_last_hour >= fraud.max_orders_per_hour
        || history.orders_last_day >= fraud.max_orders_per_day
    {
        VELOCITY_PENALTY
    } else {
        0
    }
}

/// Inverse age scaling: a wallet created right now scores the full penalty,
/// decaying (rounded up) to zero at the threshold.
fn new_wallet_points(age_hours: i64, fraud: &FraudConfig) -> u32 {
    let threshold = fraud.new_wallet_age_hours;
    if threshold <= 0 || age_hours >= threshold {
        return 0;
    }
    let remaining = (threshold - age_hours) as u64;
    let points = (remaining * NEW_WALLET_MAX_PENALTY as u64).div_ceil(threshold as u64);
    points as u32
}

fn is_round_amount(amount: Decimal, multiple: u32) -> bool {
    if multiple == 0 || amount <= Decimal::ZERO {
        return false;
    }
    amount % Decimal::from(multiple) == Decimal::ZERO
}

fn is_escalation(amount: Decimal, history: &UserHistory, fraud: &FraudConfig) -> bool {
    history.avg_order_amount > Decimal::ZERO
        && amount >= history.avg_order_amount * fraud.escalation_ratio
}

fn dispute_points(dispute_count: u32) -> u32 {
    dispute_count
        .saturating_mul(DISPUTE_PENALTY_STEP)
        .min(DISPUTE_PENALTY_CAP)
}
