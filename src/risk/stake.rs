//! LP collateral requirement derived from order amount and risk.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::domain::RiskLevel;

/// Collateral the LP must post before taking the order. `amount` is always
/// inside the configured [min, max] band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeRequirement {
    pub amount: Decimal,
    /// Risk level the requirement was derived from
    pub level: RiskLevel,
    /// Multiplier that level applied to the base percentage
    pub multiplier: Decimal,
}

/// `amount × base% × multiplier(level)`, clamped to the configured band.
///
/// Monotone in both arguments: worse risk never lowers the requirement, a
/// bigger order never lowers it either (until the max clamp flattens it).
pub fn required_stake(amount: Decimal, score: u32, config: &PolicyConfig) -> StakeRequirement {
    let level = config.risk_level_for(score);
    let multiplier = config.stake_multiplier(level);
    let raw = amount * config.stakes.base_percent / Decimal::from(100) * multiplier;
    let clamped = raw.max(config.stakes.min).min(config.stakes.max);

    StakeRequirement {
        amount: clamped,
        level,
        multiplier,
    }
}
