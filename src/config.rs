use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::dispute::SlashReason;
use crate::domain::order::ReleaseAction;
use crate::domain::risk::RiskLevel;

/// Platform policy: every threshold, percentage and time window the decision
/// engine consults. Loaded once at startup and treated as immutable for the
/// process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub fraud: FraudConfig,
    #[serde(default)]
    pub risk_levels: RiskLevelConfig,
    #[serde(default)]
    pub stakes: StakeConfig,
    #[serde(default)]
    pub slashing: SlashingConfig,
    #[serde(default)]
    pub disputes: DisputeConfig,
    #[serde(default)]
    pub orders: OrderLimitConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Payment methods keyed by lowercase identifier.
    #[serde(default = "default_payment_methods")]
    pub payment_methods: HashMap<String, PaymentMethodMeta>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// API server port (default: 8080)
    #[serde(default)]
    pub api_port: Option<u16>,
}

/// Payment-proof verification thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Proof confidence at or above which funds auto-release (percent)
    pub auto_release_confidence: Decimal,
    /// Proof confidence at or above which a human reviews (percent)
    pub manual_review_confidence: Decimal,
    /// Minutes the buyer has to complete the fiat payment
    pub payment_window_mins: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            auto_release_confidence: dec!(90),
            manual_review_confidence: dec!(70),
            payment_window_mins: 30,
        }
    }
}

/// Fraud-signal thresholds consumed by the risk scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct FraudConfig {
    /// Orders per rolling hour before the velocity signal fires
    pub max_orders_per_hour: u32,
    /// Orders per rolling day before the velocity signal fires
    pub max_orders_per_day: u32,
    /// Wallets younger than this (hours) carry the new-wallet penalty
    pub new_wallet_age_hours: i64,
    /// Start of the suspicious-hour window, inclusive (reference zone)
    pub suspicious_hours_start: u32,
    /// End of the suspicious-hour window, exclusive (reference zone)
    pub suspicious_hours_end: u32,
    /// Amounts that are exact multiples of this get the round-number flag
    pub round_amount_multiple: u32,
    /// Amount ≥ ratio × user's average completed amount flags escalation
    pub escalation_ratio: Decimal,
    /// Platform reference time zone as minutes east of UTC (default +05:30)
    pub reference_utc_offset_minutes: i32,
}

impl Default for FraudConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            max_orders_per_hour: 5,
            max_orders_per_day: 20,
            new_wallet_age_hours: 168,
            suspicious_hours_start: 2,
            suspicious_hours_end: 5,
            round_amount_multiple: 100,
            escalation_ratio: dec!(2.0),
            reference_utc_offset_minutes: 330,
        }
    }
}

impl FraudConfig {
    /// The platform reference time zone. Falls back to UTC if the configured
    /// offset is out of range (validate() rejects that earlier).
    pub fn reference_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reference_utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Whether `at` falls inside the suspicious-hour window, evaluated in the
    /// platform reference zone.
    pub fn is_suspicious_hour(&self, at: DateTime<Utc>) -> bool {
        let hour = at.with_timezone(&self.reference_zone()).hour();
        hour >= self.suspicious_hours_start && hour < self.suspicious_hours_end
    }
}

/// Cut points mapping a composite score to a discrete risk level.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskLevelConfig {
    /// Scores below this are low risk
    pub low_below: u32,
    /// Scores below this (and not low) are medium risk
    pub medium_below: u32,
    /// Scores below this (and not medium) are high risk; the rest critical
    pub high_below: u32,
}

impl Default for RiskLevelConfig {
    fn default() -> Self {
        Self {
            low_below: 20,
            medium_below: 40,
            high_below: 60,
        }
    }
}

/// LP collateral policy.
#[derive(Debug, Clone, Deserialize)]
pub struct StakeConfig {
    /// Base collateral as a percent of order amount
    pub base_percent: Decimal,
    /// Floor on required collateral (collateral units)
    pub min: Decimal,
    /// Cap on required collateral (collateral units)
    pub max: Decimal,
    pub multiplier_low: Decimal,
    pub multiplier_medium: Decimal,
    pub multiplier_high: Decimal,
    pub multiplier_critical: Decimal,
}

impl Default for StakeConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            base_percent: dec!(5),
            min: dec!(10),
            max: dec!(5000),
            multiplier_low: dec!(1.0),
            multiplier_medium: dec!(1.5),
            multiplier_high: dec!(2.0),
            multiplier_critical: dec!(3.0),
        }
    }
}

/// Stake forfeiture schedule by violation, in percent of posted stake.
/// Payment reversal deliberately exceeds 100: the excess is a claim the
/// settlement collaborator pursues beyond the posted collateral.
#[derive(Debug, Clone, Deserialize)]
pub struct SlashingConfig {
    pub timeout_percent: u8,
    pub fake_proof_percent: u8,
    pub dispute_lost_percent: u8,
    pub payment_reversal_percent: u8,
    pub late_release_percent: u8,
}

impl Default for SlashingConfig {
    fn default() -> Self {
        Self {
            timeout_percent: 20,
            fake_proof_percent: 100,
            dispute_lost_percent: 50,
            payment_reversal_percent: 200,
            late_release_percent: 5,
        }
    }
}

/// Dispute timeline windows and arbitrator eligibility policy.
#[derive(Debug, Clone, Deserialize)]
pub struct DisputeConfig {
    /// Window in which the system may auto-resolve (minutes)
    pub auto_resolution_mins: i64,
    /// Window in which community arbitrators decide (hours)
    pub community_window_hours: i64,
    /// Window in which an admin reviews (hours)
    pub admin_window_hours: i64,
    /// Arbitrator reward as a percent of the disputed order amount
    pub arbitrator_reward_percent: Decimal,
    /// Minimum posted stake to arbitrate
    pub min_arbitrator_stake: Decimal,
    /// Minimum completed trades to arbitrate
    pub min_arbitrator_trades: u32,
    /// Maximum own-dispute rate (percent of completed trades) to arbitrate
    pub max_arbitrator_dispute_rate_percent: Decimal,
    /// Concurring community votes required for a decision
    pub votes_required: u32,
}

impl Default for DisputeConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            auto_resolution_mins: 5,
            community_window_hours: 4,
            admin_window_hours: 24,
            arbitrator_reward_percent: dec!(0.5),
            min_arbitrator_stake: dec!(500),
            min_arbitrator_trades: 50,
            max_arbitrator_dispute_rate_percent: dec!(2.0),
            votes_required: 3,
        }
    }
}

/// Order admission bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLimitConfig {
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    /// Minutes an unmatched order stays live
    pub expiry_mins: i64,
}

impl Default for OrderLimitConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            min_amount: dec!(10),
            max_amount: dec!(10000),
            expiry_mins: 15,
        }
    }
}

/// Liquidity matching policy.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Orders at or above this amount look for a dedicated LP
    pub high_value_threshold: Decimal,
    /// Pooled-liquidity quoted rate when the user buys stablecoin
    pub pool_buy_rate: Decimal,
    /// Pooled-liquidity quoted rate when the user sells stablecoin
    pub pool_sell_rate: Decimal,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            high_value_threshold: dec!(500),
            pool_buy_rate: dec!(1.005),
            pool_sell_rate: dec!(0.995),
        }
    }
}

/// Static metadata for a supported fiat payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodMeta {
    pub label: String,
    /// Base points this method contributes to the risk score
    pub risk_score: u32,
    /// Whether settlements carry a UTR-style bank reference as evidence
    pub requires_utr: bool,
}

fn default_payment_methods() -> HashMap<String, PaymentMethodMeta> {
    fn meta(label: &str, risk_score: u32, requires_utr: bool) -> PaymentMethodMeta {
        PaymentMethodMeta {
            label: label.to_string(),
            risk_score,
            requires_utr,
        }
    }

    HashMap::from([
        ("upi".to_string(), meta("UPI", 5, true)),
        ("imps".to_string(), meta("IMPS", 8, true)),
        ("neft".to_string(), meta("NEFT", 10, true)),
        ("bank_transfer".to_string(), meta("Bank transfer", 5, true)),
        ("paytm".to_string(), meta("Paytm wallet", 12, false)),
        ("cash_deposit".to_string(), meta("Cash deposit", 25, false)),
    ])
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            verification: VerificationConfig::default(),
            fraud: FraudConfig::default(),
            risk_levels: RiskLevelConfig::default(),
            stakes: StakeConfig::default(),
            slashing: SlashingConfig::default(),
            disputes: DisputeConfig::default(),
            orders: OrderLimitConfig::default(),
            matching: MatchingConfig::default(),
            payment_methods: default_payment_methods(),
            logging: LoggingConfig::default(),
            api_port: Some(8080),
        }
    }
}

impl PolicyConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PEERGATE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PEERGATE_STAKES__MAX, etc.)
            .add_source(
                Environment::with_prefix("PEERGATE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Map a composite risk score to its discrete level.
    pub fn risk_level_for(&self, score: u32) -> RiskLevel {
        if score < self.risk_levels.low_below {
            RiskLevel::Low
        } else if score < self.risk_levels.medium_below {
            RiskLevel::Medium
        } else if score < self.risk_levels.high_below {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Collateral multiplier for a risk level.
    pub fn stake_multiplier(&self, level: RiskLevel) -> Decimal {
        match level {
            RiskLevel::Low => self.stakes.multiplier_low,
            RiskLevel::Medium => self.stakes.multiplier_medium,
            RiskLevel::High => self.stakes.multiplier_high,
            RiskLevel::Critical => self.stakes.multiplier_critical,
        }
    }

    /// Required LP collateral for an order amount at a risk score.
    pub fn required_stake(&self, amount: Decimal, score: u32) -> Decimal {
        crate::risk::stake::required_stake(amount, score, self).amount
    }

    /// Metadata for a payment method, `None` when unknown; callers decide
    /// how to treat methods the platform has no policy for.
    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethodMeta> {
        self.payment_methods.get(id.trim().to_lowercase().as_str())
    }

    /// Percent of posted stake forfeited for a violation.
    pub fn slash_percent(&self, reason: SlashReason) -> u8 {
        match reason {
            SlashReason::Timeout => self.slashing.timeout_percent,
            SlashReason::FakeProof => self.slashing.fake_proof_percent,
            SlashReason::DisputeLost => self.slashing.dispute_lost_percent,
            SlashReason::PaymentReversal => self.slashing.payment_reversal_percent,
            SlashReason::LateRelease => self.slashing.late_release_percent,
        }
    }

    /// Disposition of a verified payment proof at the given confidence.
    pub fn release_action(&self, confidence: Decimal) -> ReleaseAction {
        if confidence >= self.verification.auto_release_confidence {
            ReleaseAction::AutoRelease
        } else if confidence >= self.verification.manual_review_confidence {
            ReleaseAction::ManualReview
        } else {
            ReleaseAction::Reject
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(self.risk_levels.low_below < self.risk_levels.medium_below
            && self.risk_levels.medium_below < self.risk_levels.high_below)
        {
            errors.push("risk level cut points must be strictly increasing".to_string());
        }

        if self.stakes.base_percent <= Decimal::ZERO {
            errors.push("stakes.base_percent must be positive".to_string());
        }
        if self.stakes.min > self.stakes.max {
            errors.push("stakes.min must not exceed stakes.max".to_string());
        }
        let multipliers = [
            self.stakes.multiplier_low,
            self.stakes.multiplier_medium,
            self.stakes.multiplier_high,
            self.stakes.multiplier_critical,
        ];
        if multipliers.windows(2).any(|w| w[0] > w[1]) {
            errors.push("stake multipliers must be non-decreasing by level".to_string());
        }

        if self.fraud.max_orders_per_hour == 0 || self.fraud.max_orders_per_day == 0 {
            errors.push("fraud velocity limits must be positive".to_string());
        }
        if self.fraud.max_orders_per_hour > self.fraud.max_orders_per_day {
            errors.push("max_orders_per_hour cannot exceed max_orders_per_day".to_string());
        }
        if self.fraud.suspicious_hours_start >= self.fraud.suspicious_hours_end
            || self.fraud.suspicious_hours_end > 24
        {
            errors.push("suspicious-hour window must satisfy 0 <= start < end <= 24".to_string());
        }
        if self.fraud.reference_utc_offset_minutes.abs() >= 24 * 60 {
            errors.push("reference_utc_offset_minutes must be within a day".to_string());
        }
        if self.fraud.escalation_ratio <= Decimal::ONE {
            errors.push("escalation_ratio must exceed 1".to_string());
        }

        if self.orders.min_amount >= self.orders.max_amount {
            errors.push("orders.min_amount must be below orders.max_amount".to_string());
        }

        if self.disputes.votes_required == 0 {
            errors.push("disputes.votes_required must be positive".to_string());
        }
        let auto = chrono::Duration::minutes(self.disputes.auto_resolution_mins);
        let community = chrono::Duration::hours(self.disputes.community_window_hours);
        let admin = chrono::Duration::hours(self.disputes.admin_window_hours);
        if !(auto < community && community < admin) {
            errors.push("dispute windows must escalate: auto < community < admin".to_string());
        }

        if self.matching.high_value_threshold <= Decimal::ZERO {
            errors.push("matching.high_value_threshold must be positive".to_string());
        }
        if self.matching.pool_buy_rate <= Decimal::ZERO
            || self.matching.pool_sell_rate <= Decimal::ZERO
        {
            errors.push("pooled liquidity rates must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
