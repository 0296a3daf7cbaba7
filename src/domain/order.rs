use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction from the user's perspective (buy or sell stablecoin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

/// Disposition of a verified payment proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseAction {
    /// Confidence high enough to release without a human
    AutoRelease,
    /// A human reviews before release
    ManualReview,
    /// Proof rejected outright
    Reject,
}

/// Attributes of an incoming order that feed the risk scorer.
///
/// This is what the platform knows about a trade before admitting it; the
/// requester's history is fetched separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAnalysisData {
    /// Requested amount in stablecoin units
    pub amount: Decimal,
    /// Payment method identifier ("upi", "imps", ...); unknown methods are
    /// scored as zero-contribution, not rejected
    pub payment_method: Option<String>,
    /// Fiat currency code the user pays in
    pub fiat_currency: Option<String>,
    /// Requesting wallet address (case-insensitive identity)
    pub user_address: String,
    /// Request-origin network address
    pub ip_address: Option<String>,
    /// Device fingerprint when the client supplies one
    pub device_id: Option<String>,
}

impl OrderAnalysisData {
    pub fn new(user_address: impl Into<String>, amount: Decimal) -> Self {
        Self {
            amount,
            payment_method: None,
            fiat_currency: None,
            user_address: user_address.into(),
            ip_address: None,
            device_id: None,
        }
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }
}
