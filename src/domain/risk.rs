use serde::{Deserialize, Serialize};

/// Discrete risk band derived from the continuous score.
///
/// Ordered: `Low < Medium < High < Critical`, so policy rules can compare
/// levels directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Mitigation the platform requires before or after admitting the trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredAction {
    /// A human signs off before the trade proceeds
    ManualReview,
    /// Funds release waits out a holding period
    DelayedRelease,
    /// The user proves more about their identity
    AdditionalVerification,
}

/// Outcome of scoring one order against one user's history. Ephemeral:
/// computed per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Composite score, clamped to [0, 100]
    pub score: u32,
    pub level: RiskLevel,
    /// Hard denial: the order must not be admitted
    pub blocked: bool,
    /// Mitigations, in rule order
    pub required_actions: Vec<RequiredAction>,
}

impl RiskAssessment {
    pub fn requires(&self, action: RequiredAction) -> bool {
        self.required_actions.contains(&action)
    }
}
