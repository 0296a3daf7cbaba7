use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Dispute, DisputeDecision, EscalationStage, LiquidityProvider, LpMatch, OrderAnalysisData,
    RequiredAction, Resolution, ResolutionActions, RiskLevel, TradeDirection, UserHistory,
};
use crate::error::EngineError;
use crate::risk::StakeRequirement;

// ============================================================================
// Fraud Types
// ============================================================================

/// Order attributes as collaborators submit them
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDataPayload {
    pub amount_usdc: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub fiat_currency: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl OrderDataPayload {
    pub fn into_order(self, user_address: String) -> OrderAnalysisData {
        OrderAnalysisData {
            amount: self.amount_usdc,
            payment_method: self.payment_method,
            fiat_currency: self.fiat_currency,
            user_address,
            ip_address: self.ip_address,
            device_id: self.device_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub order_data: OrderDataPayload,
    pub user_address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub blocked: bool,
    pub required_actions: Vec<RequiredAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub history: UserHistory,
}

// ============================================================================
// Order Admission Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmitRequest {
    pub order_data: OrderDataPayload,
    pub user_address: String,
    #[serde(rename = "type")]
    pub direction: TradeDirection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmitResponse {
    pub success: bool,
    pub admitted: bool,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub required_actions: Vec<RequiredAction>,
    /// Collateral quote for the matched LP; null when the order is blocked
    pub stake: Option<StakeRequirement>,
    #[serde(rename = "match")]
    pub lp_match: Option<MatchBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub user_address: String,
    pub amount_usdc: Decimal,
}

// ============================================================================
// Dispute Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDisputeRequest {
    pub order_id: String,
    #[serde(default)]
    pub amount_usdc: Option<Decimal>,
    pub user_address: String,
    pub lp_address: String,
    pub raised_by: String,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisputeOpenedResponse {
    pub success: bool,
    pub dispute: Dispute,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub decision: String,
    #[serde(default)]
    pub slash_percentage: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Authority identifier; defaults to "admin" when omitted
    #[serde(default)]
    pub resolved_by: Option<String>,
}

/// Resolution as published to collaborators, keyed by its dispute
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionBody {
    pub dispute_id: Uuid,
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

impl ResolutionBody {
    pub fn from_resolution(dispute_id: Uuid, resolution: &Resolution) -> Self {
        Self {
            dispute_id,
            decision: resolution.decision,
            slash_percent: resolution.slash_percent,
            submitted_slash_percent: resolution.submitted_slash_percent,
            notes: resolution.notes.clone(),
            resolved_at: resolution.resolved_at,
            resolved_by: resolution.resolved_by.clone(),
            actions: resolution.actions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub success: bool,
    pub resolution: ResolutionBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeDetailResponse {
    pub success: bool,
    pub dispute: Dispute,
    pub stage: EscalationStage,
    pub user_history: UserHistory,
    pub lp_history: UserHistory,
    /// Quoted only when the disputed amount is on record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arbitrator_reward: Option<Decimal>,
}

// ============================================================================
// LP Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub direction: TradeDirection,
}

/// Match outcome; `matched` is null when the order fell back to pooled
/// liquidity, because collaborators key off that shape
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBody {
    pub matched: Option<LiquidityProvider>,
    pub is_high_value: bool,
    pub estimated_rate: Decimal,
}

impl MatchBody {
    pub fn from_match(m: LpMatch) -> Self {
        let is_high_value = m.is_high_value;
        let estimated_rate = m.rate;
        let matched = m.is_dedicated().then_some(m.provider);
        Self {
            matched,
            is_high_value,
            estimated_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub success: bool,
    pub matched: Option<LiquidityProvider>,
    pub is_high_value: bool,
    pub estimated_rate: Decimal,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProviderRequest {
    pub id: String,
    pub stake: Decimal,
    pub rate: Decimal,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderResponse {
    pub success: bool,
    pub provider: LiquidityProvider,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolResponse {
    pub success: bool,
    pub providers: Vec<LiquidityProvider>,
    pub total_liquidity: Decimal,
}

// ============================================================================
// Admin & Health Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ControlResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: i64,
    pub tracked_users: usize,
    pub open_disputes: usize,
    pub pool_providers: usize,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Engine error carried to the wire as `{ success: false, error }` with the
/// matching status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match &err {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}
