use axum::{extract::State, Json};
use chrono::Utc;

use crate::api::{state::AppState, types::*};

/// POST /api/orders/admit
///
/// The whole admission pipeline in one call: score and record the attempt,
/// then quote the LP collateral and a counterparty unless the order was
/// blocked.
pub async fn admit_order(
    State(state): State<AppState>,
    Json(req): Json<AdmitRequest>,
) -> std::result::Result<Json<AdmitResponse>, ApiError> {
    let order = req.order_data.into_order(req.user_address);
    let decision = state
        .engine
        .admit_order(&order, req.direction, Utc::now())
        .await?;

    let assessment = decision.assessment;
    Ok(Json(AdmitResponse {
        success: true,
        admitted: !assessment.blocked,
        risk_score: assessment.score,
        risk_level: assessment.level,
        required_actions: assessment.required_actions,
        stake: decision.stake,
        lp_match: decision.lp_match.map(MatchBody::from_match),
    }))
}

/// POST /api/orders/complete
pub async fn complete_order(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    state
        .engine
        .record_completion(&req.user_address, req.amount_usdc, Utc::now())?;
    Ok(Json(serde_json::json!({ "success": true })))
}
