use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::api::{state::AppState, types::*};

/// POST /api/fraud/analyze
pub async fn analyze_order(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> std::result::Result<Json<AnalyzeResponse>, ApiError> {
    let order = req.order_data.into_order(req.user_address);
    let assessment = state.engine.analyze_order(&order, Utc::now())?;

    Ok(Json(AnalyzeResponse {
        success: true,
        risk_score: assessment.score,
        risk_level: assessment.level,
        blocked: assessment.blocked,
        required_actions: assessment.required_actions,
    }))
}

/// GET /api/fraud/profile/:address
pub async fn get_profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> std::result::Result<Json<ProfileResponse>, ApiError> {
    let history = state.engine.user_profile(&address, Utc::now())?;
    Ok(Json(ProfileResponse {
        success: true,
        history,
    }))
}
