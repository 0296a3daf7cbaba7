use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::{state::AppState, types::*};
use crate::error::EngineError;

/// POST /api/disputes
pub async fn open_dispute(
    State(state): State<AppState>,
    Json(req): Json<OpenDisputeRequest>,
) -> std::result::Result<Json<DisputeOpenedResponse>, ApiError> {
    let dispute = state.engine.open_dispute(
        &req.order_id,
        req.amount_usdc,
        &req.user_address,
        &req.lp_address,
        &req.raised_by,
        req.evidence,
        Utc::now(),
    )?;

    Ok(Json(DisputeOpenedResponse {
        success: true,
        dispute,
    }))
}

/// GET /api/disputes/:id
pub async fn get_dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> std::result::Result<Json<DisputeDetailResponse>, ApiError> {
    let detail = state.engine.dispute_detail(&id, Utc::now())?;

    Ok(Json(DisputeDetailResponse {
        success: true,
        dispute: detail.dispute,
        stage: detail.stage,
        user_history: detail.user_history,
        lp_history: detail.lp_history,
        arbitrator_reward: detail.arbitrator_reward,
    }))
}

/// POST /api/disputes/:id/resolve
pub async fn resolve_dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> std::result::Result<Json<ResolveResponse>, ApiError> {
    let resolved_by = req
        .resolved_by
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("admin");

    let resolved = state
        .engine
        .resolve_dispute(
            &id,
            &req.decision,
            req.slash_percentage,
            resolved_by,
            req.notes,
            Utc::now(),
        )
        .await?;

    let Some(resolution) = resolved.resolution.as_ref() else {
        return Err(EngineError::Internal("resolved dispute carries no resolution".into()).into());
    };

    Ok(Json(ResolveResponse {
        success: true,
        resolution: ResolutionBody::from_resolution(resolved.id, resolution),
    }))
}
