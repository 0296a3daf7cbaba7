use axum::{extract::State, Json};
use tracing::info;

use crate::api::{state::AppState, types::*};

/// GET /health -- lightweight liveness probe with store and pool gauges
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_seconds(),
        tracked_users: state.engine.tracked_users(),
        open_disputes: state.engine.open_disputes(),
        pool_providers: state.engine.pool_size().await,
    })
}

/// POST /api/admin/reset-hourly
///
/// Invoked by the external scheduler at the top of each hour.
pub async fn reset_hourly(State(state): State<AppState>) -> Json<ControlResponse> {
    state.engine.reset_hourly();
    info!("hourly counters reset via API");
    Json(ControlResponse {
        success: true,
        message: "hourly counters reset".to_string(),
    })
}

/// POST /api/admin/reset-daily
pub async fn reset_daily(State(state): State<AppState>) -> Json<ControlResponse> {
    state.engine.reset_daily();
    info!("daily counters reset via API");
    Json(ControlResponse {
        success: true,
        message: "daily counters reset".to_string(),
    })
}
