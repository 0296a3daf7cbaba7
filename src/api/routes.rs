use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Fraud endpoints
        .route("/api/fraud/analyze", post(handlers::analyze_order))
        .route("/api/fraud/profile/:address", get(handlers::get_profile))
        // Order admission endpoints
        .route("/api/orders/admit", post(handlers::admit_order))
        .route("/api/orders/complete", post(handlers::complete_order))
        // Dispute endpoints
        .route("/api/disputes", post(handlers::open_dispute))
        .route("/api/disputes/:id", get(handlers::get_dispute))
        .route("/api/disputes/:id/resolve", post(handlers::resolve_dispute))
        // LP pool endpoints
        .route("/api/lp/match", post(handlers::match_order))
        .route("/api/lp/pool", get(handlers::get_pool))
        .route("/api/lp/providers", put(handlers::upsert_provider))
        // Admin endpoints
        .route("/api/admin/reset-hourly", post(handlers::reset_hourly))
        .route("/api/admin/reset-daily", post(handlers::reset_daily))
        // Health endpoint
        .route("/health", get(handlers::health_handler))
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
