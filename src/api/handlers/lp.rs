use axum::{extract::State, Json};

use crate::api::{state::AppState, types::*};
use crate::domain::LiquidityProvider;

/// POST /api/lp/match
pub async fn match_order(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> std::result::Result<Json<MatchResponse>, ApiError> {
    let m = state.engine.match_order(req.amount, req.direction).await?;

    let message = if m.is_dedicated() {
        format!("order matched to provider {}", m.provider.id)
    } else {
        "no dedicated provider available; using pooled liquidity".to_string()
    };
    let body = MatchBody::from_match(m);

    Ok(Json(MatchResponse {
        success: true,
        matched: body.matched,
        is_high_value: body.is_high_value,
        estimated_rate: body.estimated_rate,
        message,
    }))
}

/// GET /api/lp/pool
pub async fn get_pool(State(state): State<AppState>) -> Json<PoolResponse> {
    let (providers, total_liquidity) = state.engine.pool_snapshot().await;
    Json(PoolResponse {
        success: true,
        providers,
        total_liquidity,
    })
}

/// PUT /api/lp/providers
pub async fn upsert_provider(
    State(state): State<AppState>,
    Json(req): Json<UpsertProviderRequest>,
) -> std::result::Result<Json<ProviderResponse>, ApiError> {
    let provider = LiquidityProvider {
        id: req.id,
        stake: req.stake,
        rate: req.rate,
        available: req.available,
    };
    state.engine.upsert_provider(provider.clone()).await?;

    Ok(Json(ProviderResponse {
        success: true,
        provider,
    }))
}
