use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use peergate::api::{create_router, AppState};
use peergate::config::PolicyConfig;
use peergate::engine::Engine;
use peergate::settlement::LogSettlement;
use peergate::store::InMemoryHistoryStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    let engine = Arc::new(Engine::new(
        PolicyConfig::default(),
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(LogSettlement),
    ));
    create_router(AppState::new(engine))
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request_builder = Request::builder().method(method).uri(uri);

    let request = if let Some(payload) = body {
        request_builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("failed to build json request")
    } else {
        request_builder
            .body(Body::empty())
            .expect("failed to build empty request")
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

/// Decimals cross the wire as strings; parse them back for comparison so
/// trailing-zero scale differences cannot break assertions.
fn decimal_field(value: &Value, key: &str) -> Decimal {
    value[key]
        .as_str()
        .unwrap_or_else(|| panic!("missing decimal field {key} in {value}"))
        .parse()
        .expect("invalid decimal string")
}

fn analyze_body(address: &str, amount: u32, method: &str) -> Value {
    json!({
        "orderData": { "amountUsdc": amount, "paymentMethod": method },
        "userAddress": address,
    })
}

#[tokio::test]
async fn sixth_order_in_an_hour_is_blocked_over_the_wire() {
    let app = test_app();

    for i in 0..5 {
        let (status, body) = send_json(
            &app,
            Method::POST,
            "/api/fraud/analyze",
            Some(analyze_body("0xburst", 50, "upi")),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "order {i} response: {body}");
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["blocked"], Value::Bool(false), "order {i}: {body}");
    }

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/fraud/analyze",
        Some(analyze_body("0xburst", 50, "upi")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    assert_eq!(body["blocked"], Value::Bool(true), "sixth order: {body}");
    assert!(body["riskScore"].as_u64().expect("missing riskScore") >= 55);

    let (status, body) =
        send_json(&app, Method::GET, "/api/fraud/profile/0xburst", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"]["ordersLastHour"], json!(6));
    assert_eq!(body["history"]["ordersLastDay"], json!(6));
    assert_eq!(body["history"]["completedOrders"], json!(0));
}

#[tokio::test]
async fn out_of_range_amount_is_rejected_with_wire_error_shape() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/fraud/analyze",
        Some(analyze_body("0xuser", 5, "upi")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected response: {body}");
    assert_eq!(body["success"], Value::Bool(false));
    assert!(
        body["error"].as_str().expect("missing error").contains("range"),
        "error body: {body}"
    );
}

#[tokio::test]
async fn completion_feed_drives_the_running_average() {
    let app = test_app();

    for amount in [100, 200, 300] {
        let (status, body) = send_json(
            &app,
            Method::POST,
            "/api/orders/complete",
            Some(json!({ "userAddress": "0xTrader", "amountUsdc": amount })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
        assert_eq!(body["success"], Value::Bool(true));
    }

    // Address lookup is case-insensitive.
    let (status, body) =
        send_json(&app, Method::GET, "/api/fraud/profile/0xtrader", None).await;
    assert_eq!(status, StatusCode::OK);
    let history = &body["history"];
    assert_eq!(history["completedOrders"], json!(3));
    assert_eq!(decimal_field(history, "avgOrderAmount"), dec!(200));
    assert_eq!(decimal_field(history, "totalVolume"), dec!(600));
}

#[tokio::test]
async fn admission_returns_stake_and_match_unless_blocked() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/orders/admit",
        Some(json!({
            "orderData": { "amountUsdc": 50, "paymentMethod": "upi" },
            "userAddress": "0xclean",
            "type": "buy",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    assert_eq!(body["admitted"], Value::Bool(true));
    // 50 x 5% is under the collateral floor.
    assert_eq!(decimal_field(&body["stake"], "amount"), dec!(10));
    // Empty pool: small orders route to pooled liquidity, matched stays null.
    assert_eq!(body["match"]["matched"], Value::Null);
    assert_eq!(decimal_field(&body["match"], "estimatedRate"), dec!(1.005));

    // Burn through the hourly allowance; the blocked admission carries no quote.
    for _ in 0..5 {
        send_json(
            &app,
            Method::POST,
            "/api/orders/admit",
            Some(json!({
                "orderData": { "amountUsdc": 50, "paymentMethod": "upi" },
                "userAddress": "0xclean",
                "type": "buy",
            })),
        )
        .await;
    }
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/orders/admit",
        Some(json!({
            "orderData": { "amountUsdc": 50, "paymentMethod": "upi" },
            "userAddress": "0xclean",
            "type": "buy",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admitted"], Value::Bool(false), "seventh order: {body}");
    assert_eq!(body["stake"], Value::Null);
    assert_eq!(body["match"], Value::Null);
}

#[tokio::test]
async fn high_value_match_picks_the_biggest_staker() {
    let app = test_app();

    for (id, stake) in [("lp-a", 500), ("lp-b", 250), ("lp-c", 100), ("lp-d", 450)] {
        let (status, body) = send_json(
            &app,
            Method::PUT,
            "/api/lp/providers",
            Some(json!({ "id": id, "stake": stake, "rate": "1.001" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "upsert {id}: {body}");
    }

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/lp/match",
        Some(json!({ "amount": 600, "type": "buy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    assert_eq!(body["isHighValue"], Value::Bool(true));
    assert_eq!(body["matched"]["id"], json!("lp-a"));
    assert_eq!(decimal_field(&body["matched"], "stake"), dec!(500));
    assert_eq!(decimal_field(&body, "estimatedRate"), dec!(1.001));

    // Small orders take the pooled baseline even with dedicated LPs present.
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/lp/match",
        Some(json!({ "amount": 80, "type": "buy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isHighValue"], Value::Bool(false));
    assert_eq!(body["matched"], Value::Null);
    assert_eq!(decimal_field(&body, "estimatedRate"), dec!(1.005));
    assert!(
        body["message"].as_str().expect("missing message").contains("pool"),
        "message body: {body}"
    );

    let (status, body) = send_json(&app, Method::GET, "/api/lp/pool", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers"].as_array().expect("providers array").len(), 4);
    assert_eq!(decimal_field(&body, "totalLiquidity"), dec!(1300));
}

#[tokio::test]
async fn reserved_provider_id_is_rejected() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/lp/providers",
        Some(json!({ "id": "pooled", "stake": 100, "rate": "1.0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected response: {body}");
    assert_eq!(body["success"], Value::Bool(false));
}

#[tokio::test]
async fn dispute_lifecycle_over_the_wire() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/disputes",
        Some(json!({
            "orderId": "order-9",
            "amountUsdc": 1000,
            "userAddress": "0xuser",
            "lpAddress": "0xlp",
            "raisedBy": "user",
            "evidence": "ipfs://proof",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    assert_eq!(body["dispute"]["status"], json!("opened"));
    let id = body["dispute"]["id"].as_str().expect("dispute id").to_string();

    // Fresh dispute: still in the auto-resolution window, reward quoted.
    let (status, body) =
        send_json(&app, Method::GET, &format!("/api/disputes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], json!("auto_window"));
    assert_eq!(decimal_field(&body, "arbitratorReward"), dec!(5));
    assert_eq!(body["userHistory"]["disputeCount"], json!(1));
    assert_eq!(body["lpHistory"]["disputeCount"], json!(1));

    // Off-schedule slash percentages are rejected before any state change.
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/disputes/{id}/resolve"),
        Some(json!({ "decision": "user_wins", "slashPercentage": 37 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected response: {body}");

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/disputes/{id}/resolve"),
        Some(json!({ "decision": "split" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected response: {body}");

    let (_, body) =
        send_json(&app, Method::GET, &format!("/api/disputes/{id}"), None).await;
    assert_eq!(body["dispute"]["status"], json!("opened"));

    // Resolve for the user with a full slash.
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/disputes/{id}/resolve"),
        Some(json!({
            "decision": "user_wins",
            "slashPercentage": 100,
            "notes": "fabricated payment proof",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    let resolution = &body["resolution"];
    assert_eq!(resolution["disputeId"], json!(id));
    assert_eq!(resolution["decision"], json!("user_wins"));
    assert_eq!(resolution["slashPercentage"], json!(100));
    assert_eq!(resolution["resolvedBy"], json!("admin"));
    let actions = &resolution["actions"];
    assert_eq!(actions["fundsReleased"], Value::Bool(true));
    assert_eq!(actions["fundsRefunded"], Value::Bool(false));
    assert_eq!(actions["lpSlashed"], Value::Bool(true));
    assert_eq!(actions["lpBanned"], Value::Bool(true));
    assert_eq!(actions["userBanned"], Value::Bool(false));

    // A second attempt conflicts and leaves the original resolution in place.
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/disputes/{id}/resolve"),
        Some(json!({ "decision": "lp_wins" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "unexpected response: {body}");
    assert_eq!(body["success"], Value::Bool(false));

    let (_, body) =
        send_json(&app, Method::GET, &format!("/api/disputes/{id}"), None).await;
    assert_eq!(body["dispute"]["status"], json!("resolved"));
    assert_eq!(body["dispute"]["resolution"]["decision"], json!("user_wins"));
}

#[tokio::test]
async fn lp_win_ignores_submitted_slash_and_bans_the_user() {
    let app = test_app();

    let (_, body) = send_json(
        &app,
        Method::POST,
        "/api/disputes",
        Some(json!({
            "orderId": "order-3",
            "userAddress": "0xuser",
            "lpAddress": "0xlp",
            "raisedBy": "lp",
        })),
    )
    .await;
    let id = body["dispute"]["id"].as_str().expect("dispute id").to_string();

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/disputes/{id}/resolve"),
        Some(json!({
            "decision": "lp_wins",
            "slashPercentage": 50,
            "resolvedBy": "panel-7",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    let resolution = &body["resolution"];
    assert_eq!(resolution["slashPercentage"], json!(0));
    assert_eq!(resolution["submittedSlashPercentage"], json!(50));
    assert_eq!(resolution["resolvedBy"], json!("panel-7"));
    let actions = &resolution["actions"];
    assert_eq!(actions["fundsRefunded"], Value::Bool(true));
    assert_eq!(actions["lpSlashed"], Value::Bool(false));
    assert_eq!(actions["userBanned"], Value::Bool(true));

    // No reward quote without a recorded amount.
    let (_, body) =
        send_json(&app, Method::GET, &format!("/api/disputes/{id}"), None).await;
    assert!(body.get("arbitratorReward").is_none(), "body: {body}");
}

#[tokio::test]
async fn unknown_and_malformed_dispute_ids() {
    let app = test_app();

    let missing = Uuid::new_v4();
    let (status, body) =
        send_json(&app, Method::GET, &format!("/api/disputes/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "unexpected response: {body}");

    let (status, _) = send_json(
        &app,
        Method::POST,
        &format!("/api/disputes/{missing}/resolve"),
        Some(json!({ "decision": "user_wins" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send_json(&app, Method::GET, "/api/disputes/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_resets_zero_the_matching_window_only() {
    let app = test_app();

    for _ in 0..3 {
        send_json(
            &app,
            Method::POST,
            "/api/fraud/analyze",
            Some(analyze_body("0xcycle", 75, "imps")),
        )
        .await;
    }

    let (status, body) =
        send_json(&app, Method::POST, "/api/admin/reset-hourly", None).await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    assert_eq!(body["success"], Value::Bool(true));

    let (_, body) = send_json(&app, Method::GET, "/api/fraud/profile/0xcycle", None).await;
    assert_eq!(body["history"]["ordersLastHour"], json!(0));
    assert_eq!(body["history"]["ordersLastDay"], json!(3));

    send_json(&app, Method::POST, "/api/admin/reset-daily", None).await;
    let (_, body) = send_json(&app, Method::GET, "/api/fraud/profile/0xcycle", None).await;
    assert_eq!(body["history"]["ordersLastDay"], json!(0));
}

#[tokio::test]
async fn health_reports_store_and_pool_gauges() {
    let app = test_app();

    send_json(
        &app,
        Method::POST,
        "/api/fraud/analyze",
        Some(analyze_body("0xone", 50, "upi")),
    )
    .await;
    send_json(
        &app,
        Method::PUT,
        "/api/lp/providers",
        Some(json!({ "id": "lp-1", "stake": 500, "rate": "1.001" })),
    )
    .await;

    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["tracked_users"], json!(1));
    assert_eq!(body["open_disputes"], json!(0));
    assert_eq!(body["pool_providers"], json!(1));
    assert!(body["uptime_secs"].as_i64().expect("uptime_secs") >= 0);
}
