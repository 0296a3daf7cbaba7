//! Multi-step engine scenarios: admission, activity counters, disputes and
//! LP matching interacting over time, against the in-memory store and the
//! log-only settlement sink.

use chrono::{DateTime, Duration, Utc};
use peergate::config::PolicyConfig;
use peergate::domain::{
    EscalationStage, LiquidityProvider, OrderAnalysisData, RequiredAction, RiskLevel,
    TradeDirection,
};
use peergate::engine::Engine;
use peergate::settlement::LogSettlement;
use peergate::store::InMemoryHistoryStore;
use rust_decimal_macros::dec;
use std::sync::Arc;

// 14:30 in the reference zone (+05:30): outside the suspicious-hour window.
fn daytime() -> DateTime<Utc> {
    "2024-03-01T09:00:00Z".parse().unwrap()
}

fn engine() -> Engine {
    Engine::new(
        PolicyConfig::default(),
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(LogSettlement),
    )
}

#[tokio::test]
async fn velocity_block_lifts_after_the_hourly_epoch() {
    let engine = engine();
    let now = daytime();
    let order = OrderAnalysisData::new("0xtrader", dec!(50)).with_payment_method("upi");

    for _ in 0..5 {
        let decision = engine
            .admit_order(&order, TradeDirection::Buy, now)
            .await
            .unwrap();
        assert!(!decision.assessment.blocked);
    }
    let sixth = engine
        .admit_order(&order, TradeDirection::Buy, now)
        .await
        .unwrap();
    assert!(sixth.assessment.blocked);

    engine.reset_hourly();

    // Hourly window cleared; all six attempts stay on the daily counter.
    let profile = engine.user_profile("0xtrader", now).unwrap();
    assert_eq!(profile.orders_last_hour, 0);
    assert_eq!(profile.orders_last_day, 6);

    let readmitted = engine
        .admit_order(&order, TradeDirection::Buy, now)
        .await
        .unwrap();
    assert!(!readmitted.assessment.blocked);
    assert!(readmitted.stake.is_some());
    assert!(readmitted.lp_match.is_some());
}

#[tokio::test]
async fn dispute_history_raises_the_collateral_quote() {
    let engine = engine();
    let now = daytime();
    let order = OrderAnalysisData::new("0xrepeat", dec!(1000));

    let clean = engine
        .admit_order(&order, TradeDirection::Sell, now)
        .await
        .unwrap();
    assert_eq!(clean.assessment.level, RiskLevel::Low);
    assert_eq!(clean.stake.unwrap().amount, dec!(50));

    for order_id in ["order-a", "order-b"] {
        engine
            .open_dispute(order_id, None, "0xrepeat", "0xlp", "lp", None, now)
            .unwrap();
    }

    // Two dispute marks push the same order into the medium band.
    let marked = engine
        .admit_order(&order, TradeDirection::Sell, now)
        .await
        .unwrap();
    assert_eq!(marked.assessment.level, RiskLevel::Medium);
    assert!(marked.assessment.requires(RequiredAction::ManualReview));
    let stake = marked.stake.unwrap();
    assert_eq!(stake.multiplier, dec!(1.5));
    assert_eq!(stake.amount, dec!(75));
}

#[tokio::test]
async fn completions_drive_the_average_and_the_escalation_signal() {
    let engine = engine();
    let now = daytime();

    for amount in [dec!(120), dec!(80), dec!(400)] {
        engine.record_completion("0xsteady", amount, now).unwrap();
    }
    let profile = engine.user_profile("0xsteady", now).unwrap();
    assert_eq!(profile.completed_orders, 3);
    assert_eq!(profile.total_volume, dec!(600));
    assert_eq!(profile.avg_order_amount, dec!(200));

    // Double the running average trips the jump signal; just under does not.
    let jump = OrderAnalysisData::new("0xsteady", dec!(401));
    assert_eq!(engine.analyze_order(&jump, now).unwrap().score, 15);

    let usual = OrderAnalysisData::new("0xsteady", dec!(399));
    assert_eq!(engine.analyze_order(&usual, now).unwrap().score, 0);
}

#[tokio::test]
async fn dispute_escalates_to_admin_review_and_resolves_there() {
    let engine = engine();
    let raised = daytime();
    let dispute = engine
        .open_dispute(
            "order-44",
            Some(dec!(800)),
            "0xuser",
            "0xlp",
            "user",
            Some("payment screenshots disagree".to_string()),
            raised,
        )
        .unwrap();
    assert_eq!(engine.open_disputes(), 1);

    let aged = raised + Duration::hours(5);
    let detail = engine.dispute_detail(&dispute.id, aged).unwrap();
    assert_eq!(detail.stage, EscalationStage::AdminReview);
    assert_eq!(detail.arbitrator_reward, Some(dec!(4)));

    let resolved = engine
        .resolve_dispute(
            &dispute.id,
            "user_wins",
            Some(20),
            "admin-2",
            Some("LP released past the deadline".to_string()),
            aged,
        )
        .await
        .unwrap();
    let resolution = resolved.resolution.unwrap();
    assert_eq!(resolution.resolved_by, "admin-2");
    assert_eq!(resolution.slash_percent, 20);
    assert!(resolution.actions.lp_slashed);
    assert!(!resolution.actions.lp_banned);

    assert_eq!(engine.open_disputes(), 0);
    let after = engine.dispute_detail(&dispute.id, aged).unwrap();
    assert!(after.dispute.is_resolved());
}

#[tokio::test]
async fn unavailable_or_understaked_providers_fall_back_to_the_pool() {
    let engine = engine();
    engine
        .upsert_provider(LiquidityProvider {
            id: "big-but-away".to_string(),
            stake: dec!(900),
            rate: dec!(1.002),
            available: false,
        })
        .await
        .unwrap();
    engine
        .upsert_provider(LiquidityProvider {
            id: "small".to_string(),
            stake: dec!(100),
            rate: dec!(1.001),
            available: true,
        })
        .await
        .unwrap();

    // A 600 order needs 300 posted; nobody qualifies, both directions quote
    // the pool baseline.
    let buy = engine
        .match_order(dec!(600), TradeDirection::Buy)
        .await
        .unwrap();
    assert!(!buy.is_dedicated());
    assert!(buy.provider.is_pooled());
    assert_eq!(buy.rate, dec!(1.005));

    let sell = engine
        .match_order(dec!(600), TradeDirection::Sell)
        .await
        .unwrap();
    assert_eq!(sell.rate, dec!(0.995));

    // Marking the big staker available again wins the next match at its rate.
    engine
        .upsert_provider(LiquidityProvider {
            id: "big-but-away".to_string(),
            stake: dec!(900),
            rate: dec!(1.002),
            available: true,
        })
        .await
        .unwrap();
    let matched = engine
        .match_order(dec!(600), TradeDirection::Buy)
        .await
        .unwrap();
    assert!(matched.is_dedicated());
    assert_eq!(matched.provider.id, "big-but-away");
    assert_eq!(matched.rate, dec!(1.002));
}

#[tokio::test]
async fn dispute_marks_follow_the_trader_into_later_scoring() {
    let engine = engine();
    let now = daytime();
    let order = OrderAnalysisData::new("0xbuyer", dec!(250)).with_payment_method("imps");

    let decision = engine
        .admit_order(&order, TradeDirection::Buy, now)
        .await
        .unwrap();
    assert!(!decision.assessment.blocked);

    engine.record_completion("0xbuyer", dec!(250), now).unwrap();
    let profile = engine.user_profile("0xbuyer", now).unwrap();
    assert_eq!(profile.completed_orders, 1);
    assert_eq!(profile.orders_last_hour, 2);

    let dispute = engine
        .open_dispute("order-77", Some(dec!(250)), "0xbuyer", "0xlp", "user", None, now)
        .unwrap();
    let resolved = engine
        .resolve_dispute(&dispute.id, "lp_wins", None, "auto", None, now)
        .await
        .unwrap();
    assert!(resolved.resolution.unwrap().actions.user_banned);

    // imps base risk plus one dispute mark.
    let next = engine.analyze_order(&order, now).unwrap();
    assert_eq!(next.score, 18);
    assert_eq!(next.level, RiskLevel::Low);
}
