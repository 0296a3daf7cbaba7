//! Decision Engine - 交易准入與爭議決策引擎
//!
//! 將風險評分、抵押計算、LP 撮合與爭議裁決串成決策流水線：
//! - 訂單准入: 活動計數讀取+遞增 → 評分 → 抵押要求 → 撮合
//! - 爭議: 開立 → 裁決 → 結算指令派發
//!
//! All mutable state (activity counters, dispute records, the LP pool) hangs
//! off this facade so the HTTP handlers stay thin.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::dispute::{arbitrator_reward, escalation_stage, DisputeStore};
use crate::domain::{
    Dispute, DisputeDecision, EscalationStage, LiquidityProvider, LpMatch, OrderAnalysisData,
    RiskAssessment, TradeDirection, UserHistory, POOLED_PROVIDER_ID,
};
use crate::error::{EngineError, Result};
use crate::matching::{self, LpRegistry};
use crate::risk::{self, StakeRequirement};
use crate::settlement::Settlement;
use crate::store::HistoryStore;

/// Admission decision for one incoming order.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionDecision {
    pub assessment: RiskAssessment,
    /// Collateral the matched LP must post; absent when blocked
    pub stake: Option<StakeRequirement>,
    /// Matched counterparty; absent when blocked
    pub lp_match: Option<LpMatch>,
}

/// Everything the dispute detail surface shows at once.
#[derive(Debug, Clone)]
pub struct DisputeDetail {
    pub dispute: Dispute,
    /// Authority expected to decide, given the dispute's age
    pub stage: EscalationStage,
    pub user_history: UserHistory,
    pub lp_history: UserHistory,
    /// What deciding this dispute pays an arbitrator, when the order amount
    /// is on record
    pub arbitrator_reward: Option<Decimal>,
}

pub struct Engine {
    config: PolicyConfig,
    history: Arc<dyn HistoryStore>,
    disputes: DisputeStore,
    pool: LpRegistry,
    settlement: Arc<dyn Settlement>,
}

impl Engine {
    pub fn new(
        config: PolicyConfig,
        history: Arc<dyn HistoryStore>,
        settlement: Arc<dyn Settlement>,
    ) -> Self {
        Self {
            config,
            history,
            disputes: DisputeStore::new(),
            pool: LpRegistry::new(),
            settlement,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    // ==================== 訂單准入 ====================

    /// Score an incoming order and record the attempt.
    ///
    /// Reads the requester's history before recording this order, so the
    /// scorer sees prior activity only. Fails closed: callers must treat any
    /// `Err` as a denied admission, never as an allow.
    pub fn analyze_order(
        &self,
        order: &OrderAnalysisData,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment> {
        self.validate_order(order)?;

        let history = self.history.get(&order.user_address, now);
        self.history
            .record_order(&order.user_address, order.amount, false, false, now);

        let assessment = risk::analyze(order, &history, now, &self.config);
        if assessment.blocked {
            warn!(
                user = %order.user_address,
                amount = %order.amount,
                score = assessment.score,
                level = %assessment.level,
                "order blocked by risk policy"
            );
        }
        Ok(assessment)
    }

    /// Full admission pipeline: score, then (unless blocked) derive the LP
    /// collateral requirement and pick a counterparty.
    pub async fn admit_order(
        &self,
        order: &OrderAnalysisData,
        direction: TradeDirection,
        now: DateTime<Utc>,
    ) -> Result<AdmissionDecision> {
        let assessment = self.analyze_order(order, now)?;
        if assessment.blocked {
            return Ok(AdmissionDecision {
                assessment,
                stake: None,
                lp_match: None,
            });
        }

        let stake = risk::required_stake(order.amount, assessment.score, &self.config);
        let pool = self.pool.snapshot().await;
        let lp_match = matching::match_lp(order.amount, direction, &pool, &self.config.matching);
        Ok(AdmissionDecision {
            assessment,
            stake: Some(stake),
            lp_match: Some(lp_match),
        })
    }

    fn validate_order(&self, order: &OrderAnalysisData) -> Result<()> {
        if order.user_address.trim().is_empty() {
            return Err(EngineError::Validation("userAddress is required".into()));
        }
        let limits = &self.config.orders;
        if order.amount < limits.min_amount || order.amount > limits.max_amount {
            return Err(EngineError::Validation(format!(
                "amount {} outside allowed range [{}, {}]",
                order.amount, limits.min_amount, limits.max_amount
            )));
        }
        Ok(())
    }

    /// Current activity snapshot for a user.
    pub fn user_profile(&self, address: &str, now: DateTime<Utc>) -> Result<UserHistory> {
        if address.trim().is_empty() {
            return Err(EngineError::Validation("address is required".into()));
        }
        Ok(self.history.get(address, now))
    }

    /// Fold a completed trade into the user's aggregates.
    pub fn record_completion(
        &self,
        user: &str,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if user.trim().is_empty() {
            return Err(EngineError::Validation("userAddress is required".into()));
        }
        if amount <= Decimal::ZERO {
            return Err(EngineError::Validation("amount must be positive".into()));
        }
        self.history.record_order(user, amount, true, false, now);
        Ok(())
    }

    // ==================== 爭議 ====================

    /// Open a dispute over a trade. Both participants pick up a dispute mark
    /// in their history.
    #[allow(clippy::too_many_arguments)]
    pub fn open_dispute(
        &self,
        order_id: &str,
        amount: Option<Decimal>,
        user_address: &str,
        lp_address: &str,
        raised_by: &str,
        evidence: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Dispute> {
        if order_id.trim().is_empty()
            || user_address.trim().is_empty()
            || lp_address.trim().is_empty()
        {
            return Err(EngineError::Validation(
                "orderId, userAddress and lpAddress are required".into(),
            ));
        }
        let raised_by = raised_by.trim().to_lowercase();
        if raised_by != "user" && raised_by != "lp" {
            return Err(EngineError::Validation(
                "raisedBy must be \"user\" or \"lp\"".into(),
            ));
        }

        self.history
            .record_order(user_address, Decimal::ZERO, false, true, now);
        self.history
            .record_order(lp_address, Decimal::ZERO, false, true, now);

        let dispute = self.disputes.insert(Dispute::open(
            order_id,
            amount,
            user_address,
            lp_address,
            raised_by,
            evidence,
            now,
        ));
        info!(
            dispute_id = %dispute.id,
            order_id,
            raised_by = %dispute.raised_by,
            "dispute opened"
        );
        Ok(dispute)
    }

    /// Apply an authority decision to a dispute and dispatch the settlement
    /// commands its resolution implies.
    ///
    /// The state transition commits before dispatch; a settlement failure
    /// surfaces as an internal error and is never retried here, since
    /// replaying a partially applied slash or release is unsafe without
    /// idempotency keys from the settlement side.
    pub async fn resolve_dispute(
        &self,
        id: &Uuid,
        decision: &str,
        slash_percent: Option<u8>,
        resolved_by: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Dispute> {
        let decision: DisputeDecision = decision.trim().parse()?;
        let resolved = self
            .disputes
            .resolve(id, decision, slash_percent, resolved_by, notes, now)?;

        if let Err(e) = self.dispatch_settlement(&resolved).await {
            error!(
                dispute_id = %resolved.id,
                error = %e,
                "settlement dispatch failed after resolution committed"
            );
            return Err(EngineError::Internal(format!(
                "settlement dispatch failed: {e}"
            )));
        }
        Ok(resolved)
    }

    async fn dispatch_settlement(&self, dispute: &Dispute) -> Result<()> {
        let Some(resolution) = dispute.resolution.as_ref() else {
            return Ok(());
        };
        let actions = &resolution.actions;

        if actions.funds_released {
            self.settlement
                .release_funds(&dispute.order_id, &dispute.user_address)
                .await?;
        }
        if actions.funds_refunded {
            self.settlement
                .refund_funds(&dispute.order_id, &dispute.lp_address)
                .await?;
        }
        if actions.lp_slashed {
            self.settlement
                .slash_stake(
                    &dispute.lp_address,
                    &dispute.order_id,
                    resolution.slash_percent,
                )
                .await?;
        }
        if actions.lp_banned {
            self.settlement.ban_account(&dispute.lp_address).await?;
        }
        if actions.user_banned {
            self.settlement.ban_account(&dispute.user_address).await?;
        }
        Ok(())
    }

    /// Full snapshot for the detail surface: the dispute itself, where it
    /// sits on the escalation timeline, and both participants' stats.
    pub fn dispute_detail(&self, id: &Uuid, now: DateTime<Utc>) -> Result<DisputeDetail> {
        let dispute = self.disputes.get(id)?;
        let stage = escalation_stage(dispute.raised_at, now, &self.config.disputes);
        let user_history = self.history.get(&dispute.user_address, now);
        let lp_history = self.history.get(&dispute.lp_address, now);
        let reward = dispute
            .amount
            .map(|amount| arbitrator_reward(amount, &self.config.disputes));

        Ok(DisputeDetail {
            dispute,
            stage,
            user_history,
            lp_history,
            arbitrator_reward: reward,
        })
    }

    // ==================== LP 池 ====================

    /// Match an order against the current pool snapshot.
    pub async fn match_order(&self, amount: Decimal, direction: TradeDirection) -> Result<LpMatch> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::Validation("amount must be positive".into()));
        }
        let pool = self.pool.snapshot().await;
        Ok(matching::match_lp(
            amount,
            direction,
            &pool,
            &self.config.matching,
        ))
    }

    /// Collaborator feed: insert or update a pool entry.
    pub async fn upsert_provider(&self, provider: LiquidityProvider) -> Result<()> {
        if provider.id.trim().is_empty() {
            return Err(EngineError::Validation("provider id is required".into()));
        }
        if provider.id == POOLED_PROVIDER_ID {
            return Err(EngineError::Validation(format!(
                "provider id \"{POOLED_PROVIDER_ID}\" is reserved"
            )));
        }
        if provider.stake < Decimal::ZERO || provider.rate <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "stake must be non-negative and rate positive".into(),
            ));
        }
        self.pool.upsert(provider).await;
        Ok(())
    }

    pub async fn pool_snapshot(&self) -> (Vec<LiquidityProvider>, Decimal) {
        let providers = self.pool.snapshot().await;
        let total = providers.iter().map(|p| p.stake).sum();
        (providers, total)
    }

    // ==================== 計數重置與健康 ====================

    /// Hourly epoch rollover, invoked by the external scheduler.
    pub fn reset_hourly(&self) {
        self.history.reset_hourly();
    }

    /// Daily epoch rollover.
    pub fn reset_daily(&self) {
        self.history.reset_daily();
    }

    pub fn tracked_users(&self) -> usize {
        self.history.tracked_users()
    }

    pub fn open_disputes(&self) -> usize {
        self.disputes.open_count()
    }

    pub async fn pool_size(&self) -> usize {
        self.pool.len().await
    }
}
