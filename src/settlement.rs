//! Settlement collaborator seam.
//!
//! The engine never touches funds itself: release, refund, slash and ban are
//! commands handed to whatever executes them (on-chain or otherwise). The
//! trait keeps that boundary mockable.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Release escrowed funds for an order to the winning user.
    async fn release_funds(&self, order_id: &str, to: &str) -> Result<()>;

    /// Return escrowed funds for an order to the LP.
    async fn refund_funds(&self, order_id: &str, to: &str) -> Result<()>;

    /// Forfeit a percentage of the LP's posted stake for an order. The
    /// executor owns the stake ledger, so the command carries the percent,
    /// not a computed amount.
    async fn slash_stake(&self, lp: &str, order_id: &str, percent: u8) -> Result<()>;

    /// Bar an account from further trading.
    async fn ban_account(&self, account: &str) -> Result<()>;
}

/// Stand-in settlement backend that only logs the commands it receives.
/// Useful for local runs and as the default until an executor is wired in.
#[derive(Debug, Default)]
pub struct LogSettlement;

#[async_trait]
impl Settlement for LogSettlement {
    async fn release_funds(&self, order_id: &str, to: &str) -> Result<()> {
        info!(order_id, to, "settlement: release funds");
        Ok(())
    }

    async fn refund_funds(&self, order_id: &str, to: &str) -> Result<()> {
        info!(order_id, to, "settlement: refund funds");
        Ok(())
    }

    async fn slash_stake(&self, lp: &str, order_id: &str, percent: u8) -> Result<()> {
        warn!(lp, order_id, percent, "settlement: slash stake");
        Ok(())
    }

    async fn ban_account(&self, account: &str) -> Result<()> {
        warn!(account, "settlement: ban account");
        Ok(())
    }
}
