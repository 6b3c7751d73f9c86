// Write path: stake / unstake / compound sequencing.
//
// Every operation runs to confirmation. Failures are returned from the
// `try_*` methods and collapsed to a logged `ActionResult` by the others.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::errors::StakeError;
use crate::gateway::{ContractGateway, PendingTransaction, PoolId};
use crate::units::{Amount, UnitConverter};
use crate::utils::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Stake,
    Unstake,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Stake => write!(f, "stake"),
            ActionKind::Unstake => write!(f, "unstake"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = StakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stake" => Ok(ActionKind::Stake),
            "unstake" => Ok(ActionKind::Unstake),
            other => Err(StakeError::InvalidActionKind(other.to_string())),
        }
    }
}

/// Parse a `0x`-prefixed 20-byte hex address.
pub fn parse_address(value: &str) -> Result<Address, StakeError> {
    let value = value.trim();
    if !value.starts_with("0x") || value.len() != 42 {
        return Err(StakeError::InvalidAddress(value.to_string()));
    }
    Address::from_str(value).map_err(|_| StakeError::InvalidAddress(value.to_string()))
}

/// A single stake or unstake, as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub pool_id: PoolId,
    /// Human-decimal token amount
    pub amount: String,
    pub token_address: Address,
    pub kind: ActionKind,
}

impl ActionRequest {
    pub fn new(pool_id: PoolId, amount: impl Into<String>, token_address: Address, kind: ActionKind) -> Self {
        Self {
            pool_id,
            amount: amount.into(),
            token_address,
            kind,
        }
    }

    /// Build a request from untyped input. The amount is validated later,
    /// when the request is executed.
    pub fn parse(pool_id: PoolId, amount: &str, token_address: &str, kind: &str) -> Result<Self, StakeError> {
        Ok(Self::new(pool_id, amount, parse_address(token_address)?, kind.parse()?))
    }
}

/// What the caller sees of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub success: bool,
}

impl ActionResult {
    pub fn success() -> Self {
        Self { success: true }
    }

    pub fn failure() -> Self {
        Self { success: false }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Transactions that made up a confirmed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub approval_tx: Option<B256>,
    pub tx_hash: B256,
}

async fn confirm(tx: Box<dyn PendingTransaction>) -> Result<B256, StakeError> {
    let hash = tx.tx_hash();
    if tx.wait_confirmed().await? {
        Ok(hash)
    } else {
        Err(StakeError::TransactionNotConfirmed(hash))
    }
}

/// Submits guardian actions and waits for them to confirm.
///
/// Nothing is retried: a failed or cancelled action is reported and left for
/// the user to start again.
pub struct ActionExecutor {
    gateway: Arc<dyn ContractGateway>,
    converter: UnitConverter,
}

impl ActionExecutor {
    pub fn new(gateway: Arc<dyn ContractGateway>) -> Self {
        Self {
            gateway,
            converter: UnitConverter::new(),
        }
    }

    pub async fn execute(&self, request: &ActionRequest, cancel: &CancellationToken) -> ActionResult {
        match self.try_execute(request, cancel).await {
            Ok(outcome) => {
                info!(
                    "{} of {} in pool {} confirmed ({})",
                    request.kind, request.amount, request.pool_id, outcome.tx_hash
                );
                ActionResult::success()
            }
            Err(e) => {
                error!(
                    "{} of {} in pool {} failed: {}",
                    request.kind, request.amount, request.pool_id, e
                );
                ActionResult::failure()
            }
        }
    }

    pub async fn try_execute(
        &self,
        request: &ActionRequest,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome, StakeError> {
        cancel.check()?;
        let amount = self.converter.to_base_units(&request.amount)?;

        match request.kind {
            ActionKind::Stake => {
                self.stake(request.pool_id, request.token_address, amount, cancel)
                    .await
            }
            ActionKind::Unstake => self.unstake(request.pool_id, amount).await,
        }
    }

    /// Harvest and restake pending rewards across pools.
    pub async fn compound(&self, cancel: &CancellationToken) -> ActionResult {
        match self.try_compound(cancel).await {
            Ok(outcome) => {
                info!("Auto-compound confirmed ({})", outcome.tx_hash);
                ActionResult::success()
            }
            Err(e) => {
                error!("Auto-compound failed: {}", e);
                ActionResult::failure()
            }
        }
    }

    pub async fn try_compound(&self, cancel: &CancellationToken) -> Result<ActionOutcome, StakeError> {
        cancel.check()?;
        let tx_hash = confirm(self.gateway.auto_compound().await?).await?;
        Ok(ActionOutcome {
            approval_tx: None,
            tx_hash,
        })
    }

    async fn stake(
        &self,
        pid: PoolId,
        token: Address,
        amount: Amount,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome, StakeError> {
        let guardian = self.gateway.guardian_address();
        let approval = self.gateway.erc20(token).approve(guardian, amount).await?;
        let approval_tx = approval.tx_hash();
        debug!("Approval {} of {} to {} submitted", approval_tx, amount, guardian);

        if !approval.wait_confirmed().await? {
            return Err(StakeError::ApprovalNotConfirmed(approval_tx));
        }

        if cancel.is_cancelled() {
            warn!(
                "Stake in pool {} cancelled after approval {} confirmed; allowance left unused",
                pid, approval_tx
            );
            return Err(StakeError::Cancelled);
        }

        let tx_hash = confirm(self.gateway.stake(pid, amount).await?).await?;
        Ok(ActionOutcome {
            approval_tx: Some(approval_tx),
            tx_hash,
        })
    }

    async fn unstake(&self, pid: PoolId, amount: Amount) -> Result<ActionOutcome, StakeError> {
        let tx_hash = confirm(self.gateway.unstake(pid, amount).await?).await?;
        Ok(ActionOutcome {
            approval_tx: None,
            tx_hash,
        })
    }
}
