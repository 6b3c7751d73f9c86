// Typed façade over the guardian contract and ERC20 tokens.
// Call marshaling only: no conversions, no retries.

pub mod abi;
pub mod rpc;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::config::Settings;
use crate::errors::StakeError;
use crate::networking::BlockTag;
use crate::units::Amount;

pub use rpc::{RpcErc20, RpcGateway, RpcPendingTx};

/// Index into the guardian pool table
pub type PoolId = u64;

/// Guardian `poolInfo` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolInfo {
    pub token: Address,
    pub alloc_point: U256,
    pub last_reward_block: U256,
    /// Raw per-token reward rate, 18-decimal fixed point
    pub reward_per_token: Amount,
}

/// Guardian `userInfo` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub amount: Amount,
    pub reward_debt: Amount,
}

/// How long to wait for a submitted transaction to be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(180),
        }
    }
}

impl From<&Settings> for ConfirmationPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.confirmation_poll_interval(),
            timeout: settings.confirmation_timeout(),
        }
    }
}

/// A submitted, possibly unmined, transaction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PendingTransaction: Send + Sync {
    fn tx_hash(&self) -> B256;

    /// Suspends until the transaction is mined. `false` when it reverted or
    /// did not confirm in time.
    async fn wait_confirmed(&self) -> Result<bool, StakeError>;
}

/// An ERC20 token contract.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Erc20Token: Send + Sync {
    fn address(&self) -> Address;

    async fn balance_of(&self, holder: Address, block: BlockTag) -> Result<Amount, StakeError>;

    async fn approve(&self, spender: Address, amount: Amount) -> Result<Box<dyn PendingTransaction>, StakeError>;
}

/// The guardian contract plus access to arbitrary tokens.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContractGateway: Send + Sync {
    fn guardian_address(&self) -> Address;

    /// Current head, used to pin a set of reads to one state
    async fn block_number(&self) -> Result<u64, StakeError>;

    async fn pool_length(&self, block: BlockTag) -> Result<u64, StakeError>;

    async fn pool_info(&self, pid: PoolId, block: BlockTag) -> Result<PoolInfo, StakeError>;

    async fn user_info(&self, pid: PoolId, user: Address, block: BlockTag) -> Result<UserInfo, StakeError>;

    async fn pending_reward(&self, pid: PoolId, user: Address, block: BlockTag) -> Result<Amount, StakeError>;

    async fn bonus_multiplier(&self, block: BlockTag) -> Result<U256, StakeError>;

    async fn stake(&self, pid: PoolId, amount: Amount) -> Result<Box<dyn PendingTransaction>, StakeError>;

    async fn unstake(&self, pid: PoolId, amount: Amount) -> Result<Box<dyn PendingTransaction>, StakeError>;

    async fn auto_compound(&self) -> Result<Box<dyn PendingTransaction>, StakeError>;

    fn erc20(&self, token: Address) -> Arc<dyn Erc20Token>;
}
