// Chain transport: the raw calls a wallet provider answers.

pub mod rpc;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use crate::errors::StakeError;

pub use rpc::HttpRpcClient;

/// Block at which a read is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Number(u64),
}

impl BlockTag {
    /// JSON-RPC block parameter
    pub fn to_param(&self) -> String {
        match self {
            BlockTag::Latest => "latest".to_string(),
            BlockTag::Number(number) => format!("0x{:x}", number),
        }
    }
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    /// Execution status; false when the transaction reverted
    pub success: bool,
}

/// Raw access to a chain through a wallet provider.
///
/// Every method is a network round-trip. Failures are reported as
/// [`StakeError::ChainCommunication`] and never retried here.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Accounts the wallet exposes, the active one first
    async fn request_accounts(&self) -> Result<Vec<Address>, StakeError>;

    async fn chain_id(&self) -> Result<u64, StakeError>;

    async fn block_number(&self) -> Result<u64, StakeError>;

    /// Read-only contract call
    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>, StakeError>;

    /// Ask the wallet to sign and broadcast a contract call from `from`
    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<B256, StakeError>;

    /// `None` while the transaction is still pending
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, StakeError>;
}
