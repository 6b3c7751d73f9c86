pub mod actions;
pub mod client;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod networking;
pub mod pools;
pub mod units;
pub mod utils;
pub mod wallet;

// Re-export commonly used items
pub use actions::{ActionExecutor, ActionKind, ActionOutcome, ActionRequest, ActionResult};
pub use client::StakingClient;
pub use config::Settings;
pub use errors::StakeError;
pub use gateway::{ContractGateway, Erc20Token, PendingTransaction, PoolId, RpcGateway};
pub use networking::{BlockTag, ChainClient, HttpRpcClient, TxReceipt};
pub use pools::{BalanceReader, PoolAggregator, PoolRecord, TokenBalances};
pub use units::{Amount, DisplayAmount, DisplayContext, UnitConverter};
pub use utils::CancellationToken;
pub use wallet::{Chain, WalletSession};
