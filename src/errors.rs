use alloy_primitives::B256;
use thiserror::Error;

use crate::config::validation::ConfigValidationError;

/// Errors raised by the staking core.
///
/// Read-path operations return these to the caller unchanged. The action
/// executor catches them, logs them and reports a plain failure instead.
#[derive(Debug, Error)]
pub enum StakeError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid action kind: {0}")]
    InvalidActionKind(String),

    #[error("Chain communication error: {0}")]
    ChainCommunication(String),

    #[error("Approval transaction {0} was not confirmed")]
    ApprovalNotConfirmed(B256),

    #[error("Transaction {0} was not confirmed")]
    TransactionNotConfirmed(B256),

    #[error("Wallet is connected to chain {actual}, expected chain {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("Wallet exposed no account")]
    NoAccount,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StakeError {
    fn from(err: reqwest::Error) -> Self {
        StakeError::ChainCommunication(format!("HTTP transport failed: {}", err))
    }
}

impl From<alloy_sol_types::Error> for StakeError {
    fn from(err: alloy_sol_types::Error) -> Self {
        StakeError::ChainCommunication(format!("Malformed contract response: {}", err))
    }
}

impl From<ConfigValidationError> for StakeError {
    fn from(err: ConfigValidationError) -> Self {
        StakeError::Config(err.to_string())
    }
}

impl From<config::ConfigError> for StakeError {
    fn from(err: config::ConfigError) -> Self {
        StakeError::Config(err.to_string())
    }
}
