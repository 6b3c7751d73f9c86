use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use log::info;

use crate::errors::StakeError;
use crate::networking::ChainClient;

/// Chain a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: u64,
    pub name: String,
}

impl Chain {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Chain { id, name: name.into() }
    }

    pub fn sepolia() -> Self {
        Chain::new(11_155_111, "sepolia")
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// An authenticated wallet connection: one account on one chain, plus the
/// signer that submits transactions for it.
///
/// Sessions are passed explicitly to every component that needs chain access.
#[derive(Clone)]
pub struct WalletSession {
    account: Address,
    chain: Chain,
    signer: Arc<dyn ChainClient>,
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("account", &self.account)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl WalletSession {
    pub fn new(account: Address, chain: Chain, signer: Arc<dyn ChainClient>) -> Self {
        WalletSession { account, chain, signer }
    }

    /// Ask the wallet for its active account and check it is on `expected`.
    pub async fn connect(signer: Arc<dyn ChainClient>, expected: Chain) -> Result<Self, StakeError> {
        let accounts = signer.request_accounts().await?;
        let account = accounts.first().copied().ok_or(StakeError::NoAccount)?;

        let actual = signer.chain_id().await?;
        if actual != expected.id {
            return Err(StakeError::WrongChain {
                expected: expected.id,
                actual,
            });
        }

        info!("Connected wallet {} on {}", account, expected);
        Ok(WalletSession::new(account, expected, signer))
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn signer(&self) -> Arc<dyn ChainClient> {
        Arc::clone(&self.signer)
    }
}
