use std::sync::Arc;

use alloy_primitives::Address;
use serde::Serialize;

use crate::errors::StakeError;
use crate::gateway::ContractGateway;
use crate::networking::BlockTag;
use crate::units::{DisplayAmount, DisplayContext, UnitConverter};

/// Token balances of the guardian and of the user, at display precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalances {
    #[serde(rename = "pool")]
    pub pool_balance: DisplayAmount,
    #[serde(rename = "user")]
    pub user_balance: DisplayAmount,
}

/// Reads a token's balance for the guardian and for a user.
#[derive(Clone)]
pub struct BalanceReader {
    gateway: Arc<dyn ContractGateway>,
    converter: UnitConverter,
}

impl BalanceReader {
    pub fn new(gateway: Arc<dyn ContractGateway>, converter: UnitConverter) -> Self {
        Self { gateway, converter }
    }

    pub async fn read_balances(
        &self,
        token: Address,
        guardian: Address,
        user: Address,
    ) -> Result<TokenBalances, StakeError> {
        self.read_balances_at(token, guardian, user, BlockTag::Latest).await
    }

    /// Both reads are issued together; either failing fails the call.
    pub async fn read_balances_at(
        &self,
        token: Address,
        guardian: Address,
        user: Address,
        block: BlockTag,
    ) -> Result<TokenBalances, StakeError> {
        let contract = self.gateway.erc20(token);
        let (pool, wallet) = futures::try_join!(
            contract.balance_of(guardian, block),
            contract.balance_of(user, block)
        )?;

        Ok(TokenBalances {
            pool_balance: self.converter.to_display(pool, DisplayContext::Default),
            user_balance: self.converter.to_display(wallet, DisplayContext::Default),
        })
    }
}
