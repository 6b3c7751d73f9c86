use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use log::{debug, trace, warn};
use tokio::time::{sleep, Instant};

use crate::errors::StakeError;
use crate::gateway::abi::{IGuardian, IERC20};
use crate::gateway::{
    ConfirmationPolicy, ContractGateway, Erc20Token, PendingTransaction, PoolId, PoolInfo, UserInfo,
};
use crate::networking::{BlockTag, ChainClient};
use crate::units::Amount;
use crate::wallet::WalletSession;

async fn read_contract<C>(
    client: &dyn ChainClient,
    to: Address,
    call: C,
    block: BlockTag,
) -> Result<C::Return, StakeError>
where
    C: SolCall + Send,
{
    trace!("eth_call {} on {} at {:?}", C::SIGNATURE, to, block);
    let data = client.call(to, call.abi_encode(), block).await?;
    Ok(C::abi_decode_returns(&data, true)?)
}

async fn submit<C>(
    client: &Arc<dyn ChainClient>,
    from: Address,
    to: Address,
    call: C,
    policy: ConfirmationPolicy,
) -> Result<Box<dyn PendingTransaction>, StakeError>
where
    C: SolCall + Send,
{
    let hash = client.send_transaction(from, to, call.abi_encode()).await?;
    debug!("{} submitted to {} as {}", C::SIGNATURE, to, hash);
    Ok(Box::new(RpcPendingTx::new(Arc::clone(client), hash, policy)))
}

fn pool_index(pid: PoolId) -> U256 {
    U256::from(pid)
}

/// Polls for the receipt of a submitted transaction.
pub struct RpcPendingTx {
    client: Arc<dyn ChainClient>,
    hash: B256,
    policy: ConfirmationPolicy,
}

impl RpcPendingTx {
    pub fn new(client: Arc<dyn ChainClient>, hash: B256, policy: ConfirmationPolicy) -> Self {
        Self { client, hash, policy }
    }
}

#[async_trait]
impl PendingTransaction for RpcPendingTx {
    fn tx_hash(&self) -> B256 {
        self.hash
    }

    async fn wait_confirmed(&self) -> Result<bool, StakeError> {
        let deadline = Instant::now() + self.policy.timeout;
        loop {
            if let Some(receipt) = self.client.transaction_receipt(self.hash).await? {
                if receipt.success {
                    debug!("Transaction {} confirmed in block {:?}", self.hash, receipt.block_number);
                } else {
                    warn!("Transaction {} reverted", self.hash);
                }
                return Ok(receipt.success);
            }
            if Instant::now() >= deadline {
                warn!(
                    "Transaction {} not mined within {:?}",
                    self.hash, self.policy.timeout
                );
                return Ok(false);
            }
            sleep(self.policy.poll_interval).await;
        }
    }
}

/// ERC20 token reached through the session's signer.
pub struct RpcErc20 {
    client: Arc<dyn ChainClient>,
    token: Address,
    account: Address,
    policy: ConfirmationPolicy,
}

#[async_trait]
impl Erc20Token for RpcErc20 {
    fn address(&self) -> Address {
        self.token
    }

    async fn balance_of(&self, holder: Address, block: BlockTag) -> Result<Amount, StakeError> {
        let ret = read_contract(
            self.client.as_ref(),
            self.token,
            IERC20::balanceOfCall { owner: holder },
            block,
        )
        .await?;
        Ok(Amount::new(ret._0))
    }

    async fn approve(&self, spender: Address, amount: Amount) -> Result<Box<dyn PendingTransaction>, StakeError> {
        submit(
            &self.client,
            self.account,
            self.token,
            IERC20::approveCall {
                spender,
                amount: amount.base_units(),
            },
            self.policy,
        )
        .await
    }
}

/// [`ContractGateway`] backed by a wallet session's JSON-RPC signer.
pub struct RpcGateway {
    client: Arc<dyn ChainClient>,
    account: Address,
    guardian: Address,
    policy: ConfirmationPolicy,
}

impl RpcGateway {
    pub fn new(session: &WalletSession, guardian: Address, policy: ConfirmationPolicy) -> Self {
        Self {
            client: session.signer(),
            account: session.account(),
            guardian,
            policy,
        }
    }

    async fn read<C>(&self, call: C, block: BlockTag) -> Result<C::Return, StakeError>
    where
        C: SolCall + Send,
    {
        read_contract(self.client.as_ref(), self.guardian, call, block).await
    }

    async fn write<C>(&self, call: C) -> Result<Box<dyn PendingTransaction>, StakeError>
    where
        C: SolCall + Send,
    {
        submit(&self.client, self.account, self.guardian, call, self.policy).await
    }
}

#[async_trait]
impl ContractGateway for RpcGateway {
    fn guardian_address(&self) -> Address {
        self.guardian
    }

    async fn block_number(&self) -> Result<u64, StakeError> {
        self.client.block_number().await
    }

    async fn pool_length(&self, block: BlockTag) -> Result<u64, StakeError> {
        let ret = self.read(IGuardian::poolLengthCall {}, block).await?;
        u64::try_from(ret._0)
            .map_err(|_| StakeError::ChainCommunication(format!("pool length out of range: {}", ret._0)))
    }

    async fn pool_info(&self, pid: PoolId, block: BlockTag) -> Result<PoolInfo, StakeError> {
        let ret = self
            .read(IGuardian::poolInfoCall { pid: pool_index(pid) }, block)
            .await?;
        Ok(PoolInfo {
            token: ret.token,
            alloc_point: ret.allocPoint,
            last_reward_block: ret.lastRewardBlock,
            reward_per_token: Amount::new(ret.rewardPerToken),
        })
    }

    async fn user_info(&self, pid: PoolId, user: Address, block: BlockTag) -> Result<UserInfo, StakeError> {
        let ret = self
            .read(IGuardian::userInfoCall { pid: pool_index(pid), user }, block)
            .await?;
        Ok(UserInfo {
            amount: Amount::new(ret.amount),
            reward_debt: Amount::new(ret.rewardDebt),
        })
    }

    async fn pending_reward(&self, pid: PoolId, user: Address, block: BlockTag) -> Result<Amount, StakeError> {
        let ret = self
            .read(IGuardian::pendingRewardCall { pid: pool_index(pid), user }, block)
            .await?;
        Ok(Amount::new(ret._0))
    }

    async fn bonus_multiplier(&self, block: BlockTag) -> Result<U256, StakeError> {
        let ret = self.read(IGuardian::BONUS_MULTIPLIERCall {}, block).await?;
        Ok(ret._0)
    }

    async fn stake(&self, pid: PoolId, amount: Amount) -> Result<Box<dyn PendingTransaction>, StakeError> {
        self.write(IGuardian::stakeCall {
            pid: pool_index(pid),
            amount: amount.base_units(),
        })
        .await
    }

    async fn unstake(&self, pid: PoolId, amount: Amount) -> Result<Box<dyn PendingTransaction>, StakeError> {
        self.write(IGuardian::unstakeCall {
            pid: pool_index(pid),
            amount: amount.base_units(),
        })
        .await
    }

    async fn auto_compound(&self) -> Result<Box<dyn PendingTransaction>, StakeError> {
        self.write(IGuardian::autoCompoundCall {}).await
    }

    fn erc20(&self, token: Address) -> Arc<dyn Erc20Token> {
        Arc::new(RpcErc20 {
            client: Arc::clone(&self.client),
            token,
            account: self.account,
            policy: self.policy,
        })
    }
}
