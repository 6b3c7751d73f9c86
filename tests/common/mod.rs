#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy_primitives::{address, Address, B256, U256};
use alloy_sol_types::{SolCall, SolInterface};
use async_trait::async_trait;

use gs_stake_core::gateway::abi::{IGuardian, IERC20};
use gs_stake_core::{BlockTag, ChainClient, Settings, StakeError, StakingClient, TxReceipt, WalletSession};

pub const ACCOUNT: Address = address!("1111111111111111111111111111111111111111");
pub const SNAPSHOT_BLOCK: u64 = 4_200_000;

/// `units` whole tokens plus `thousandths`/1000, in 18-decimal base units
pub fn tokens(units: u64, thousandths: u64) -> U256 {
    let milli = U256::from(10u64).pow(U256::from(15u64));
    U256::from(units) * U256::from(1000u64) * milli + U256::from(thousandths) * milli
}

#[derive(Debug, Clone)]
pub struct FakePool {
    pub token: Address,
    pub reward_per_token: U256,
    pub user_amount: U256,
    pub pending: U256,
}

#[derive(Debug, Clone)]
pub struct SentTx {
    pub hash: B256,
    pub to: Address,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct State {
    sent: Vec<SentTx>,
    reverted: HashSet<B256>,
    read_blocks: Vec<BlockTag>,
}

/// In-memory chain answering guardian and ERC20 calls from ABI calldata.
pub struct FakeChain {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub guardian: Address,
    pub pools: Vec<FakePool>,
    pub balances: HashMap<(Address, Address), U256>,
    pub multiplier: U256,
    /// Transactions whose selector is listed here are mined but revert
    pub reverting: Vec<[u8; 4]>,
    state: Mutex<State>,
}

impl FakeChain {
    pub fn new(guardian: Address) -> Self {
        Self {
            accounts: vec![ACCOUNT],
            chain_id: Settings::default().chain_id,
            guardian,
            pools: Vec::new(),
            balances: HashMap::new(),
            multiplier: U256::from(1u64),
            reverting: Vec::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_pool(mut self, pool: FakePool) -> Self {
        self.pools.push(pool);
        self
    }

    pub fn with_balance(mut self, token: Address, holder: Address, amount: U256) -> Self {
        self.balances.insert((token, holder), amount);
        self
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn read_blocks(&self) -> Vec<BlockTag> {
        self.state.lock().unwrap().read_blocks.clone()
    }

    fn pool(&self, pid: U256) -> Result<&FakePool, StakeError> {
        self.pools
            .get(pid.to::<usize>())
            .ok_or_else(|| StakeError::ChainCommunication(format!("execution reverted: no pool {}", pid)))
    }

    fn guardian_call(&self, data: &[u8]) -> Result<Vec<u8>, StakeError> {
        use IGuardian::IGuardianCalls;

        let encoded = match IGuardianCalls::abi_decode(data, true)? {
            IGuardianCalls::poolLength(_) => {
                IGuardian::poolLengthCall::abi_encode_returns(&(U256::from(self.pools.len()),))
            }
            IGuardianCalls::poolInfo(call) => {
                let pool = self.pool(call.pid)?;
                IGuardian::poolInfoCall::abi_encode_returns(&(
                    pool.token,
                    U256::from(100u64),
                    U256::from(SNAPSHOT_BLOCK - 10),
                    pool.reward_per_token,
                ))
            }
            IGuardianCalls::userInfo(call) => {
                let pool = self.pool(call.pid)?;
                let amount = if call.user == ACCOUNT { pool.user_amount } else { U256::ZERO };
                IGuardian::userInfoCall::abi_encode_returns(&(amount, U256::ZERO))
            }
            IGuardianCalls::pendingReward(call) => {
                let pool = self.pool(call.pid)?;
                let pending = if call.user == ACCOUNT { pool.pending } else { U256::ZERO };
                IGuardian::pendingRewardCall::abi_encode_returns(&(pending,))
            }
            IGuardianCalls::BONUS_MULTIPLIER(_) => {
                IGuardian::BONUS_MULTIPLIERCall::abi_encode_returns(&(self.multiplier,))
            }
            _ => return Err(StakeError::ChainCommunication("not a view function".to_string())),
        };
        Ok(encoded)
    }

    fn token_call(&self, token: Address, data: &[u8]) -> Result<Vec<u8>, StakeError> {
        match IERC20::IERC20Calls::abi_decode(data, true)? {
            IERC20::IERC20Calls::balanceOf(call) => {
                let balance = self
                    .balances
                    .get(&(token, call.owner))
                    .copied()
                    .unwrap_or_default();
                Ok(IERC20::balanceOfCall::abi_encode_returns(&(balance,)))
            }
            _ => Err(StakeError::ChainCommunication("not a view function".to_string())),
        }
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, StakeError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, StakeError> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, StakeError> {
        Ok(SNAPSHOT_BLOCK)
    }

    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>, StakeError> {
        self.state.lock().unwrap().read_blocks.push(block);
        if to == self.guardian {
            self.guardian_call(&data)
        } else {
            self.token_call(to, &data)
        }
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<B256, StakeError> {
        if !self.accounts.contains(&from) {
            return Err(StakeError::ChainCommunication(format!("unknown account {}", from)));
        }
        let mut state = self.state.lock().unwrap();
        let hash = B256::with_last_byte(state.sent.len() as u8 + 1);
        if data.len() >= 4 && self.reverting.iter().any(|selector| data[..4] == selector[..]) {
            state.reverted.insert(hash);
        }
        state.sent.push(SentTx { hash, to, data });
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, StakeError> {
        let state = self.state.lock().unwrap();
        if !state.sent.iter().any(|tx| tx.hash == hash) {
            return Ok(None);
        }
        Ok(Some(TxReceipt {
            tx_hash: hash,
            block_number: Some(SNAPSHOT_BLOCK + 1),
            success: !state.reverted.contains(&hash),
        }))
    }
}

pub fn test_settings() -> Settings {
    Settings {
        confirmation_poll_interval_ms: 1,
        confirmation_timeout_secs: 1,
        ..Settings::default()
    }
}

/// Connect a client to `chain` the way the CLI does, minus HTTP.
pub async fn connect(chain: Arc<FakeChain>) -> Result<StakingClient, StakeError> {
    let settings = test_settings();
    let session = WalletSession::connect(chain, settings.chain()).await?;
    Ok(StakingClient::new(session, &settings))
}
