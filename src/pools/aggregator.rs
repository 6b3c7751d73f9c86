use std::sync::Arc;

use alloy_primitives::{Address, U256};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use serde::{Serialize, Serializer};

use crate::config::{Settings, DEFAULT_REWARD_PERIODS_PER_YEAR};
use crate::errors::StakeError;
use crate::gateway::{ContractGateway, PoolId};
use crate::networking::BlockTag;
use crate::pools::balances::BalanceReader;
use crate::units::{DisplayAmount, DisplayContext, UnitConverter, APR_DECIMALS, DEFAULT_DECIMALS};
use crate::utils::CancellationToken;

const DEFAULT_MAX_CONCURRENT_POOLS: usize = 4;

fn serialize_decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// One pool as seen by one user, read from a single block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolRecord {
    #[serde(rename = "pid")]
    pub pool_id: PoolId,
    #[serde(rename = "tokenaddr")]
    pub token_address: Address,
    /// Tokens held by the guardian for this pool
    #[serde(rename = "totalstaked")]
    pub total_staked: DisplayAmount,
    #[serde(rename = "rewardpertoken")]
    pub reward_per_token: DisplayAmount,
    #[serde(rename = "apy")]
    pub apr: DisplayAmount,
    #[serde(rename = "userstaked")]
    pub user_staked: DisplayAmount,
    #[serde(rename = "reward")]
    pub pending_reward: DisplayAmount,
    #[serde(serialize_with = "serialize_decimal")]
    pub multiplier: U256,
    #[serde(rename = "userbalance")]
    pub user_balance: DisplayAmount,
}

/// `periods_per_year * reward_per_token * 100`, at 3 decimals.
pub fn annualized_rate(reward_per_token: DisplayAmount, periods_per_year: u64) -> DisplayAmount {
    let scaled = reward_per_token.scaled() * U256::from(periods_per_year) * U256::from(100u64);
    DisplayAmount::new(scaled, reward_per_token.decimals()).rescale(APR_DECIMALS)
}

/// Builds the per-pool view of the guardian for one user.
pub struct PoolAggregator {
    gateway: Arc<dyn ContractGateway>,
    balances: BalanceReader,
    converter: UnitConverter,
    periods_per_year: u64,
    max_concurrent_pools: usize,
}

impl PoolAggregator {
    pub fn new(gateway: Arc<dyn ContractGateway>) -> Self {
        let converter = UnitConverter::new();
        Self {
            balances: BalanceReader::new(Arc::clone(&gateway), converter),
            gateway,
            converter,
            periods_per_year: DEFAULT_REWARD_PERIODS_PER_YEAR,
            max_concurrent_pools: DEFAULT_MAX_CONCURRENT_POOLS,
        }
    }

    pub fn from_settings(gateway: Arc<dyn ContractGateway>, settings: &Settings) -> Self {
        Self::new(gateway)
            .with_periods_per_year(settings.reward_periods_per_year)
            .with_max_concurrent_pools(settings.max_concurrent_pools)
    }

    pub fn with_periods_per_year(mut self, periods_per_year: u64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }

    pub fn with_max_concurrent_pools(mut self, max_concurrent_pools: usize) -> Self {
        self.max_concurrent_pools = max_concurrent_pools.max(1);
        self
    }

    pub fn periods_per_year(&self) -> u64 {
        self.periods_per_year
    }

    pub fn max_concurrent_pools(&self) -> usize {
        self.max_concurrent_pools
    }

    pub fn balances(&self) -> &BalanceReader {
        &self.balances
    }

    /// Every pool of the guardian, in pool index order.
    ///
    /// All reads are pinned to the block that is current when the call
    /// starts. Pools are read concurrently; any failed read fails the whole
    /// call. Cancellation is checked before each pool.
    pub async fn list_pools(
        &self,
        user: Address,
        cancel: &CancellationToken,
    ) -> Result<Vec<PoolRecord>, StakeError> {
        cancel.check()?;
        let snapshot = BlockTag::Number(self.gateway.block_number().await?);
        let count = self.gateway.pool_length(snapshot).await?;
        debug!("Reading {} pools at {:?} for {}", count, snapshot, user);

        let records: Vec<PoolRecord> = stream::iter(0..count)
            .map(|pid| self.read_pool(pid, user, snapshot, cancel))
            .buffered(self.max_concurrent_pools)
            .try_collect()
            .await?;

        info!("Aggregated {} pools for {}", records.len(), user);
        Ok(records)
    }

    async fn read_pool(
        &self,
        pid: PoolId,
        user: Address,
        block: BlockTag,
        cancel: &CancellationToken,
    ) -> Result<PoolRecord, StakeError> {
        cancel.check()?;
        let result = self.read_pool_unchecked(pid, user, block).await;
        if let Err(e) = &result {
            warn!("Reading pool {} failed: {}", pid, e);
        }
        result
    }

    async fn read_pool_unchecked(
        &self,
        pid: PoolId,
        user: Address,
        block: BlockTag,
    ) -> Result<PoolRecord, StakeError> {
        let info = self.gateway.pool_info(pid, block).await?;
        let reward_per_token = self
            .converter
            .to_display(info.reward_per_token, DisplayContext::Reward);

        let balances = self
            .balances
            .read_balances_at(info.token, self.gateway.guardian_address(), user, block)
            .await?;

        let user_info = self.gateway.user_info(pid, user, block).await?;
        let pending = self.gateway.pending_reward(pid, user, block).await?;
        let multiplier = self.gateway.bonus_multiplier(block).await?;

        // Reward precision first, then the 2-digit display precision
        let user_staked = self
            .converter
            .to_display(user_info.amount, DisplayContext::Reward)
            .rescale(DEFAULT_DECIMALS);
        let pending_reward = self
            .converter
            .to_display(pending, DisplayContext::Reward)
            .rescale(DEFAULT_DECIMALS);

        Ok(PoolRecord {
            pool_id: pid,
            token_address: info.token,
            total_staked: balances.pool_balance,
            reward_per_token,
            apr: annualized_rate(reward_per_token, self.periods_per_year),
            user_staked,
            pending_reward,
            multiplier,
            user_balance: balances.user_balance,
        })
    }
}
