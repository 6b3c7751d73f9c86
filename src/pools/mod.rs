// Read path: balances and per-pool aggregation.

pub mod aggregator;
pub mod balances;

pub use aggregator::{annualized_rate, PoolAggregator, PoolRecord};
pub use balances::{BalanceReader, TokenBalances};
