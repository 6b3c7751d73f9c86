// Configuration module for gs-stake
// Settings are read from an optional TOML file, then overridden by
// GS_STAKE_* environment variables.

pub mod validation;

use std::path::Path;
use std::time::Duration;

use alloy_primitives::{address, Address};
use config::{Config, Environment, File};
use log::{debug, warn};
use serde::Deserialize;

use crate::errors::StakeError;
use crate::wallet::Chain;

pub use validation::{ConfigValidationError, ConfigValidator, ValidationResult};

/// Guardian contract deployed on Sepolia.
pub const DEFAULT_GUARDIAN_ADDRESS: Address = address!("daF9680d4e909B1aFb28b3Fac3A223535f1B6ADf");

/// Sepolia chain id.
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Reward periods per year used by the APR formula.
/// The guardian does not publish its emission cadence, so this is an
/// operator-supplied assumption.
pub const DEFAULT_REWARD_PERIODS_PER_YEAR: u64 = 1000;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "GS_STAKE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON-RPC endpoint of the wallet provider
    pub rpc_url: String,

    /// Chain the wallet must be connected to
    pub chain_id: u64,

    pub chain_name: String,

    /// Guardian staking contract
    pub guardian_address: Address,

    /// Multiplier applied to the per-token reward rate to annualize it
    pub reward_periods_per_year: u64,

    /// Upper bound on pools read concurrently by one aggregation
    pub max_concurrent_pools: usize,

    /// HTTP request timeout
    pub request_timeout_secs: u64,

    /// Delay between transaction receipt polls
    pub confirmation_poll_interval_ms: u64,

    /// Give up waiting for a receipt after this long
    pub confirmation_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            chain_name: "sepolia".to_string(),
            guardian_address: DEFAULT_GUARDIAN_ADDRESS,
            reward_periods_per_year: DEFAULT_REWARD_PERIODS_PER_YEAR,
            max_concurrent_pools: 4,
            request_timeout_secs: 30,
            confirmation_poll_interval_ms: 1000,
            confirmation_timeout_secs: 180,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, StakeError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Run the validator, logging warnings and failing on the first error.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let result = ConfigValidator::new().validate(self);
        for warning in &result.warnings {
            warn!("Configuration warning: {}", warning);
        }
        result.into_result()
    }

    pub fn chain(&self) -> Chain {
        Chain::new(self.chain_id, self.chain_name.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[cfg(test)]
pub mod tests;
