use log::{debug, error};
use thiserror::Error;

use crate::config::Settings;

/// Error type for configuration validation issues
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Incompatible settings: {0}")]
    IncompatibleSettings(String),

    #[error("Missing required setting for: {0}")]
    MissingRequiredSetting(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}

/// Result of configuration validation
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigValidationError>,
    /// Valid but not recommended
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// First error, if any.
    pub fn into_result(self) -> Result<(), ConfigValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// A single check applied to loaded settings
pub trait ValidationRule {
    fn name(&self) -> &str;

    fn validate(&self, settings: &Settings) -> Result<(), ConfigValidationError>;
}

struct RpcUrlRule;

impl ValidationRule for RpcUrlRule {
    fn name(&self) -> &str {
        "rpc_url"
    }

    fn validate(&self, settings: &Settings) -> Result<(), ConfigValidationError> {
        if settings.rpc_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequiredSetting("rpc_url".to_string()));
        }
        match reqwest::Url::parse(&settings.rpc_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
            Ok(url) => Err(ConfigValidationError::InvalidValue(format!(
                "rpc_url must use http or https, got {}",
                url.scheme()
            ))),
            Err(e) => Err(ConfigValidationError::InvalidValue(format!("rpc_url: {}", e))),
        }
    }
}

struct GuardianAddressRule;

impl ValidationRule for GuardianAddressRule {
    fn name(&self) -> &str {
        "guardian_address"
    }

    fn validate(&self, settings: &Settings) -> Result<(), ConfigValidationError> {
        if settings.guardian_address.is_zero() {
            return Err(ConfigValidationError::InvalidValue(
                "guardian_address must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }
}

struct NonZeroRule;

impl ValidationRule for NonZeroRule {
    fn name(&self) -> &str {
        "non_zero"
    }

    fn validate(&self, settings: &Settings) -> Result<(), ConfigValidationError> {
        let checks: [(&str, u64); 5] = [
            ("reward_periods_per_year", settings.reward_periods_per_year),
            ("max_concurrent_pools", settings.max_concurrent_pools as u64),
            ("request_timeout_secs", settings.request_timeout_secs),
            ("confirmation_poll_interval_ms", settings.confirmation_poll_interval_ms),
            ("confirmation_timeout_secs", settings.confirmation_timeout_secs),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigValidationError::ValueOutOfRange(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

struct ConfirmationTimingRule;

impl ValidationRule for ConfirmationTimingRule {
    fn name(&self) -> &str {
        "confirmation_timing"
    }

    fn validate(&self, settings: &Settings) -> Result<(), ConfigValidationError> {
        if settings.confirmation_poll_interval() >= settings.confirmation_timeout() {
            return Err(ConfigValidationError::IncompatibleSettings(
                "confirmation_poll_interval_ms must be shorter than confirmation_timeout_secs"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Applies every rule to a set of settings
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        let mut validator = Self { rules: Vec::new() };
        validator.add_rule(Box::new(RpcUrlRule));
        validator.add_rule(Box::new(GuardianAddressRule));
        validator.add_rule(Box::new(NonZeroRule));
        validator.add_rule(Box::new(ConfirmationTimingRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn validate(&self, settings: &Settings) -> ValidationResult {
        let mut result = ValidationResult::new();

        for rule in &self.rules {
            match rule.validate(settings) {
                Ok(()) => debug!("Validation rule '{}' passed", rule.name()),
                Err(err) => {
                    error!("Validation rule '{}' failed: {}", rule.name(), err);
                    result.add_error(err);
                }
            }
        }

        if settings.max_concurrent_pools > 32 {
            result.add_warning(format!(
                "max_concurrent_pools = {} may trip provider rate limits",
                settings.max_concurrent_pools
            ));
        }
        if settings.rpc_url.starts_with("http://")
            && !settings.rpc_url.contains("127.0.0.1")
            && !settings.rpc_url.contains("localhost")
        {
            result.add_warning("rpc_url points at a remote host over plain http".to_string());
        }

        result
    }
}
