use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use alloy_primitives::{address, Address};

use super::*;

// The process environment is shared by every test that loads settings
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_default_settings_are_valid() {
    let settings = Settings::default();
    assert_eq!(settings.chain_id, 11_155_111);
    assert_eq!(settings.reward_periods_per_year, 1000);
    assert_eq!(settings.guardian_address, DEFAULT_GUARDIAN_ADDRESS);

    let result = ConfigValidator::new().validate(&settings);
    assert!(result.is_valid);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let _env = env_lock();
    let file = write_config(
        r#"
rpc_url = "https://rpc.sepolia.example"
guardian_address = "0x1111111111111111111111111111111111111111"
reward_periods_per_year = 365
max_concurrent_pools = 8
"#,
    );

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.rpc_url, "https://rpc.sepolia.example");
    assert_eq!(
        settings.guardian_address,
        address!("1111111111111111111111111111111111111111")
    );
    assert_eq!(settings.reward_periods_per_year, 365);
    assert_eq!(settings.max_concurrent_pools, 8);
    // Untouched keys keep their defaults
    assert_eq!(settings.chain_id, DEFAULT_CHAIN_ID);
    assert_eq!(settings.confirmation_timeout_secs, 180);
}

#[test]
fn test_load_rejects_invalid_file() {
    let _env = env_lock();
    let file = write_config("reward_periods_per_year = 0\n");
    let err = Settings::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, StakeError::Config(_)));
}

#[test]
fn test_missing_file_is_an_error() {
    let _env = env_lock();
    let err = Settings::load(Some(Path::new("/nonexistent/gs-stake.toml"))).unwrap_err();
    assert!(matches!(err, StakeError::Config(_)));
}

#[test]
fn test_environment_overrides_file() {
    let _env = env_lock();
    let file = write_config(
        r#"
rpc_url = "https://rpc.sepolia.example"
guardian_address = "0x1111111111111111111111111111111111111111"
max_concurrent_pools = 8
"#,
    );

    let vars = [
        ("GS_STAKE_RPC_URL", "http://localhost:9999"),
        ("GS_STAKE_GUARDIAN_ADDRESS", "0xcccccccccccccccccccccccccccccccccccccccc"),
        ("GS_STAKE_MAX_CONCURRENT_POOLS", "9"),
    ];
    for (key, value) in vars {
        std::env::set_var(key, value);
    }
    let loaded = Settings::load(Some(file.path()));
    for (key, _) in vars {
        std::env::remove_var(key);
    }

    let settings = loaded.unwrap();
    assert_eq!(settings.rpc_url, "http://localhost:9999");
    assert_eq!(settings.guardian_address, Address::repeat_byte(0xcc));
    assert_eq!(settings.max_concurrent_pools, 9);
    // Keys only in the defaults are untouched
    assert_eq!(settings.chain_id, DEFAULT_CHAIN_ID);
}

#[test]
fn test_validator_flags_each_rule() {
    let validator = ConfigValidator::new();

    let mut settings = Settings::default();
    settings.rpc_url = "ws://127.0.0.1:8546".to_string();
    assert!(matches!(
        validator.validate(&settings).into_result(),
        Err(ConfigValidationError::InvalidValue(_))
    ));

    let mut settings = Settings::default();
    settings.guardian_address = Address::ZERO;
    assert!(!validator.validate(&settings).is_valid);

    let mut settings = Settings::default();
    settings.max_concurrent_pools = 0;
    assert!(matches!(
        validator.validate(&settings).into_result(),
        Err(ConfigValidationError::ValueOutOfRange(_))
    ));

    let mut settings = Settings::default();
    settings.confirmation_poll_interval_ms = 5_000;
    settings.confirmation_timeout_secs = 5;
    assert!(matches!(
        validator.validate(&settings).into_result(),
        Err(ConfigValidationError::IncompatibleSettings(_))
    ));
}

#[test]
fn test_validator_warnings() {
    let mut settings = Settings::default();
    settings.rpc_url = "http://rpc.example.org".to_string();
    settings.max_concurrent_pools = 64;

    let result = ConfigValidator::new().validate(&settings);
    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 2);
}

#[test]
fn test_duration_helpers() {
    let settings = Settings::default();
    assert_eq!(settings.confirmation_poll_interval().as_millis(), 1000);
    assert_eq!(settings.confirmation_timeout().as_secs(), 180);
    assert_eq!(settings.request_timeout().as_secs(), 30);
    assert_eq!(settings.chain().id, DEFAULT_CHAIN_ID);
}
