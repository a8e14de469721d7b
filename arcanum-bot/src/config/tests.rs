//! Config tests.

use crate::config::BotConfig;
use serial_test::serial;
use std::env;
use std::time::Duration;

const KEYS: [&str; 14] = [
    "BOT_TOKEN",
    "TELEGRAM_API_URL",
    "TELOXIDE_API_URL",
    "GEMINI_API_KEY",
    "GEMINI_BASE_URL",
    "GEMINI_MODEL",
    "GEMINI_SYSTEM_PROMPT",
    "SHOW_TIME_IN_PROMPT",
    "LOG_LEVEL",
    "LOG_FILE",
    "DATABASE_URL",
    "STREAM_SAFE_LIMIT",
    "STREAM_EDIT_INTERVAL_MS",
    "LOADING_INTERVAL_MS",
];

fn reset_env() {
    for key in KEYS {
        env::remove_var(key);
    }
    env::set_var("BOT_TOKEN", "test_token");
    env::set_var("GEMINI_API_KEY", "test_key");
}

#[test]
#[serial]
fn test_load_config_with_defaults() {
    reset_env();

    let config = BotConfig::load(None).unwrap();
    config.validate().unwrap();

    assert_eq!(config.bot_token(), "test_token");
    assert!(config.telegram_api_url().is_none());
    assert_eq!(config.database_url(), "./arcanum.db");
    assert_eq!(config.log_file(), "logs/arcanum.log");
    assert_eq!(config.log_level(), "info");
    assert_eq!(config.model(), "gemini-2.5-flash");

    let settings = config.stream_settings();
    assert_eq!(settings.safe_limit, 4000);
    assert_eq!(settings.edit_interval, Duration::from_millis(800));
    assert_eq!(settings.loading_interval, Duration::from_millis(700));
}

#[test]
#[serial]
fn test_load_config_with_custom_values() {
    reset_env();
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("TELOXIDE_API_URL", "http://localhost:8081");
    env::set_var("LOG_LEVEL", "DEBUG");
    env::set_var("GEMINI_MODEL", "gemini-2.5-pro");
    env::set_var("STREAM_SAFE_LIMIT", "3500");
    env::set_var("STREAM_EDIT_INTERVAL_MS", "1200");

    let config = BotConfig::load(None).unwrap();
    config.validate().unwrap();

    assert_eq!(config.database_url(), "sqlite::memory:");
    assert_eq!(config.telegram_api_url(), Some("http://localhost:8081"));
    assert_eq!(config.log_level(), "debug");
    assert_eq!(config.model(), "gemini-2.5-pro");
    assert_eq!(config.stream_settings().safe_limit, 3500);
    assert_eq!(
        config.stream_settings().edit_interval,
        Duration::from_millis(1200)
    );

    reset_env();
}

#[test]
#[serial]
fn test_token_argument_overrides_env() {
    reset_env();

    let config = BotConfig::load(Some("cli_token".to_string())).unwrap();
    assert_eq!(config.bot_token(), "cli_token");
}

#[test]
#[serial]
fn test_missing_token_fails() {
    reset_env();
    env::remove_var("BOT_TOKEN");

    assert!(BotConfig::load(None).is_err());

    reset_env();
}

#[test]
#[serial]
fn test_missing_gemini_key_fails() {
    reset_env();
    env::remove_var("GEMINI_API_KEY");

    assert!(BotConfig::load(None).is_err());

    reset_env();
}

#[test]
#[serial]
fn test_validate_invalid_telegram_api_url() {
    reset_env();
    env::set_var("TELEGRAM_API_URL", "not a url");

    let config = BotConfig::load(None).unwrap();
    assert!(config.validate().is_err());

    reset_env();
}

#[test]
#[serial]
fn test_validate_safe_limit_range() {
    reset_env();
    env::set_var("STREAM_SAFE_LIMIT", "5000");
    assert!(BotConfig::load(None).unwrap().validate().is_err());

    env::set_var("STREAM_SAFE_LIMIT", "0");
    assert!(BotConfig::load(None).unwrap().validate().is_err());

    env::set_var("STREAM_SAFE_LIMIT", "4096");
    assert!(BotConfig::load(None).unwrap().validate().is_ok());

    reset_env();
}

#[test]
#[serial]
fn test_unparsable_number_fails_load() {
    reset_env();
    env::set_var("LOADING_INTERVAL_MS", "fast");

    assert!(BotConfig::load(None).is_err());

    reset_env();
}

#[test]
#[serial]
fn test_validate_unknown_log_level() {
    reset_env();
    env::set_var("LOG_LEVEL", "verbose");

    assert!(BotConfig::load(None).unwrap().validate().is_err());

    reset_env();
}
