//! Base config: Telegram Bot connection, logging, database. Loaded from env.

use anyhow::{Context, Result};
use std::env;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Base config: Telegram-related, logging, database only.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_LEVEL; used when RUST_LOG is not set
    pub log_level: String,
    /// Log file path
    pub log_file: String,
    /// SQLite database URL or file path
    pub database_url: String,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = token
            .or_else(|| env::var("BOT_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
            .context("BOT_TOKEN not set (pass --token or set it in .env)")?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "./arcanum.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/arcanum.log".to_string());
        let log_level = env::var("LOG_LEVEL")
            .map(|l| l.trim().to_ascii_lowercase())
            .unwrap_or_else(|_| "info".to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_level,
            log_file,
            database_url,
        })
    }

    /// Validate config (telegram_api_url must be a valid URL if set, log level must be known).
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            anyhow::bail!(
                "LOG_LEVEL must be one of {}, got {:?}",
                LOG_LEVELS.join("/"),
                self.log_level
            );
        }
        Ok(())
    }
}
