//! Bot configuration: BaseConfig (Telegram + log + DB) + StreamConfig (reply pacing) + GeminiConfig.

mod base;
mod bot_config;
mod stream;

#[cfg(test)]
mod tests;

pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use stream::StreamConfig;

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Reads `key` and parses it; `default` when unset or blank.
pub(crate) fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
