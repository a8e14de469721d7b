//! Streaming reply tuning: size bound, edit pacing, indicator speed.

use std::time::Duration;

use anyhow::Result;
use stream_reply::{StreamSettings, TELEGRAM_MESSAGE_LIMIT};

use super::env_parse;

#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// STREAM_SAFE_LIMIT: max chars per outbound message
    pub safe_limit: usize,
    /// STREAM_EDIT_INTERVAL_MS
    pub edit_interval_ms: u64,
    /// LOADING_INTERVAL_MS
    pub loading_interval_ms: u64,
}

impl StreamConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            safe_limit: env_parse("STREAM_SAFE_LIMIT", 4000)?,
            edit_interval_ms: env_parse("STREAM_EDIT_INTERVAL_MS", 800)?,
            loading_interval_ms: env_parse("LOADING_INTERVAL_MS", 700)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=TELEGRAM_MESSAGE_LIMIT).contains(&self.safe_limit) {
            anyhow::bail!(
                "STREAM_SAFE_LIMIT must be between 1 and {}, got {}",
                TELEGRAM_MESSAGE_LIMIT,
                self.safe_limit
            );
        }
        if self.loading_interval_ms == 0 {
            anyhow::bail!("LOADING_INTERVAL_MS must be greater than 0");
        }
        Ok(())
    }

    /// Reconciler settings with these values and default texts.
    pub fn to_settings(&self) -> StreamSettings {
        StreamSettings {
            safe_limit: self.safe_limit,
            edit_interval: Duration::from_millis(self.edit_interval_ms),
            loading_interval: Duration::from_millis(self.loading_interval_ms),
            ..StreamSettings::default()
        }
    }
}
