//! BotConfig: BaseConfig + StreamConfig + GeminiConfig. Use load() for env-based loading.

use anyhow::Result;
use llm_client::GeminiConfig;
use stream_reply::StreamSettings;

use super::{BaseConfig, StreamConfig};

/// Full bot config. Use BotConfig::load() for env-based loading.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub stream: StreamConfig,
    pub gemini: GeminiConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let stream = StreamConfig::from_env()?;
        let gemini = GeminiConfig::from_env()?;
        Ok(Self {
            base,
            stream,
            gemini,
        })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.stream.validate()
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn log_level(&self) -> &str {
        &self.base.log_level
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
    pub fn model(&self) -> &str {
        &self.gemini.model
    }
    pub fn stream_settings(&self) -> StreamSettings {
        self.stream.to_settings()
    }
}
