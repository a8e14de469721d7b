//! Gemini configuration loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Model access settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system_prompt: Option<String>,
    /// Tell the model the current time in the system message.
    pub show_time_in_prompt: bool,
}

impl GeminiConfig {
    /// Load from environment variables: GEMINI_API_KEY is required; GEMINI_BASE_URL, GEMINI_MODEL,
    /// GEMINI_SYSTEM_PROMPT and SHOW_TIME_IN_PROMPT are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("GEMINI_API_KEY not set; AI functions are unavailable without it")?;
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("GEMINI_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let system_prompt = env::var("GEMINI_SYSTEM_PROMPT")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let show_time_in_prompt = match env::var("SHOW_TIME_IN_PROMPT") {
            Ok(raw) => parse_flag(&raw)
                .with_context(|| format!("SHOW_TIME_IN_PROMPT must be true or false, got {raw:?}"))?,
            Err(_) => false,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            system_prompt,
            show_time_in_prompt,
        })
    }

    /// Builds a config with the given key and defaults for everything else.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            show_time_in_prompt: false,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
