//! # LLM client
//!
//! Defines [`Fragment`], [`FragmentStream`] and the [`FragmentSource`] trait consumed by the
//! streaming engine, plus [`GeminiClient`], which talks to Gemini through its OpenAI-compatible
//! endpoint via async-openai.
//!
//! A fragment stream is lazy (nothing is requested until it is first polled), finite and
//! forward-only. Upstream failures never surface as errors: the stream yields one
//! [`Fragment::Error`] and ends.

use futures::stream::BoxStream;

mod config;
mod gemini;

pub use config::GeminiConfig;
pub use gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// One incremental piece of model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Generated text. May be empty; consumers skip empty fragments.
    Text(String),
    /// Terminal marker: the upstream stream failed. Carries the reason for logging only.
    Error(String),
}

impl Fragment {
    pub fn text(s: impl Into<String>) -> Self {
        Fragment::Text(s.into())
    }

    /// True for `Text("")`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Fragment::Text(t) if t.is_empty())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Fragment::Error(_))
    }
}

/// Lazy, consume-once sequence of fragments.
pub type FragmentStream = BoxStream<'static, Fragment>;

/// Opens fragment streams for prompts. Object-safe so handlers can hold `Arc<dyn FragmentSource>`.
pub trait FragmentSource: Send + Sync {
    /// Starts streaming the answer to `prompt` from `model`. The request is sent on first poll.
    fn open(&self, prompt: &str, model: &str) -> FragmentStream;
}

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[len - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
