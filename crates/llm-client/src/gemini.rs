//! Gemini client over the OpenAI-compatible chat completions endpoint.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionResponseStream,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::{mask_token, Fragment, FragmentSource, FragmentStream};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Streaming Gemini client. Cheap to clone; the HTTP client is shared.
#[derive(Clone)]
pub struct GeminiClient {
    client: Arc<Client<OpenAIConfig>>,
    system_prompt: Option<String>,
    show_time_in_prompt: bool,
    api_key_for_logging: String,
}

enum StreamState {
    Connect {
        client: Arc<Client<OpenAIConfig>>,
        request: CreateChatCompletionRequest,
    },
    Receiving(ChatCompletionResponseStream),
    Finished,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.base_url.trim_end_matches('/'));
        Self {
            client: Arc::new(Client::with_config(openai_config)),
            system_prompt: config.system_prompt.clone(),
            show_time_in_prompt: config.show_time_in_prompt,
            api_key_for_logging: config.api_key.clone(),
        }
    }

    /// Builds the streaming request for one prompt. `now` only matters when the current time is
    /// shown to the model.
    pub fn build_request(
        &self,
        prompt: &str,
        model: &str,
        now: DateTime<Local>,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if let Some(system) = self.system_text(now) {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        );

        CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .stream(true)
            .build()
    }

    fn system_text(&self, now: DateTime<Local>) -> Option<String> {
        let time_line = self
            .show_time_in_prompt
            .then(|| format!("Current time: {}", now.format("%Y-%m-%d %H:%M:%S %:z")));
        match (self.system_prompt.as_deref(), time_line) {
            (Some(p), Some(t)) => Some(format!("{p}\n\n{t}")),
            (Some(p), None) => Some(p.to_string()),
            (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }
}

impl FragmentSource for GeminiClient {
    fn open(&self, prompt: &str, model: &str) -> FragmentStream {
        info!(
            model = %model,
            prompt_len = prompt.chars().count(),
            api_key = %mask_token(&self.api_key_for_logging),
            "Opening Gemini stream"
        );

        let request = match self.build_request(prompt, model, Local::now()) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to build Gemini request");
                return stream::once(async move { Fragment::Error(e.to_string()) }).boxed();
            }
        };
        if let Ok(json) = serde_json::to_string(&request) {
            debug!(request_json = %json, "Gemini request JSON");
        }

        let initial = StreamState::Connect {
            client: Arc::clone(&self.client),
            request,
        };

        stream::unfold(initial, |mut state| async move {
            loop {
                match state {
                    StreamState::Connect { client, request } => {
                        match client.chat().create_stream(request).await {
                            Ok(upstream) => state = StreamState::Receiving(upstream),
                            Err(e) => {
                                warn!(error = %e, "Gemini stream failed to start");
                                return Some((Fragment::Error(e.to_string()), StreamState::Finished));
                            }
                        }
                    }
                    StreamState::Receiving(mut upstream) => match upstream.next().await {
                        Some(Ok(chunk)) => {
                            let text = chunk
                                .choices
                                .first()
                                .and_then(|c| c.delta.content.clone())
                                .unwrap_or_default();
                            if text.is_empty() {
                                state = StreamState::Receiving(upstream);
                                continue;
                            }
                            return Some((Fragment::Text(text), StreamState::Receiving(upstream)));
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Gemini stream error");
                            return Some((Fragment::Error(e.to_string()), StreamState::Finished));
                        }
                        None => {
                            debug!("Gemini stream finished");
                            return None;
                        }
                    },
                    StreamState::Finished => return None,
                }
            }
        })
        .boxed()
    }
}
