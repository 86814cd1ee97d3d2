//! Cerebras chat completions client.
//!
//! Cerebras exposes an OpenAI-compatible `/chat/completions` endpoint, so this
//! client works against any compatible server by changing the base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{ChatMessage, GenerationParams, LlmClient, Prompt};
use crate::error::LlmError;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "llama-4-scout-17b-16e-instruct";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Chat completions client for Cerebras (or any OpenAI-compatible endpoint).
pub struct CerebrasClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl CerebrasClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point the client at a different server (trailing slashes are ignored).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u64,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl LlmClient for CerebrasClient {
    async fn generate(&self, prompt: &Prompt, params: &GenerationParams) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: prompt.to_messages(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            max_tokens = params.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn name(&self) -> &str {
        "cerebras"
    }
}
