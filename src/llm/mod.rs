//! # LLM Module
//!
//! A narrow, provider-agnostic contract for text generation.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   Planner / Synthesis stages             │
//! └──────────────────┬───────────────────────┘
//!                    │ generate(prompt, params)
//!                    ▼
//! ┌──────────────────────────────────────────┐
//! │        LlmClient (trait)                 │
//! └──────────────────┬───────────────────────┘
//!          ┌─────────┴──────────┐
//!          ▼                    ▼
//! ┌─────────────────┐  ┌──────────────────────┐
//! │ CerebrasClient  │  │ OllamaClient         │
//! │ (chat/complet.) │  │ (Ollama via rig)     │
//! └─────────────────┘  └──────────────────────┘
//! ```
//!
//! Stages receive the client as an injected `Arc<dyn LlmClient>`, so tests can
//! swap in scripted fakes.

pub mod cerebras;
pub mod ollama;

pub use cerebras::CerebrasClient;
pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// What gets sent to the model: a single string or an ordered conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl Prompt {
    /// Normalize to a message list. A text prompt becomes one user message.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match self {
            Prompt::Text(text) => vec![ChatMessage::user(text.clone())],
            Prompt::Messages(messages) => messages.clone(),
        }
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<Vec<ChatMessage>> for Prompt {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Prompt::Messages(messages)
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u64,
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 600,
            temperature: 0.2,
        }
    }
}

/// Sends a prompt to a text-generation service.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate(&self, prompt: &Prompt, params: &GenerationParams) -> Result<String, LlmError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
