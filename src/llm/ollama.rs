//! Local Ollama provider backed by the Rig framework.
//!
//! Rig agents carry their preamble and sampling settings, so an agent is built
//! per call from the prompt's system messages and the requested parameters.
//! The rest of the conversation is sent through `Chat::chat`: the final user
//! message is the prompt, everything before it is history.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::{Chat, Message};
use rig::providers::ollama;
use tracing::debug;

use super::{ChatMessage, GenerationParams, LlmClient, Prompt, Role};
use crate::error::LlmError;

/// Default Ollama server URL
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Text generation through a local Ollama server.
pub struct OllamaClient {
    client: ollama::Client,
    model: String,
}

impl OllamaClient {
    /// Connect to the Ollama server at `host`.
    ///
    /// Rig reads the server URL from `OLLAMA_API_BASE_URL`, so the host is
    /// exported before the client is created.
    pub fn new(host: &str, model: impl Into<String>) -> Self {
        std::env::set_var("OLLAMA_API_BASE_URL", host);
        let client = ollama::Client::from_env();

        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// A message list rearranged into what a Rig chat call takes.
#[derive(Debug, Default, PartialEq)]
struct Conversation {
    /// All system messages, joined
    preamble: Option<String>,
    /// Non-system messages other than the prompt, in order
    history: Vec<ChatMessage>,
    /// The last user message
    prompt: String,
}

impl Conversation {
    fn from_messages(messages: &[ChatMessage]) -> Self {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let preamble = if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        };

        let last_user = messages.iter().rposition(|m| m.role == Role::User);

        let history = messages
            .iter()
            .enumerate()
            .filter(|(i, m)| m.role != Role::System && Some(*i) != last_user)
            .map(|(_, m)| m.clone())
            .collect();

        let prompt = last_user
            .map(|i| messages[i].content.clone())
            .unwrap_or_default();

        Self {
            preamble,
            history,
            prompt,
        }
    }

    fn rig_history(&self) -> Vec<Message> {
        self.history
            .iter()
            .map(|m| match m.role {
                Role::Assistant => Message::assistant(m.content.clone()),
                _ => Message::user(m.content.clone()),
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &Prompt, params: &GenerationParams) -> Result<String, LlmError> {
        let conversation = Conversation::from_messages(&prompt.to_messages());

        let mut builder = self
            .client
            .agent(&self.model)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens);

        if let Some(preamble) = &conversation.preamble {
            builder = builder.preamble(preamble);
        }

        let agent = builder.build();

        debug!(
            model = %self.model,
            history = conversation.history.len(),
            "Prompting Ollama agent"
        );

        agent
            .chat(conversation.prompt.as_str(), conversation.rig_history())
            .await
            .map_err(|e| LlmError::Provider(format!("Ollama completion failed: {}", e)))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
