//! # Configuration Module
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Both API keys are secrets and are required at startup; a missing
//! key is a fatal error, not something a running session recovers from.

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::llm::{cerebras, ollama, GenerationParams};
use crate::research::{ExecutionMode, PipelineConfig};
use crate::search::{exa, MAX_CONTENT_CHARS};
use crate::session::DEFAULT_THREAD_ID;

/// Which text-generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Hosted Cerebras inference (OpenAI-compatible API)
    #[default]
    Cerebras,
    /// Local Ollama server through Rig
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cerebras" => Ok(LlmProvider::Cerebras),
            "ollama" => Ok(LlmProvider::Ollama),
            other => anyhow::bail!("Unknown LLM provider '{}' (expected 'cerebras' or 'ollama')", other),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Cerebras => f.write_str("cerebras"),
            LlmProvider::Ollama => f.write_str("ollama"),
        }
    }
}

/// Main configuration for the research agent.
#[derive(Clone)]
pub struct Config {
    /// Exa API key (EXA_API_KEY)
    pub exa_api_key: String,

    /// Cerebras API key (CEREBRAS_API_KEY); empty when the provider needs none
    pub cerebras_api_key: String,

    pub provider: LlmProvider,

    /// Model identifier for the selected provider
    pub model: String,

    pub cerebras_base_url: String,

    pub exa_base_url: String,

    pub ollama_host: String,

    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f64,

    /// Generation cap per LLM call
    pub max_tokens: u64,

    /// Search results requested per sub-task
    pub results_per_subtask: usize,

    /// Characters of text requested per search result
    pub max_chars_per_result: usize,

    /// Run the three sub-task searches concurrently
    pub concurrent: bool,

    /// Per-request timeout for both external services
    pub request_timeout: Duration,

    /// Conversation thread id for the session
    pub thread_id: String,

    /// Tracing filter directive (RUST_LOG syntax)
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("exa_api_key", &redact(&self.exa_api_key))
            .field("cerebras_api_key", &redact(&self.cerebras_api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("cerebras_base_url", &self.cerebras_base_url)
            .field("exa_base_url", &self.exa_base_url)
            .field("ollama_host", &self.ollama_host)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("results_per_subtask", &self.results_per_subtask)
            .field("max_chars_per_result", &self.max_chars_per_result)
            .field("concurrent", &self.concurrent)
            .field("request_timeout", &self.request_timeout)
            .field("thread_id", &self.thread_id)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exa_api_key: String::new(),
            cerebras_api_key: String::new(),
            provider: LlmProvider::Cerebras,
            model: cerebras::DEFAULT_MODEL.to_string(),
            cerebras_base_url: cerebras::DEFAULT_BASE_URL.to_string(),
            exa_base_url: exa::DEFAULT_BASE_URL.to_string(),
            ollama_host: ollama::DEFAULT_OLLAMA_HOST.to_string(),
            temperature: 0.2,
            max_tokens: 600,
            results_per_subtask: 2,
            max_chars_per_result: MAX_CONTENT_CHARS,
            concurrent: false,
            request_timeout: Duration::from_secs(30),
            thread_id: DEFAULT_THREAD_ID.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment (after reading `.env`).
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_provider(None)
    }

    /// Like [`Config::from_env`], with `provider` taking precedence over
    /// `LLM_PROVIDER`. The provider decides which API key is required.
    pub fn from_env_with_provider(provider: Option<LlmProvider>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(with_provider(|key| env::var(key).ok(), provider))
    }

    /// Build configuration from any key lookup. Unset and blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(val) = get("LLM_PROVIDER") {
            config.provider = val.parse()?;
        }

        config.exa_api_key = get("EXA_API_KEY")
            .context("EXA_API_KEY is not set. Add it to your environment or .env file")?;

        match config.provider {
            LlmProvider::Cerebras => {
                config.cerebras_api_key = get("CEREBRAS_API_KEY").context(
                    "CEREBRAS_API_KEY is not set. Add it to your environment or .env file",
                )?;
            }
            LlmProvider::Ollama => {
                config.model = "llama3.2".to_string();
            }
        }

        if let Some(val) = get("LLM_MODEL") {
            config.model = val;
        }

        if let Some(val) = get("CEREBRAS_BASE_URL") {
            config.cerebras_base_url = val;
        }

        if let Some(val) = get("EXA_BASE_URL") {
            config.exa_base_url = val;
        }

        if let Some(val) = get("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Some(val) = get("TEMPERATURE") {
            config.temperature = val
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.2)")?;
        }

        if let Some(val) = get("MAX_TOKENS") {
            config.max_tokens = val
                .parse()
                .context("MAX_TOKENS must be a valid positive integer")?;
        }

        if let Some(val) = get("RESULTS_PER_SUBTASK") {
            config.results_per_subtask = val
                .parse()
                .context("RESULTS_PER_SUBTASK must be a valid positive integer")?;
        }

        if let Some(val) = get("MAX_CHARS_PER_RESULT") {
            config.max_chars_per_result = val
                .parse()
                .context("MAX_CHARS_PER_RESULT must be a valid positive integer")?;
        }

        if let Some(val) = get("RESEARCH_CONCURRENT") {
            config.concurrent = parse_flag(&val)
                .with_context(|| format!("RESEARCH_CONCURRENT must be true or false, got '{}'", val))?;
        }

        if let Some(val) = get("REQUEST_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid positive integer")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(val) = get("THREAD_ID") {
            config.thread_id = val;
        }

        if let Some(val) = get("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// Validate value ranges before anything is started.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        if self.max_tokens == 0 {
            anyhow::bail!("MAX_TOKENS must be at least 1");
        }

        if self.results_per_subtask == 0 {
            anyhow::bail!("RESULTS_PER_SUBTASK must be at least 1");
        }

        if self.max_chars_per_result == 0 {
            anyhow::bail!("MAX_CHARS_PER_RESULT must be at least 1");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be at least 1");
        }

        if self.model.trim().is_empty() {
            anyhow::bail!("LLM_MODEL cannot be empty");
        }

        if self.thread_id.trim().is_empty() {
            anyhow::bail!("THREAD_ID cannot be empty");
        }

        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            params: self.generation_params(),
            results_per_subtask: self.results_per_subtask,
            max_chars_per_result: self.max_chars_per_result,
            mode: if self.concurrent {
                ExecutionMode::Concurrent
            } else {
                ExecutionMode::Sequential
            },
        }
    }
}

/// Wrap `lookup` so `LLM_PROVIDER` resolves to `provider` when one is given.
fn with_provider<F>(lookup: F, provider: Option<LlmProvider>) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| match provider {
        Some(provider) if key == "LLM_PROVIDER" => Some(provider.to_string()),
        _ => lookup(key),
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const KEYS: [(&str, &str); 2] = [("EXA_API_KEY", "exa"), ("CEREBRAS_API_KEY", "cb")];

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.provider, LlmProvider::Cerebras);
        assert_eq!(config.model, "llama-4-scout-17b-16e-instruct");
        assert!((config.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, 600);
        assert_eq!(config.results_per_subtask, 2);
        assert_eq!(config.max_chars_per_result, 1000);
        assert_eq!(config.thread_id, "research_session");
        assert!(!config.concurrent);
    }

    #[test]
    fn test_from_lookup_with_keys() {
        let config = Config::from_lookup(lookup(&KEYS)).unwrap();
        assert_eq!(config.exa_api_key, "exa");
        assert_eq!(config.cerebras_api_key, "cb");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_search_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[("CEREBRAS_API_KEY", "cb")])).unwrap_err();
        assert!(err.to_string().contains("EXA_API_KEY"));
    }

    #[test]
    fn test_missing_llm_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[("EXA_API_KEY", "exa")])).unwrap_err();
        assert!(err.to_string().contains("CEREBRAS_API_KEY"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let result = Config::from_lookup(lookup(&[("EXA_API_KEY", "  "), ("CEREBRAS_API_KEY", "cb")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_ollama_provider_needs_no_llm_key() {
        let config = Config::from_lookup(lookup(&[
            ("EXA_API_KEY", "exa"),
            ("LLM_PROVIDER", "Ollama"),
        ]))
        .unwrap();
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.model, "llama3.2");
    }

    #[test]
    fn test_provider_override_wins_over_environment() {
        let env = lookup(&[("EXA_API_KEY", "exa"), ("LLM_PROVIDER", "cerebras")]);
        let config = Config::from_lookup(with_provider(env, Some(LlmProvider::Ollama))).unwrap();

        assert_eq!(config.provider, LlmProvider::Ollama);
        assert!(config.cerebras_api_key.is_empty());
    }

    #[test]
    fn test_no_provider_override_reads_environment() {
        let env = lookup(&[("EXA_API_KEY", "exa"), ("LLM_PROVIDER", "ollama")]);
        let config = Config::from_lookup(with_provider(env, None)).unwrap();
        assert_eq!(config.provider, LlmProvider::Ollama);
    }

    #[test]
    fn test_log_level_from_rust_log() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("RUST_LOG", "deep_research=trace"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.log_level, "deep_research=trace");
        assert_eq!(Config::default().log_level, "info");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Config::from_lookup(lookup(&[("EXA_API_KEY", "exa"), ("LLM_PROVIDER", "gpt")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("LLM_MODEL", "llama3.1-8b"),
            ("TEMPERATURE", "0.5"),
            ("MAX_TOKENS", "1200"),
            ("RESULTS_PER_SUBTASK", "3"),
            ("RESEARCH_CONCURRENT", "true"),
            ("REQUEST_TIMEOUT_SECS", "10"),
            ("THREAD_ID", "abc"),
        ]);

        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.model, "llama3.1-8b");
        assert!((config.temperature - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, 1200);
        assert_eq!(config.results_per_subtask, 3);
        assert!(config.concurrent);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.thread_id, "abc");

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.mode, ExecutionMode::Concurrent);
        assert_eq!(pipeline.params.max_tokens, 1200);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("TEMPERATURE", "warm"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = KEYS.to_vec();
        pairs.push(("RESEARCH_CONCURRENT", "maybe"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_config_validation_invalid_temperature() {
        let mut config = Config::default();
        config.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_counts() {
        let mut config = Config::default();
        config.results_per_subtask = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config::from_lookup(lookup(&KEYS)).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"exa\""));
        assert!(!debug.contains("\"cb\""));
    }
}
