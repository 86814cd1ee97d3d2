//! Shared fakes for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use deep_research::error::{LlmError, SearchError};
use deep_research::llm::{GenerationParams, LlmClient, Prompt};
use deep_research::search::{SearchClient, SearchDocument};

pub const PLAN_RESPONSE: &str =
    "SUBTASK 1: rust ownership basics\nSUBTASK 2: rust 2025 roadmap\nSUBTASK 3: rust in production";

pub const REPORT: &str = "EXECUTIVE SUMMARY: Rust is doing well.";

/// How the scripted model behaves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LlmBehavior {
    Answer,
    Fail,
    /// Panics when the query text contains "boom"
    PanicOnBoom,
    /// Never answers
    Hang,
}

/// Answers planning prompts with `plan` and synthesis prompts with [`REPORT`].
pub struct ScriptedLlm {
    plan: String,
    behavior: LlmBehavior,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(plan: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            behavior: LlmBehavior::Answer,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_behavior(mut self, behavior: LlmBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, prompt: &Prompt, _params: &GenerationParams) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = prompt
            .to_messages()
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(text.clone());

        match self.behavior {
            LlmBehavior::Fail => Err(LlmError::RateLimited),
            LlmBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::Timeout)
            }
            LlmBehavior::PanicOnBoom if text.contains("boom") => panic!("model exploded"),
            _ if text.contains("Break down this query") => Ok(self.plan.clone()),
            _ => Ok(REPORT.to_string()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Returns the same documents for every query and records the queries.
pub struct FakeSearch {
    documents: Vec<SearchDocument>,
    fail_when_contains: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new(documents: Vec<SearchDocument>) -> Self {
        Self {
            documents,
            fail_when_contains: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail every query containing `needle`.
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_when_contains = Some(needle.into());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchClient for FakeSearch {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
        _max_chars: usize,
    ) -> Result<Vec<SearchDocument>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(needle) = &self.fail_when_contains {
            if query.contains(needle.as_str()) {
                return Err(SearchError::Timeout);
            }
        }

        Ok(self.documents.iter().take(num_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// A document whose text is `chars` characters long.
pub fn document(title: &str, chars: usize) -> SearchDocument {
    SearchDocument::new(title, format!("https://example.com/{}", title), "x".repeat(chars))
}
