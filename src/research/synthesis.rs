//! Synthesis stage: a report from everything the subagents collected.

use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, warn};

use super::prompts::{synthesis_prompt, NO_SOURCES_MESSAGE};
use super::state::{ResearchState, ResearchUpdate, Source, SubagentResult};
use crate::llm::{GenerationParams, LlmClient, Prompt};
use crate::search::filter::truncate_chars;

/// Characters of each source embedded in the synthesis context.
pub const CONTEXT_EXCERPT_CHARS: usize = 400;

/// Lead agent synthesis.
pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, params: GenerationParams) -> Self {
        Self { llm, params }
    }

    /// Write the final report.
    ///
    /// Returns [`NO_SOURCES_MESSAGE`] without calling the model when nothing was
    /// found. A failed call yields an empty string.
    pub async fn synthesize(
        &self,
        query: &str,
        results: &[SubagentResult],
        all_sources: &[Source],
    ) -> String {
        self.synthesize_with_errors(query, results, all_sources).await.0
    }

    /// Stage entry point.
    pub async fn run(&self, state: &ResearchState) -> ResearchUpdate {
        let (synthesis, error) = self
            .synthesize_with_errors(&state.query, &state.subagent_results, &state.all_sources)
            .await;

        let update = ResearchUpdate::with_synthesis(synthesis);
        match error {
            Some(error) => update.with_error(error),
            None => update,
        }
    }

    async fn synthesize_with_errors(
        &self,
        query: &str,
        results: &[SubagentResult],
        all_sources: &[Source],
    ) -> (String, Option<String>) {
        info!(sources = all_sources.len(), "Synthesizing sources");

        if all_sources.is_empty() {
            return (NO_SOURCES_MESSAGE.to_string(), None);
        }

        let context = build_context(query, results);
        let prompt = Prompt::Text(synthesis_prompt(&context, all_sources.len()));

        match self.llm.generate(&prompt, &self.params).await {
            Ok(text) => (text, None),
            Err(e) => {
                warn!(provider = self.llm.name(), error = %e, "Synthesis call failed");
                (String::new(), Some(format!("AI error during synthesis: {}", e)))
            }
        }
    }
}

/// Render the query and every subagent's findings as prompt context.
pub fn build_context(query: &str, results: &[SubagentResult]) -> String {
    let mut context = format!("RESEARCH QUERY: {}\n\n", query);
    context.push_str("FINDINGS FROM SPECIALIZED AGENTS:\n\n");

    for result in results {
        // Writing to a String cannot fail.
        let _ = writeln!(
            context,
            "--- {} Agent (Subtask {}) ---",
            result.focus, result.subtask_id
        );
        let _ = writeln!(context, "Search: {}", result.search_query);
        let _ = writeln!(context, "Sources: {}\n", result.source_count);

        for (i, source) in result.sources.iter().enumerate() {
            let _ = writeln!(context, "  {}. {}", i + 1, source.title);
            let _ = writeln!(
                context,
                "     {}...\n",
                truncate_chars(&source.content, CONTEXT_EXCERPT_CHARS)
            );
        }
    }

    context
}
