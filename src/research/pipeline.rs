//! The three-stage research turn as a small state machine.
//!
//! ```text
//! Idle ──▶ Planning ──▶ Executing ──▶ Synthesizing ──▶ Idle
//! ```
//!
//! Every transition is unconditional. Each stage reads the current state,
//! returns a [`ResearchUpdate`] and the pipeline folds it in with
//! [`ResearchState::apply_update`].

use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::executor::{ExecutionMode, Executor, DEFAULT_RESULTS_PER_SUBTASK};
use super::planner::Planner;
use super::state::{ResearchState, ResearchUpdate};
use super::synthesis::Synthesizer;
use crate::llm::{GenerationParams, LlmClient};
use crate::search::{SearchClient, MAX_CONTENT_CHARS};

/// Where a research turn is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    /// Waiting for a query
    #[default]
    Idle,
    Planning,
    Executing,
    Synthesizing,
}

impl Stage {
    /// The stage that always follows this one.
    pub fn next(&self) -> Self {
        match self {
            Stage::Idle => Stage::Planning,
            Stage::Planning => Stage::Executing,
            Stage::Executing => Stage::Synthesizing,
            Stage::Synthesizing => Stage::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Planning => "planning",
            Stage::Executing => "executing",
            Stage::Synthesizing => "synthesizing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub params: GenerationParams,
    pub results_per_subtask: usize,
    pub max_chars_per_result: usize,
    pub mode: ExecutionMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            params: GenerationParams::default(),
            results_per_subtask: DEFAULT_RESULTS_PER_SUBTASK,
            max_chars_per_result: MAX_CONTENT_CHARS,
            mode: ExecutionMode::Sequential,
        }
    }
}

/// Planner, executor and synthesizer wired to injected clients.
pub struct ResearchPipeline {
    planner: Planner,
    executor: Executor,
    synthesizer: Synthesizer,
}

impl ResearchPipeline {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchClient>, config: PipelineConfig) -> Self {
        Self {
            planner: Planner::new(llm.clone(), config.params),
            executor: Executor::new(search)
                .with_results_per_subtask(config.results_per_subtask)
                .with_max_chars(config.max_chars_per_result)
                .with_mode(config.mode),
            synthesizer: Synthesizer::new(llm, config.params),
        }
    }

    /// Run one full turn for `query`: plan, execute, synthesize.
    pub async fn run(&self, query: &str) -> ResearchState {
        let mut state = ResearchState::new(query);
        let mut stage = Stage::Idle.next();

        while stage != Stage::Idle {
            info!(stage = %stage, "Entering stage");
            let update = self.step(stage, &state).await;
            state = state.apply_update(update);
            stage = stage.next();
        }

        info!(
            total_sources = state.total_sources,
            errors = state.errors.len(),
            "Research turn complete"
        );

        state
    }

    /// Run a single stage against `state`.
    pub async fn step(&self, stage: Stage, state: &ResearchState) -> ResearchUpdate {
        match stage {
            Stage::Idle => ResearchUpdate::default(),
            Stage::Planning => self.planner.run(state).await,
            Stage::Executing => self.executor.run(state).await,
            Stage::Synthesizing => self.synthesizer.run(state).await,
        }
    }
}
