//! Planning stage: decompose a query into exactly three sub-tasks.
//!
//! The model is asked for three lines of the form `SUBTASK <n>: <query>`.
//! Focuses are bound to the line number, never chosen by the model. When the
//! response does not yield all three ids the planner falls back to templated
//! search queries, so planning always succeeds.

use std::sync::Arc;
use tracing::{info, warn};

use super::prompts::{planning_prompt, FALLBACK_SUFFIXES};
use super::state::{Focus, ResearchState, ResearchUpdate, SubTask};
use crate::llm::{GenerationParams, LlmClient, Prompt};

/// Lead agent planning.
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, params: GenerationParams) -> Self {
        Self { llm, params }
    }

    /// Three sub-tasks for `query`, in id order.
    pub async fn plan(&self, query: &str) -> Vec<SubTask> {
        self.plan_with_errors(query).await.0
    }

    /// Stage entry point: plan the state's query.
    pub async fn run(&self, state: &ResearchState) -> ResearchUpdate {
        let (subtasks, error) = self.plan_with_errors(&state.query).await;

        let mut update = ResearchUpdate::with_subtasks(subtasks);
        if let Some(error) = error {
            update = update.with_error(error);
        }
        update
    }

    async fn plan_with_errors(&self, query: &str) -> (Vec<SubTask>, Option<String>) {
        let prompt = Prompt::Text(planning_prompt(query));

        // A failed call is planned like an empty answer: straight to the fallback.
        let (response, error) = match self.llm.generate(&prompt, &self.params).await {
            Ok(text) => (text, None),
            Err(e) => {
                warn!(provider = self.llm.name(), error = %e, "Planning call failed");
                (String::new(), Some(format!("AI error during planning: {}", e)))
            }
        };

        let subtasks = match parse_subtasks(&response) {
            Some(subtasks) => subtasks,
            None => {
                warn!("Parsing failed, using default subtasks");
                fallback_subtasks(query)
            }
        };

        info!(
            subtasks = ?subtasks
                .iter()
                .map(|s| format!("{}. {}: {}", s.id, s.focus, s.search_query))
                .collect::<Vec<_>>(),
            "Subtasks created"
        );

        (subtasks, error)
    }
}

/// Extract sub-tasks from the model's response.
///
/// A line (after trimming) matches sub-task `n` iff it starts with the literal,
/// case-sensitive prefix `SUBTASK n:`; the search query is the trimmed rest of
/// the line. The first line for each `n` wins. Returns `None` unless all three
/// ids were found.
pub fn parse_subtasks(response: &str) -> Option<Vec<SubTask>> {
    let mut found: [Option<SubTask>; 3] = [None, None, None];

    for line in response.lines().map(str::trim) {
        for focus in Focus::ALL {
            let prefix = format!("SUBTASK {}:", focus.subtask_id());
            if let Some(rest) = line.strip_prefix(prefix.as_str()) {
                let slot = &mut found[usize::from(focus.subtask_id() - 1)];
                if slot.is_none() {
                    *slot = Some(SubTask::new(focus, rest.trim()));
                }
                break;
            }
        }
    }

    let subtasks: Vec<SubTask> = found.into_iter().flatten().collect();
    (subtasks.len() == 3).then_some(subtasks)
}

/// Deterministic sub-tasks built from the query and fixed suffixes.
pub fn fallback_subtasks(query: &str) -> Vec<SubTask> {
    FALLBACK_SUFFIXES
        .iter()
        .map(|(focus, suffix)| SubTask::new(*focus, format!("{} {}", query, suffix)))
        .collect()
}
