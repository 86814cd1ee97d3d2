//! Research workflow state definition
//!
//! One [`ResearchState`] is threaded through the three stages of a turn:
//! 1. Planning (query decomposed into three sub-tasks)
//! 2. Execution (one search per sub-task, results accumulated)
//! 3. Synthesis (a report written from everything collected)
//!
//! Stages never mutate the state in place. Each returns a [`ResearchUpdate`]
//! and [`ResearchState::apply_update`] folds it into a new state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed research angle of a sub-task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    /// Core concepts, definitions, principles
    Fundamentals,
    /// Latest developments and recent progress
    Trends,
    /// Real-world use cases and implementations
    Applications,
}

impl Focus {
    /// All focuses in sub-task id order.
    pub const ALL: [Focus; 3] = [Focus::Fundamentals, Focus::Trends, Focus::Applications];

    /// Sub-task id bound to this focus (1..=3).
    pub fn subtask_id(&self) -> u8 {
        match self {
            Focus::Fundamentals => 1,
            Focus::Trends => 2,
            Focus::Applications => 3,
        }
    }

    /// Focus bound to a sub-task id.
    pub fn from_subtask_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Focus::Fundamentals),
            2 => Some(Focus::Trends),
            3 => Some(Focus::Applications),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Fundamentals => "Fundamentals",
            Focus::Trends => "Trends",
            Focus::Applications => "Applications",
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three planned sub-tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: u8,
    pub focus: Focus,
    pub search_query: String,
}

impl SubTask {
    /// Create the sub-task for `focus`; the id follows from the focus.
    pub fn new(focus: Focus, search_query: impl Into<String>) -> Self {
        Self {
            id: focus.subtask_id(),
            focus,
            search_query: search_query.into(),
        }
    }
}

/// A filtered web source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    /// At most 1000 characters of extracted text
    pub content: String,
    pub url: String,
}

/// What one sub-task's search produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentResult {
    pub subtask_id: u8,
    pub focus: Focus,
    pub search_query: String,
    pub sources: Vec<Source>,
    pub source_count: usize,
}

impl SubagentResult {
    pub fn new(subtask: &SubTask, sources: Vec<Source>) -> Self {
        Self {
            subtask_id: subtask.id,
            focus: subtask.focus,
            search_query: subtask.search_query.clone(),
            source_count: sources.len(),
            sources,
        }
    }
}

/// The complete state of one research turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    /// Original user request
    pub query: String,

    /// Planned sub-tasks, three after planning
    pub subtasks: Vec<SubTask>,

    /// Per-sub-task results, append-only
    pub subagent_results: Vec<SubagentResult>,

    /// Every source of every sub-task, in sub-task order then result order
    pub all_sources: Vec<Source>,

    /// Final report, empty until synthesis
    pub synthesis: String,

    /// Always `all_sources.len()`
    pub total_sources: usize,

    /// External calls that degraded during the turn
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ResearchState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Fold an update into a new state.
    ///
    /// Sub-tasks and synthesis are replaced when the update carries them;
    /// results, sources and errors are concatenated in order, without dedup.
    pub fn apply_update(&self, update: ResearchUpdate) -> Self {
        let mut new_state = self.clone();

        if let Some(subtasks) = update.subtasks {
            new_state.subtasks = subtasks;
        }

        new_state.subagent_results.extend(update.subagent_results);
        new_state.all_sources.extend(update.all_sources);

        if let Some(synthesis) = update.synthesis {
            new_state.synthesis = synthesis;
        }

        new_state.errors.extend(update.errors);

        new_state.total_sources = new_state.all_sources.len();

        new_state
    }

    /// Combine branch updates, in the order given, into one update.
    pub fn merge_updates(updates: Vec<ResearchUpdate>) -> ResearchUpdate {
        let mut merged = ResearchUpdate::default();

        for update in updates {
            merged.subagent_results.extend(update.subagent_results);
            merged.all_sources.extend(update.all_sources);
            merged.errors.extend(update.errors);

            // Last replacement wins
            if update.subtasks.is_some() {
                merged.subtasks = update.subtasks;
            }
            if update.synthesis.is_some() {
                merged.synthesis = update.synthesis;
            }
        }

        merged
    }
}

/// Output of one stage (or one sub-task branch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchUpdate {
    /// Replaces the planned sub-tasks
    pub subtasks: Option<Vec<SubTask>>,

    /// Appended to `subagent_results`
    pub subagent_results: Vec<SubagentResult>,

    /// Appended to `all_sources`
    pub all_sources: Vec<Source>,

    /// Replaces the synthesis
    pub synthesis: Option<String>,

    /// Appended to `errors`
    pub errors: Vec<String>,
}

impl ResearchUpdate {
    pub fn with_subtasks(subtasks: Vec<SubTask>) -> Self {
        Self {
            subtasks: Some(subtasks),
            ..Default::default()
        }
    }

    /// A sub-task's result, contributing its sources to the flattened list.
    pub fn with_result(result: SubagentResult) -> Self {
        Self {
            all_sources: result.sources.clone(),
            subagent_results: vec![result],
            ..Default::default()
        }
    }

    pub fn with_synthesis(synthesis: impl Into<String>) -> Self {
        Self {
            synthesis: Some(synthesis.into()),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.subtasks.is_none()
            && self.subagent_results.is_empty()
            && self.all_sources.is_empty()
            && self.synthesis.is_none()
            && self.errors.is_empty()
    }
}
