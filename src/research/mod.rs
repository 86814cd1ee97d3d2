//! Research Workflow Module
//!
//! A lead agent plans, three subagents search, the lead agent synthesizes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Planning     query ──▶ SUBTASK 1..3 (or fallback)        │
//! │                          ▼                                │
//! │  Executing    search + filter per sub-task, id order      │
//! │                          ▼                                │
//! │  Synthesizing context (≤400 chars/source) ──▶ report      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - `state` - State, update and reducer types
//! - `prompts` - Planning and synthesis prompt templates
//! - `planner`, `executor`, `synthesis` - The three stages
//! - `pipeline` - Stage state machine driving one turn

pub mod executor;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod state;
pub mod synthesis;

pub use executor::{ExecutionMode, Executor};
pub use pipeline::{PipelineConfig, ResearchPipeline, Stage};
pub use planner::{fallback_subtasks, parse_subtasks, Planner};
pub use prompts::NO_SOURCES_MESSAGE;
pub use state::{Focus, ResearchState, ResearchUpdate, Source, SubTask, SubagentResult};
pub use synthesis::{build_context, Synthesizer};
