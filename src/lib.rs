//! # Deep Research
//!
//! A multi-agent research pipeline: a lead agent plans three focused
//! sub-tasks, subagents research them with web search, and the lead agent
//! synthesizes a structured report. An interactive [`session::Session`]
//! drives the pipeline turn by turn.
//!
//! ```text
//! Session ──▶ ResearchPipeline ──▶ Planner ──▶ Executor ──▶ Synthesizer
//!                                     │           │             │
//!                                 LlmClient  SearchClient   LlmClient
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod research;
pub mod search;
pub mod session;

pub use config::{Config, LlmProvider};
pub use error::{LlmError, ResearchError, SearchError};
pub use llm::{GenerationParams, LlmClient, Prompt};
pub use research::{PipelineConfig, ResearchPipeline, ResearchState};
pub use search::{SearchClient, SearchDocument};
pub use session::{Session, SessionEnd};
