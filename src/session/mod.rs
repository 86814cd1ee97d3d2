//! # Session Module
//!
//! The interactive read-eval loop. One session holds one conversation thread;
//! every non-empty line that is not an exit command is a research query and
//! runs through the full pipeline.
//!
//! A turn runs on its own task, so a turn that blows up is reported and the
//! loop simply waits for the next query.

pub mod memory;

pub use memory::{Checkpoint, MemoryCheckpointer};

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::error::ResearchError;
use crate::research::{ResearchPipeline, ResearchState};

/// Thread id used when none is configured.
pub const DEFAULT_THREAD_ID: &str = "research_session";

/// Inputs that end the session (compared case-insensitively).
pub const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];

const SEPARATOR_WIDTH: usize = 60;

/// Why a session loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed an exit command
    Exit,
    /// The interrupt signal fired
    Interrupted,
    /// Input was closed
    EndOfInput,
}

/// An interactive research conversation.
pub struct Session {
    pipeline: Arc<ResearchPipeline>,
    thread_id: String,
    memory: MemoryCheckpointer,
}

impl Session {
    pub fn new(pipeline: Arc<ResearchPipeline>, thread_id: impl Into<String>) -> Self {
        Self {
            pipeline,
            thread_id: thread_id.into(),
            memory: MemoryCheckpointer::new(),
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn memory(&self) -> &MemoryCheckpointer {
        &self.memory
    }

    /// Completed turns in this session's thread.
    pub async fn turns(&self) -> usize {
        self.memory.turns(&self.thread_id).await
    }

    /// Read queries from `input` until an exit command, end of input, or
    /// `interrupt` completes.
    ///
    /// Only I/O errors on `output` or `input` end the loop with an error; a failed
    /// turn is reported and the loop continues.
    pub async fn run<R, W, I>(
        &self,
        input: R,
        output: &mut W,
        interrupt: I,
    ) -> Result<SessionEnd, ResearchError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut lines = input.lines();

        self.print_banner(output)?;
        info!(thread_id = %self.thread_id, "Session started");

        loop {
            write!(output, "\nYou: ")?;
            output.flush()?;

            let line = tokio::select! {
                _ = &mut interrupt => return self.interrupted(output),
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                writeln!(output, "\nGoodbye!")?;
                info!(thread_id = %self.thread_id, "Input closed, session ending");
                return Ok(SessionEnd::EndOfInput);
            };

            let query = line.trim();

            if is_exit_command(query) {
                writeln!(output, "\nGoodbye! Thanks for using Deep Research Agent.")?;
                info!(thread_id = %self.thread_id, "Session ended by user");
                return Ok(SessionEnd::Exit);
            }

            if query.is_empty() {
                writeln!(output, "Please enter a valid query.")?;
                continue;
            }

            let pipeline = Arc::clone(&self.pipeline);
            let owned_query = query.to_string();
            let turn = tokio::spawn(async move { pipeline.run(&owned_query).await });
            let abort = turn.abort_handle();

            let outcome = tokio::select! {
                _ = &mut interrupt => {
                    abort.abort();
                    return self.interrupted(output);
                }
                outcome = turn => outcome,
            };

            match outcome {
                Ok(state) => {
                    print_report(output, &state)?;
                    let turn = self.memory.save(&self.thread_id, state).await;
                    info!(thread_id = %self.thread_id, turn, "Turn saved");
                }
                Err(e) => {
                    let err = ResearchError::TurnFailed(describe_join_error(e));
                    error!(error = %err, "Research turn failed");
                    writeln!(output, "\n❌ Error: {}", err)?;
                    writeln!(output, "Please try again.")?;
                }
            }
        }
    }

    fn print_banner<W: Write>(&self, output: &mut W) -> Result<(), ResearchError> {
        writeln!(output, "INTERACTIVE DEEP RESEARCH CHATBOT")?;
        writeln!(output, "\nCommands:")?;
        writeln!(output, "  - Type your research question to start")?;
        writeln!(output, "  - Type 'exit' or 'quit' to exit")?;
        writeln!(output, "  - Press Ctrl+C to force exit")?;
        writeln!(output, "\nThread: {}", self.thread_id)?;
        Ok(())
    }

    fn interrupted<W: Write>(&self, output: &mut W) -> Result<SessionEnd, ResearchError> {
        writeln!(output, "\n\nInterrupted. Goodbye!")?;
        output.flush()?;
        warn!(thread_id = %self.thread_id, "Session interrupted");
        Ok(SessionEnd::Interrupted)
    }
}

/// True for `exit`, `quit` and `q` in any case.
pub fn is_exit_command(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&lowered.as_str())
}

fn print_report<W: Write>(output: &mut W, state: &ResearchState) -> Result<(), ResearchError> {
    for err in &state.errors {
        writeln!(output, "  ✗ {}", err)?;
    }

    let separator = "=".repeat(SEPARATOR_WIDTH);
    writeln!(output, "\n{}", separator)?;
    writeln!(output, "✅ RESEARCH COMPLETE")?;
    writeln!(output, "{}", separator)?;
    writeln!(output, "\nQuery: {}", state.query)?;
    writeln!(output, "Total Sources: {}", state.total_sources)?;

    writeln!(output, "\nSubtasks:")?;
    for subtask in &state.subtasks {
        writeln!(output, "  {}. {}: {}", subtask.id, subtask.focus, subtask.search_query)?;
    }

    writeln!(output, "\n{}", state.synthesis)?;
    writeln!(output, "\n{}", separator)?;
    Ok(())
}

fn describe_join_error(e: JoinError) -> String {
    if e.is_cancelled() {
        return "turn was cancelled".to_string();
    }

    let payload = e.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "turn panicked".to_string()
    }
}
