//! # Deep Research Agent
//!
//! Interactive command-line research assistant. Each question is broken into
//! three focused sub-tasks, researched with Exa web search, and synthesized
//! into a structured report by an LLM (Cerebras or a local Ollama server).
//!
//! ## Quick Start
//! ```bash
//! export EXA_API_KEY=...
//! export CEREBRAS_API_KEY=...
//! cargo run
//! ```

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use deep_research::config::{Config, LlmProvider};
use deep_research::llm::{CerebrasClient, LlmClient, OllamaClient};
use deep_research::research::ResearchPipeline;
use deep_research::search::{ExaClient, SearchClient};
use deep_research::session::Session;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "Interactive deep research assistant: plan, search, synthesize",
    long_about = r#"
Deep Research Agent - multi-agent web research from your terminal.

Every question goes through three stages:
  1. Planning: the LLM splits the question into three sub-tasks
     (fundamentals, trends, applications)
  2. Execution: each sub-task is searched with Exa
  3. Synthesis: the LLM writes a structured report from the findings

REQUIRED ENVIRONMENT:
  EXA_API_KEY        Exa search API key
  CEREBRAS_API_KEY   Cerebras API key (not needed with --provider ollama)

EXAMPLES:
  # Start an interactive session
  deep-research

  # Use a local Ollama model
  deep-research --provider ollama --model llama3.2

  # Run the three searches concurrently
  deep-research --concurrent
"#
)]
struct Args {
    /// Model to use (overrides LLM_MODEL)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// LLM provider: cerebras or ollama (overrides LLM_PROVIDER)
    #[arg(short = 'p', long = "provider")]
    provider: Option<LlmProvider>,

    /// Search all sub-tasks concurrently
    #[arg(short = 'c', long = "concurrent")]
    concurrent: bool,

    /// Conversation thread id (overrides THREAD_ID)
    #[arg(short = 't', long = "thread-id")]
    thread_id: Option<String>,

    /// Enable verbose/debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration, logging and clients are set up before any runtime
    // thread exists, so nothing touches the process environment concurrently.
    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ {:#}", e);
            return Err(e);
        }
    };

    init_logging(&config.log_level)?;

    info!(
        provider = %config.provider,
        model = %config.model,
        concurrent = config.concurrent,
        thread_id = %config.thread_id,
        "Configuration loaded"
    );

    let llm = build_llm(&config);
    let search: Arc<dyn SearchClient> = Arc::new(
        ExaClient::new(config.exa_api_key.clone())
            .with_base_url(config.exa_base_url.clone())
            .with_timeout(config.request_timeout),
    );
    let pipeline = Arc::new(ResearchPipeline::new(llm, search, config.pipeline_config()));
    let session = Session::new(pipeline, config.thread_id.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the Tokio runtime")?;

    let result = runtime.block_on(run_session(&session));

    // A pending stdin read lives on a blocking thread that cannot be
    // cancelled; waiting for it would keep the process alive after Ctrl+C.
    runtime.shutdown_background();

    if let Err(e) = &result {
        error!(error = %e, "Session failed");
    }
    result
}

/// Environment first, then command-line overrides, then validation.
fn load_config(args: Args) -> Result<Config> {
    let mut config = Config::from_env_with_provider(args.provider)?;

    if let Some(model) = args.model {
        config.model = model;
    }
    if args.concurrent {
        config.concurrent = true;
    }
    if let Some(thread_id) = args.thread_id {
        config.thread_id = thread_id;
    }
    if args.verbose {
        config.log_level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

async fn run_session(session: &Session) -> Result<()> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let end = session.run(input, &mut output, interrupt).await?;

    info!(reason = ?end, turns = session.turns().await, "Session finished");
    Ok(())
}

fn build_llm(config: &Config) -> Arc<dyn LlmClient> {
    match config.provider {
        LlmProvider::Cerebras => Arc::new(
            CerebrasClient::new(config.cerebras_api_key.clone(), config.model.clone())
                .with_base_url(config.cerebras_base_url.clone())
                .with_timeout(config.request_timeout),
        ),
        LlmProvider::Ollama => Arc::new(OllamaClient::new(&config.ollama_host, config.model.clone())),
    }
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Logs go to stderr so they never interleave with the report on stdout.
/// `level` uses `RUST_LOG` syntax.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log filter '{}'", level))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
