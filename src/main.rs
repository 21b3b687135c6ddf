//! Savant - Conversational Research Assistant Agent
//!
//! Main entry point for the CLI application.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use savant::agent::Agent;
use savant::core::Config;
use savant::llm::GeminiClient;
use savant::tools::ToolRegistry;
use savant::Repl;

/// Savant - Conversational Research Assistant Agent
#[derive(Parser, Debug)]
#[command(name = "savant")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model name (e.g. gemini-2.0-flash)
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum think/act cycles per turn
    #[arg(long)]
    max_steps: Option<usize>,

    /// Override the system instruction
    #[arg(long)]
    system: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Disable streamed answers
    #[arg(long)]
    no_stream: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Attachment path combined with the prompt (single prompt mode)
    #[arg(long, short = 'a')]
    attach: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.model.name = model.clone();
    }

    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = max_steps;
    }

    if let Some(ref system) = args.system {
        config.agent.system_instruction = system.clone();
    }

    if args.debug {
        config.agent.debug = true;
    }

    if args.no_stream {
        config.streaming.enabled = false;
    }

    let default_filter = if config.agent.debug {
        "savant=debug"
    } else {
        "savant=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let model = Arc::new(GeminiClient::from_config(&config)?);

    // Capabilities are registered by embedding programs; the CLI itself
    // ships none (tool hosting is outside the core).
    let registry = ToolRegistry::new();

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let agent = Agent::new(config, model, registry);
        let response = agent.submit_turn("cli", &prompt, args.attach.as_deref()).await?;
        println!("{}", response);
        return Ok(());
    }

    // Interactive REPL mode
    let agent = Agent::new(config, model, registry);
    let mut repl = Repl::new(agent);
    repl.run().await?;

    Ok(())
}
