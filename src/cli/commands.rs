//! CLI command definitions for rhetor.
//!
//! The CLI is the presentation boundary: it renders driver events and
//! outcome data as plain text and owns every `println!` in the crate.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use crate::config::DebateConfig;
use crate::debate::{DebateDriver, DebateEvent};
use crate::llm::{ChatGateway, LlmProvider, ProviderKind};
use crate::storage::{RecordStore, StorageConfig};

/// Default directory for saved conversation records.
const DEFAULT_OUTPUT_DIR: &str = "conversations";

/// Stage debates between two contrasting AI personas.
#[derive(Parser)]
#[command(name = "rhetor")]
#[command(about = "Stage a debate between two contrasting AI personas")]
#[command(version)]
#[command(
    long_about = "rhetor drives an alternating-turn debate between two LLM-backed personas \
                  around a chosen or generated topic, then produces a summary, an adjudicated \
                  winner, and an optional JSON record.\n\nExample usage:\n  rhetor run --topic \
                  \"Is silence a form of communication?\" --exchanges 6 --save"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run a debate and print the transcript as it unfolds.
    Run(RunArgs),

    /// Test connectivity to the text-generation backend.
    Check(BackendArgs),

    /// List saved conversation records, newest first.
    List(ListArgs),

    /// Show one saved conversation record.
    Show(ShowArgs),
}

/// Backend selection, shared by `run` and `check`.
#[derive(Parser, Debug)]
pub struct BackendArgs {
    /// Text-generation provider (lmstudio, openai, deepseek, ollama).
    #[arg(short, long, default_value = "lmstudio")]
    pub provider: ProviderKind,

    /// Model identifier; defaults to the provider's usual model.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Chat endpoint URL override.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for providers that need one (can also be set via RHETOR_API_KEY).
    #[arg(long, env = "RHETOR_API_KEY")]
    pub api_key: Option<String>,
}

/// Arguments for `rhetor run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Debate topic; generated automatically when omitted.
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Number of exchanges (clamped into the configured bounds).
    #[arg(short, long)]
    pub exchanges: Option<u32>,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Save the conversation record after the run.
    #[arg(short, long)]
    pub save: bool,

    /// Directory for saved records.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: String,

    /// Print the full record as JSON when the run finishes.
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments for `rhetor list`.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory holding saved records.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: String,
}

/// Arguments for `rhetor show`.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Filename of the record to show (as printed by `list`).
    pub filename: String,

    /// Directory holding saved records.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: String,

    /// Print the full transcript as well.
    #[arg(long)]
    pub transcript: bool,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before
/// running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_debate_command(args).await,
        Commands::Check(args) => run_check_command(args).await,
        Commands::List(args) => run_list_command(args).await,
        Commands::Show(args) => run_show_command(args).await,
    }
}

/// Builds a gateway from backend arguments.
fn build_gateway(args: &BackendArgs) -> anyhow::Result<ChatGateway> {
    if args.provider.requires_api_key() && args.api_key.is_none() {
        anyhow::bail!(
            "provider '{}' needs an API key (--api-key or RHETOR_API_KEY)",
            args.provider
        );
    }

    let mut gateway = ChatGateway::new(args.provider);
    if let Some(model) = &args.model {
        gateway = gateway.with_model(model);
    }
    if let Some(endpoint) = &args.endpoint {
        gateway = gateway.with_endpoint(endpoint);
    }
    if let Some(api_key) = &args.api_key {
        gateway = gateway.with_api_key(api_key);
    }
    Ok(gateway)
}

fn store_for(directory: &str) -> RecordStore {
    RecordStore::new(StorageConfig {
        directory: directory.into(),
        ..StorageConfig::default()
    })
}

// ============================================================================
// Run Command Implementation
// ============================================================================

async fn run_debate_command(args: RunArgs) -> anyhow::Result<()> {
    let gateway: Arc<dyn LlmProvider> = Arc::new(build_gateway(&args.backend)?);
    let config = DebateConfig::default();

    // Connectivity is a blocking condition: fail before any turn runs.
    if !gateway.test_connection().await {
        anyhow::bail!(
            "cannot reach the {} backend; is it running?",
            args.backend.provider
        );
    }

    let exchanges = args.exchanges.unwrap_or(config.default_exchanges);

    let (tx, mut rx) = mpsc::channel::<DebateEvent>(64);
    let renderer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            render_event(&event);
        }
    });

    let driver = DebateDriver::new(gateway, config);
    let outcome = driver.run(args.topic, exchanges, tx).await?;

    // The driver dropped its sender; drain the renderer before printing
    // anything else.
    renderer.await?;

    let stats = outcome.record.stats();
    println!();
    println!("Turns completed:    {}", stats.completed_turns);
    println!(
        "Messages:           {} ({}), {} ({})",
        stats.ai1_messages,
        outcome.record.metadata.participants.ai1.name,
        stats.ai2_messages,
        outcome.record.metadata.participants.ai2.name,
    );
    println!("Total characters:   {}", stats.total_characters);
    println!("Estimated duration: {}s", stats.estimated_duration_secs);

    if args.save {
        match store_for(&args.output).save(&outcome.record).await {
            Ok(filename) => println!("Saved to {}/{}", args.output, filename),
            Err(err) => eprintln!("Failed to save conversation: {err}"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.record)?);
    }

    Ok(())
}

fn render_event(event: &DebateEvent) {
    match event {
        DebateEvent::TopicSelected { topic, .. } => {
            println!("Topic: {topic}\n");
        }
        DebateEvent::PersonasReady { first, second, .. } => {
            println!("{}: {} ({})", first.name, first.personality, first.style);
            println!("{}: {} ({})\n", second.name, second.personality, second.style);
        }
        DebateEvent::TurnStarted { .. } => {}
        DebateEvent::TurnRetried { speaker, .. } => {
            println!("({speaker} is thinking...)");
        }
        DebateEvent::TurnCompleted {
            turn,
            speaker,
            message,
            ..
        } => {
            println!("[{turn}] {speaker}: {message}\n");
        }
        DebateEvent::ExchangeTruncated {
            completed_turns, ..
        } => {
            println!("Generation failed twice; stopping after {completed_turns} turns.");
        }
        DebateEvent::SummaryReady { summary, .. } => {
            println!("Summary: {summary}");
        }
        DebateEvent::WinnerDeclared { winner, reason, .. } => {
            println!("Winner: {winner}");
            println!("Reason: {reason}");
        }
        DebateEvent::DebateCompleted { .. } => {}
    }
}

// ============================================================================
// Check / List / Show Command Implementations
// ============================================================================

async fn run_check_command(args: BackendArgs) -> anyhow::Result<()> {
    let gateway = build_gateway(&args)?;
    println!("Checking {} at {} ...", args.provider, gateway.endpoint());

    if gateway.test_connection().await {
        println!("Backend is reachable.");
        Ok(())
    } else {
        anyhow::bail!("backend did not answer the connection test")
    }
}

async fn run_list_command(args: ListArgs) -> anyhow::Result<()> {
    let store = store_for(&args.output);
    let names = store.list().await?;

    if names.is_empty() {
        println!("No saved conversations in {}", args.output);
        return Ok(());
    }

    for name in names {
        match store.file_info(&name).await {
            Ok(info) => {
                let modified = info
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{name}  {:>8} bytes  {modified}", info.size_bytes);
            }
            Err(_) => println!("{name}"),
        }
    }
    Ok(())
}

async fn run_show_command(args: ShowArgs) -> anyhow::Result<()> {
    let record = store_for(&args.output).load(&args.filename).await?;
    let meta = &record.metadata;
    let stats = record.stats();

    println!("Topic:   {}", meta.topic);
    println!("Date:    {}", meta.timestamp.format("%Y-%m-%d %H:%M:%S"));
    println!(
        "Agents:  {} ({}) vs {} ({})",
        meta.participants.ai1.name,
        meta.participants.ai1.personality,
        meta.participants.ai2.name,
        meta.participants.ai2.personality,
    );
    println!(
        "Turns:   {} ({} + {})",
        stats.completed_turns, stats.ai1_messages, stats.ai2_messages
    );
    println!("Size:    {} characters", stats.total_characters);

    if args.transcript {
        println!();
        for turn in &record.conversation {
            println!("[{}] {}: {}", turn.turn, turn.speaker, turn.message);
        }
    }
    Ok(())
}
