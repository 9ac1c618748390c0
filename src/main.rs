//! rhetor CLI entry point.
//!
//! Initializes logging and delegates to the CLI module for command handling.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first so --log-level is available before logging starts.
    let cli = rhetor::cli::parse_cli();

    // RUST_LOG wins over --log-level, so one-off debugging needs no flag.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    rhetor::cli::run_with_cli(cli).await
}
