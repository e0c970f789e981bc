//! Hatch CLI
//!
//! Command-line interface for provisioning Telegram bots.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hatch")]
#[command(about = "Telegram bot provisioning CLI", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/hatch/config.json)
    #[arg(long, global = true, env = "HATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hatch_cli=info,hatch_orchestrator=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config)?;

    handle_command(cli.command, &config).await
}
