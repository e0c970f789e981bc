//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod create;
mod settings;
mod tools;

pub use create::CreateArgs;
pub use settings::SettingsCommands;
pub use tools::ToolCommands;

use anyhow::Result;
use clap::Subcommand;
use hatch_orchestrator::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Provision a new bot
    Create(CreateArgs),
    /// Manage persisted defaults
    Config {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Inspect and call agent tools
    Tools {
        #[command(subcommand)]
        command: ToolCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The runtime configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Create(args) => create::handle_create_command(args, config).await,
        Commands::Config { command } => settings::handle_settings_command(command, config).await,
        Commands::Tools { command } => tools::handle_tool_command(command, config).await,
    }
}
