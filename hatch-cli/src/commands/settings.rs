//! Config command handlers
//!
//! Reads and edits the persisted defaults used when a run does not override
//! them (GitHub organization and visibility, Coolify identifiers).

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use hatch_core::settings::Settings;
use hatch_orchestrator::Config;
use hatch_orchestrator::repository::{FileSettingsProvider, SettingsProvider};

/// Config subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show every setting
    Show,
    /// Print one setting
    Get {
        /// Dotted key (e.g. coolify.server_uuid)
        key: String,
    },
    /// Change one setting; an empty value clears it
    Set {
        /// Dotted key (e.g. github.default_org)
        key: String,
        value: String,
    },
    /// Print the settings file location
    Path,
}

/// Handle config commands
///
/// # Arguments
/// * `command` - The config command to execute
/// * `config` - The runtime configuration
pub async fn handle_settings_command(command: SettingsCommands, config: &Config) -> Result<()> {
    let provider = config.settings_provider()?;

    match command {
        SettingsCommands::Show => show_settings(&provider).await,
        SettingsCommands::Get { key } => get_setting(&provider, &key).await,
        SettingsCommands::Set { key, value } => set_setting(&provider, &key, &value).await,
        SettingsCommands::Path => {
            println!("{}", provider.path().display());
            Ok(())
        }
    }
}

/// Show every setting
async fn show_settings(provider: &FileSettingsProvider) -> Result<()> {
    let settings = provider.get().await?;

    println!("{}", format!("Settings ({})", provider.path().display()).bold());
    for key in Settings::KEYS {
        let value = settings.get(key)?;
        println!("  {:<28} {}", key.cyan(), render_value(value.as_deref()));
    }

    Ok(())
}

/// Print one setting
async fn get_setting(provider: &FileSettingsProvider, key: &str) -> Result<()> {
    let settings = provider.get().await?;

    match settings.get(key)? {
        Some(value) => println!("{}", value),
        None => println!("{}", "(unset)".dimmed()),
    }

    Ok(())
}

/// Change one setting and persist it
async fn set_setting(provider: &FileSettingsProvider, key: &str, value: &str) -> Result<()> {
    let mut settings = provider.get().await?;
    settings.set(key, value)?;
    provider
        .save(&settings)
        .await
        .context("Failed to save settings")?;

    let shown = settings.get(key)?;
    println!(
        "{} {} = {}",
        "✓".green(),
        key.cyan(),
        render_value(shown.as_deref())
    );

    Ok(())
}

fn render_value(value: Option<&str>) -> ColoredString {
    match value {
        Some(value) => value.normal(),
        None => "(unset)".dimmed(),
    }
}
