//! Configuration module
//!
//! Builds the runtime configuration from the environment and CLI overrides.

use anyhow::{Context, Result};
use hatch_orchestrator::Config;
use std::path::PathBuf;

/// Loads configuration from the environment
///
/// # Arguments
/// * `settings_path` - Settings file given on the command line, if any
pub fn load(settings_path: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::from_env();
    if settings_path.is_some() {
        config.settings_path = settings_path;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
