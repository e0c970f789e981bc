//! Settings repository
//!
//! Persisted per-user defaults (GitHub organization and visibility, Coolify
//! identifiers) stored as JSON.

use anyhow::{Context, Result};
use async_trait::async_trait;
use hatch_core::settings::Settings;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository trait for reading persisted defaults
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Loads the current settings
    async fn get(&self) -> Result<Settings>;
}

/// JSON file backed settings
#[derive(Debug, Clone)]
pub struct FileSettingsProvider {
    path: PathBuf,
}

impl FileSettingsProvider {
    /// Creates a provider reading from an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config dir>/hatch/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the user config directory")?;
        Ok(dir.join("hatch").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes settings, creating parent directories as needed
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    async fn get(&self) -> Result<Settings> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        serde_json::from_str(&body)
            .with_context(|| format!("Invalid settings file {}", self.path.display()))
    }
}

/// In-memory settings
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn get(&self) -> Result<Settings> {
        Ok(self.0.clone())
    }
}
