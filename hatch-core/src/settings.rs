//! Persisted defaults
//!
//! Schema for the settings file the configuration provider reads. Storage
//! location and format belong to the provider; this module only defines the
//! shape and key-based access used by command surfaces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted defaults for a provisioning run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GitHubSettings,
    pub coolify: CoolifySettings,
}

/// GitHub defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Organization new repositories are created under
    pub default_org: Option<String>,
    /// Whether new repositories are private
    pub private: bool,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            default_org: None,
            private: true,
        }
    }
}

/// Coolify defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolifySettings {
    pub server_uuid: Option<String>,
    pub destination_uuid: Option<String>,
    pub project_uuid: Option<String>,
    pub environment_uuid: Option<String>,
    /// GitHub App registered in Coolify; required to deploy private repositories
    pub github_app_uuid: Option<String>,
}

/// Error for key-based settings access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl Settings {
    /// Every key accepted by [`Settings::get`] and [`Settings::set`]
    pub const KEYS: [&'static str; 7] = [
        "github.default_org",
        "github.private",
        "coolify.server_uuid",
        "coolify.destination_uuid",
        "coolify.project_uuid",
        "coolify.environment_uuid",
        "coolify.github_app_uuid",
    ];

    /// Reads a value by dotted key
    pub fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let value = match key {
            "github.default_org" => self.github.default_org.clone(),
            "github.private" => Some(self.github.private.to_string()),
            "coolify.server_uuid" => self.coolify.server_uuid.clone(),
            "coolify.destination_uuid" => self.coolify.destination_uuid.clone(),
            "coolify.project_uuid" => self.coolify.project_uuid.clone(),
            "coolify.environment_uuid" => self.coolify.environment_uuid.clone(),
            "coolify.github_app_uuid" => self.coolify.github_app_uuid.clone(),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Writes a value by dotted key; an empty value clears optional keys
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let value = value.trim();
        let optional = (!value.is_empty()).then(|| value.to_string());

        match key {
            "github.default_org" => self.github.default_org = optional,
            "github.private" => {
                self.github.private =
                    value
                        .parse::<bool>()
                        .map_err(|_| SettingsError::InvalidValue {
                            key: key.to_string(),
                            message: "expected true or false".to_string(),
                        })?
            }
            "coolify.server_uuid" => self.coolify.server_uuid = optional,
            "coolify.destination_uuid" => self.coolify.destination_uuid = optional,
            "coolify.project_uuid" => self.coolify.project_uuid = optional,
            "coolify.environment_uuid" => self.coolify.environment_uuid = optional,
            "coolify.github_app_uuid" => self.coolify.github_app_uuid = optional,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
