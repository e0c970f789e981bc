//! Pipeline options
//!
//! The immutable request a caller hands to the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::progress::ProgressSink;
use crate::error::BotNameError;

/// Longest name GitHub accepts for a repository
pub const MAX_BOT_NAME_LEN: usize = 100;

/// Checks that a bot name is usable as both a directory and a repository name
///
/// The orchestrator joins the name onto the target directory as-is, so callers
/// taking user or agent input run it through this first. Only ASCII letters,
/// digits, `-`, `_` and `.` are accepted, which excludes separators and
/// absolute paths; a leading `.` excludes `.` and `..`.
pub fn validate_bot_name(name: &str) -> Result<(), BotNameError> {
    if name.is_empty() {
        return Err(BotNameError::Empty);
    }
    if name.len() > MAX_BOT_NAME_LEN {
        return Err(BotNameError::TooLong {
            max: MAX_BOT_NAME_LEN,
        });
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(BotNameError::InvalidCharacter(c));
    }
    if name.starts_with('.') {
        return Err(BotNameError::LeadingDot);
    }
    Ok(())
}

/// Options for one provisioning run
///
/// Constructed once by the caller and never mutated by the orchestrator.
#[derive(Clone, Default)]
pub struct PipelineOptions {
    /// Bot name, used as display name, directory name and repository name
    pub bot_name: String,
    pub description: Option<String>,
    pub create_repository: bool,
    pub deploy_to_platform: bool,
    pub skip_registration: bool,
    /// GitHub owner override (falls back to the configured default organization)
    pub organization: Option<String>,
    pub server_uuid: Option<String>,
    pub destination_uuid: Option<String>,
    pub project_uuid: Option<String>,
    pub environment_uuid: Option<String>,
    /// Pre-existing bot token; bypasses registration entirely
    pub bot_token: Option<String>,
    /// Parent directory for the generated project (defaults to the working directory)
    pub target_path: Option<PathBuf>,
    /// Template identifier override
    pub template: Option<String>,
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl PipelineOptions {
    /// Creates options with every optional step disabled
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_repository(mut self, enabled: bool) -> Self {
        self.create_repository = enabled;
        self
    }

    pub fn with_deployment(mut self, enabled: bool) -> Self {
        self.deploy_to_platform = enabled;
        self
    }

    pub fn skipping_registration(mut self) -> Self {
        self.skip_registration = true;
        self
    }

    pub fn with_bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("bot_name", &self.bot_name)
            .field("description", &self.description)
            .field("create_repository", &self.create_repository)
            .field("deploy_to_platform", &self.deploy_to_platform)
            .field("skip_registration", &self.skip_registration)
            .field("organization", &self.organization)
            .field("server_uuid", &self.server_uuid)
            .field("destination_uuid", &self.destination_uuid)
            .field("project_uuid", &self.project_uuid)
            .field("environment_uuid", &self.environment_uuid)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("target_path", &self.target_path)
            .field("template", &self.template)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Serializable form of [`PipelineOptions`] without the progress sink
///
/// Command surfaces and tool-call adapters deserialize user or agent input into
/// this and convert it with `From`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    pub bot_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub create_repository: bool,
    #[serde(default)]
    pub deploy_to_platform: bool,
    #[serde(default)]
    pub skip_registration: bool,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub server_uuid: Option<String>,
    #[serde(default)]
    pub destination_uuid: Option<String>,
    #[serde(default)]
    pub project_uuid: Option<String>,
    #[serde(default)]
    pub environment_uuid: Option<String>,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub target_path: Option<PathBuf>,
    #[serde(default)]
    pub template: Option<String>,
}

impl From<PipelineRequest> for PipelineOptions {
    fn from(req: PipelineRequest) -> Self {
        Self {
            bot_name: req.bot_name,
            description: req.description,
            create_repository: req.create_repository,
            deploy_to_platform: req.deploy_to_platform,
            skip_registration: req.skip_registration,
            organization: req.organization,
            server_uuid: req.server_uuid,
            destination_uuid: req.destination_uuid,
            project_uuid: req.project_uuid,
            environment_uuid: req.environment_uuid,
            bot_token: req.bot_token,
            target_path: req.target_path,
            template: req.template,
            progress: None,
        }
    }
}
