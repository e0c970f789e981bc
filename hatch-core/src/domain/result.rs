//! Pipeline result
//!
//! The accumulator a run fills in step by step and hands back to the caller.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Outcome of one provisioning run
///
/// Every optional field is written at most once, by the step responsible for
/// it. Fields belonging to skipped or failed steps stay unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineResult {
    errors: Vec<String>,
    warnings: Vec<String>,
    bot_token: Option<String>,
    bot_username: Option<String>,
    project_path: Option<PathBuf>,
    github_repo_url: Option<String>,
    coolify_app_uuid: Option<String>,
    deployment_url: Option<String>,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no step failed
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failure messages, one per failed step, in order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Non-fatal failures
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token.as_deref()
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.as_deref()
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn github_repo_url(&self) -> Option<&str> {
        self.github_repo_url.as_deref()
    }

    pub fn coolify_app_uuid(&self) -> Option<&str> {
        self.coolify_app_uuid.as_deref()
    }

    pub fn deployment_url(&self) -> Option<&str> {
        self.deployment_url.as_deref()
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn record_bot_token(&mut self, token: impl Into<String>) {
        set_once(&mut self.bot_token, token.into(), "bot_token");
    }

    pub fn record_bot_username(&mut self, username: impl Into<String>) {
        set_once(&mut self.bot_username, username.into(), "bot_username");
    }

    pub fn record_project_path(&mut self, path: impl Into<PathBuf>) {
        set_once(&mut self.project_path, path.into(), "project_path");
    }

    pub fn record_github_repo_url(&mut self, url: impl Into<String>) {
        set_once(&mut self.github_repo_url, url.into(), "github_repo_url");
    }

    pub fn record_coolify_app_uuid(&mut self, uuid: impl Into<String>) {
        set_once(&mut self.coolify_app_uuid, uuid.into(), "coolify_app_uuid");
    }

    pub fn record_deployment_url(&mut self, url: impl Into<String>) {
        set_once(&mut self.deployment_url, url.into(), "deployment_url");
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &str) {
    if slot.is_some() {
        warn!("Ignoring second write to result field '{}'", field);
        return;
    }
    *slot = Some(value);
}

impl Serialize for PipelineResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PipelineResult", 9)?;
        state.serialize_field("success", &self.success())?;
        state.serialize_field("errors", &self.errors)?;
        if self.warnings.is_empty() {
            state.skip_field("warnings")?;
        } else {
            state.serialize_field("warnings", &self.warnings)?;
        }
        serialize_opt(&mut state, "botToken", &self.bot_token)?;
        serialize_opt(&mut state, "botUsername", &self.bot_username)?;
        serialize_opt(&mut state, "projectPath", &self.project_path)?;
        serialize_opt(&mut state, "githubRepoUrl", &self.github_repo_url)?;
        serialize_opt(&mut state, "coolifyAppUuid", &self.coolify_app_uuid)?;
        serialize_opt(&mut state, "deploymentUrl", &self.deployment_url)?;
        state.end()
    }
}

fn serialize_opt<S, T>(state: &mut S, key: &'static str, value: &Option<T>) -> Result<(), S::Error>
where
    S: SerializeStruct,
    T: Serialize,
{
    match value {
        Some(v) => state.serialize_field(key, v),
        None => state.skip_field(key),
    }
}
