//! Typed step failures
//!
//! Each collaborator returns one of these instead of panicking. Every variant
//! carries a machine-readable code (see `code()`) and a human message (its
//! `Display`). Only the message crosses the orchestrator boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Bot names that cannot double as a directory and repository name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotNameError {
    #[error("Bot name cannot be empty")]
    Empty,

    #[error("Bot name is longer than {max} characters")]
    TooLong { max: usize },

    #[error("Bot name cannot start with '.'")]
    LeadingDot,

    #[error("Bot name contains {0:?}; use letters, digits, '-', '_' or '.'")]
    InvalidCharacter(char),
}

/// Failures from the messaging-platform registration service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Telegram registration not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to open Telegram session: {0}")]
    Session(String),

    #[error("Failed to create bot: {0}")]
    CreateBot(String),

    #[error("Failed to close Telegram session: {0}")]
    Disconnect(String),
}

impl RegistrationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::Session(_) => "SESSION_FAILED",
            Self::CreateBot(_) => "CREATE_BOT_FAILED",
            Self::Disconnect(_) => "DISCONNECT_FAILED",
        }
    }
}

/// Failures from the project template generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaffoldError {
    #[error("Directory {} already exists", .0.display())]
    DirectoryExists(PathBuf),

    #[error("Failed to start template generator: {0}")]
    Spawn(String),

    #[error("Template generator exited with code {exit_code}: {stderr}")]
    GeneratorFailed { exit_code: i32, stderr: String },

    #[error("Template generator did not create {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Cannot inspect {}: {message}", .path.display())]
    TargetUnreadable { path: PathBuf, message: String },
}

impl ScaffoldError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DirectoryExists(_) => "DIRECTORY_EXISTS",
            Self::Spawn(_) => "SPAWN_FAILED",
            Self::GeneratorFailed { .. } => "GENERATOR_FAILED",
            Self::MissingOutput(_) => "MISSING_OUTPUT",
            Self::TargetUnreadable { .. } => "TARGET_UNREADABLE",
        }
    }
}

/// Failures from the source-control host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("GitHub not configured: {0}")]
    NotConfigured(String),

    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("Repository created but no clone URL returned")]
    NoCloneUrl,

    #[error("Failed to push to repository: {0}")]
    Push(String),
}

impl RepositoryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::Api(_) => "API_ERROR",
            Self::NoCloneUrl => "NO_CLONE_URL",
            Self::Push(_) => "PUSH_FAILED",
        }
    }
}

/// Failures from the deployment platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeploymentError {
    #[error("Coolify {0} not configured")]
    NotConfigured(String),

    #[error("Coolify API error: {0}")]
    Api(String),

    #[error("Application created but no application UUID returned")]
    NoApplicationUuid,

    #[error(
        "Private repository cannot be deployed via public source: set coolify.github_app_uuid or github.private=false"
    )]
    PrivateRepository,

    #[error("Failed to set environment variables: {0}")]
    EnvironmentVariables(String),

    #[error("Failed to trigger deployment: {0}")]
    Deploy(String),
}

impl DeploymentError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::Api(_) => "API_ERROR",
            Self::NoApplicationUuid => "NO_APPLICATION_UUID",
            Self::PrivateRepository => "PRIVATE_REPOSITORY",
            Self::EnvironmentVariables(_) => "ENV_VARS_FAILED",
            Self::Deploy(_) => "DEPLOY_FAILED",
        }
    }
}
