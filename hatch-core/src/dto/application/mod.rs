//! Deployment platform DTOs

use serde::{Deserialize, Serialize};

/// Request to create a deployable application bound to a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplication {
    pub name: String,
    pub description: Option<String>,
    pub server_uuid: String,
    pub destination_uuid: String,
    pub project_uuid: String,
    pub environment_uuid: String,
    pub repo_url: String,
    pub branch: String,
    /// Whether the repository needs credentials to clone
    pub private: bool,
    /// GitHub App the platform clones private repositories with
    pub github_app_uuid: Option<String>,
}

/// A created application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedApplication {
    pub uuid: Option<String>,
    /// Public URL assigned by the platform, if any
    pub url: Option<String>,
}

/// Request to deploy an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub uuid: String,
}

/// A triggered deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    pub deployment_uuid: Option<String>,
    pub url: Option<String>,
}
