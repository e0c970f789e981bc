//! Coolify API client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{handle_empty_response, handle_response, normalize_base_url};

/// HTTP client for a Coolify instance
#[derive(Clone)]
pub struct CoolifyClient {
    /// Base URL of the instance (e.g., "https://coolify.example.com")
    base_url: String,
    /// API token
    token: String,
    client: Client,
}

/// Body of `POST /api/v1/applications/public` and
/// `POST /api/v1/applications/private-github-app`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    pub project_uuid: String,
    pub server_uuid: String,
    pub environment_uuid: String,
    pub destination_uuid: String,
    pub git_repository: String,
    pub git_branch: String,
    pub build_pack: String,
    pub ports_exposes: String,
    /// Only sent to the GitHub App endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_app_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub instant_deploy: bool,
}

/// Response of application creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedApplication {
    pub uuid: Option<String>,
    pub domains: Option<String>,
}

/// Application details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Application {
    pub uuid: Option<String>,
    pub name: Option<String>,
    /// Comma-separated list of domains assigned to the application
    pub fqdn: Option<String>,
}

/// A single environment variable in a bulk update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
    pub is_preview: bool,
}

#[derive(Debug, Serialize)]
struct BulkEnvRequest<'a> {
    data: &'a [EnvironmentVariable],
}

/// Response of `GET /api/v1/deploy`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployResponse {
    #[serde(default)]
    pub deployments: Vec<QueuedDeployment>,
}

/// One queued deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueuedDeployment {
    pub message: Option<String>,
    pub resource_uuid: Option<String>,
    pub deployment_uuid: Option<String>,
}

impl CoolifyClient {
    /// Create a new Coolify client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the instance
    /// * `token` - An API token with deploy permissions
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new Coolify client with a custom HTTP client
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the instance
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Fetch the instance version
    ///
    /// Used to validate the URL and token before doing any real work.
    pub async fn version(&self) -> Result<String> {
        let response = self
            .client
            .get(self.api_url("/version"))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), body));
        }

        Ok(body.trim().trim_matches('"').to_string())
    }

    /// Create an application from a public git repository
    pub async fn create_public_application(
        &self,
        app: &NewApplication,
    ) -> Result<CreatedApplication> {
        self.create_application("/applications/public", app).await
    }

    /// Create an application from a private repository cloned through a
    /// GitHub App registered in Coolify
    pub async fn create_github_app_application(
        &self,
        app: &NewApplication,
    ) -> Result<CreatedApplication> {
        if app.github_app_uuid.is_none() {
            return Err(ClientError::InvalidRequest(
                "github_app_uuid is required for private repositories".to_string(),
            ));
        }
        self.create_application("/applications/private-github-app", app).await
    }

    async fn create_application(
        &self,
        path: &str,
        app: &NewApplication,
    ) -> Result<CreatedApplication> {
        debug!("Creating application from {} via {}", app.git_repository, path);
        let response = self
            .client
            .post(self.api_url(path))
            .bearer_auth(&self.token)
            .json(app)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Get an application by UUID
    pub async fn get_application(&self, uuid: &str) -> Result<Application> {
        let response = self
            .client
            .get(self.api_url(&format!("/applications/{}", uuid)))
            .bearer_auth(&self.token)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Create or update environment variables on an application
    ///
    /// # Arguments
    /// * `uuid` - The application UUID
    /// * `vars` - Variables to set, keyed by name
    pub async fn set_envs(&self, uuid: &str, vars: &BTreeMap<String, String>) -> Result<()> {
        if vars.is_empty() {
            return Ok(());
        }

        let data: Vec<EnvironmentVariable> = vars
            .iter()
            .map(|(key, value)| EnvironmentVariable {
                key: key.clone(),
                value: value.clone(),
                is_preview: false,
            })
            .collect();

        let response = self
            .client
            .patch(self.api_url(&format!("/applications/{}/envs/bulk", uuid)))
            .bearer_auth(&self.token)
            .json(&BulkEnvRequest { data: &data })
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Queue a deployment of a resource
    pub async fn deploy(&self, uuid: &str) -> Result<DeployResponse> {
        debug!("Queueing deployment of {}", uuid);
        let response = self
            .client
            .get(self.api_url("/deploy"))
            .query(&[("uuid", uuid)])
            .bearer_auth(&self.token)
            .send()
            .await?;

        handle_response(response).await
    }
}

impl From<CreatedApplication> for hatch_core::dto::application::CreatedApplication {
    fn from(app: CreatedApplication) -> Self {
        Self {
            uuid: app.uuid,
            url: app.domains.as_deref().and_then(primary_domain),
        }
    }
}

impl std::fmt::Debug for CoolifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoolifyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// First `http(s)` URL in a comma-separated domain list
pub fn primary_domain(domains: &str) -> Option<String> {
    domains
        .split(',')
        .map(str::trim)
        .find(|d| d.starts_with("http://") || d.starts_with("https://"))
        .map(str::to_string)
}
