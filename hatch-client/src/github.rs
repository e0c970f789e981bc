//! GitHub REST API client

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{handle_response, normalize_base_url};

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Authenticated GitHub API client
#[derive(Clone)]
pub struct GitHubClient {
    base_url: String,
    token: String,
    client: Client,
}

/// The authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// Body of a repository creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    pub auto_init: bool,
}

/// Repository as returned by the API
///
/// Only the fields the pipeline reads; the URLs stay optional so a missing
/// value can be reported as its own failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: Option<String>,
    pub clone_url: Option<String>,
    pub html_url: Option<String>,
}

impl GitHubClient {
    /// Create a client for the public GitHub API
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(DEFAULT_API_URL, token, Client::new())
    }

    /// Create a client with a custom base URL and HTTP client
    ///
    /// Used for GitHub Enterprise hosts and for configuring timeouts.
    pub fn with_client(base_url: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ClientError::InvalidRequest("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("hatch"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Fetch the authenticated user
    ///
    /// Doubles as a credential check: a bad token yields a 401 `ApiError`.
    pub async fn current_user(&self) -> Result<User> {
        let url = format!("{}/user", self.base_url);
        let response = self.client.get(&url).headers(self.headers()?).send().await?;

        handle_response(response).await
    }

    /// Create a repository
    ///
    /// # Arguments
    /// * `org` - Organization to create it in; `None` creates it for the authenticated user
    /// * `repo` - Repository settings
    pub async fn create_repo(&self, org: Option<&str>, repo: &NewRepository) -> Result<Repository> {
        if repo.name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "repository name cannot be empty".to_string(),
            ));
        }

        let url = self.create_repo_url(org);
        debug!("Creating repository {} via {}", repo.name, url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(repo)
            .send()
            .await?;

        handle_response(response).await
    }

    fn create_repo_url(&self, org: Option<&str>) -> String {
        match org {
            Some(org) => format!("{}/orgs/{}/repos", self.base_url, org),
            None => format!("{}/user/repos", self.base_url),
        }
    }
}

impl From<Repository> for hatch_core::dto::repository::CreatedRepo {
    fn from(repo: Repository) -> Self {
        Self {
            full_name: repo.full_name,
            clone_url: repo.clone_url,
            html_url: repo.html_url,
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
