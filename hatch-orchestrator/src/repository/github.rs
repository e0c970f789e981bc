//! Repository host
//!
//! Remote repository creation over the GitHub API, and pushing the scaffolded
//! project with the git CLI.

use async_trait::async_trait;
use hatch_client::GitHubClient;
use hatch_client::github::NewRepository;
use hatch_core::domain::progress::{ProgressEvent, ProgressSink};
use hatch_core::dto::repository::{CreateRepo, CreatedRepo};
use hatch_core::error::RepositoryError;
use std::path::Path;
use tracing::{debug, info};

use crate::git;

/// Repository trait for the source-control host
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Validates credentials
    async fn init(&self) -> Result<(), RepositoryError>;

    /// Creates a remote repository
    ///
    /// # Arguments
    /// * `request` - Name, description, visibility and owner
    /// * `progress` - Sink for local `0..=100` progress
    async fn create_repo(
        &self,
        request: &CreateRepo,
        progress: &dyn ProgressSink,
    ) -> Result<CreatedRepo, RepositoryError>;

    /// Pushes a local directory to a remote
    ///
    /// # Arguments
    /// * `clone_url` - Remote returned by `create_repo`
    /// * `path` - Local project directory
    /// * `branch` - Branch to push
    /// * `progress` - Sink for local `0..=100` progress
    async fn push_to_repo(
        &self,
        clone_url: &str,
        path: &Path,
        branch: &str,
        progress: &dyn ProgressSink,
    ) -> Result<(), RepositoryError>;
}

/// GitHub implementation of RepositoryHost
#[derive(Clone)]
pub struct GitHubHost {
    client: Option<GitHubClient>,
    token: Option<String>,
}

impl GitHubHost {
    /// Creates a host with an authenticated client
    ///
    /// # Arguments
    /// * `client` - API client
    /// * `token` - Same token, used for HTTPS pushes
    pub fn new(client: GitHubClient, token: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            token: Some(token.into()),
        }
    }

    /// Creates a host whose every operation reports "not configured"
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            token: None,
        }
    }

    fn client(&self) -> Result<&GitHubClient, RepositoryError> {
        self.client
            .as_ref()
            .ok_or_else(|| RepositoryError::NotConfigured("GITHUB_TOKEN is not set".to_string()))
    }
}

impl std::fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubHost")
            .field("client", &self.client)
            .field("token", &self.token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn init(&self) -> Result<(), RepositoryError> {
        let user = self
            .client()?
            .current_user()
            .await
            .map_err(|e| RepositoryError::Api(e.to_string()))?;

        debug!("Authenticated to GitHub as {}", user.login);
        Ok(())
    }

    async fn create_repo(
        &self,
        request: &CreateRepo,
        progress: &dyn ProgressSink,
    ) -> Result<CreatedRepo, RepositoryError> {
        let client = self.client()?;
        progress.report(ProgressEvent::new(
            10,
            format!("Creating repository {}", request.name),
            None,
        ));

        let repo = client
            .create_repo(
                request.owner.as_deref(),
                &NewRepository {
                    name: request.name.clone(),
                    description: request.description.clone(),
                    private: request.private,
                    auto_init: false,
                },
            )
            .await
            .map_err(|e| RepositoryError::Api(e.to_string()))?;

        info!(
            "Created repository {}",
            repo.full_name.as_deref().unwrap_or(&request.name)
        );
        progress.report(ProgressEvent::new(100, "Repository created", None));

        Ok(repo.into())
    }

    async fn push_to_repo(
        &self,
        clone_url: &str,
        path: &Path,
        branch: &str,
        progress: &dyn ProgressSink,
    ) -> Result<(), RepositoryError> {
        git::push_directory(path, clone_url, branch, self.token.as_deref(), progress)
            .await
            .map_err(|e| RepositoryError::Push(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatch_core::domain::progress::NoopProgress;

    #[tokio::test]
    async fn test_unconfigured_host() {
        let host = GitHubHost::unconfigured();

        let err = host.init().await.unwrap_err();
        assert_eq!(err.code(), "NOT_CONFIGURED");

        let request = CreateRepo {
            name: "demo".to_string(),
            description: None,
            private: true,
            owner: None,
        };
        assert!(matches!(
            host.create_repo(&request, &NoopProgress).await,
            Err(RepositoryError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let host = GitHubHost::new(GitHubClient::new("ghp_secret"), "ghp_secret");
        assert!(!format!("{:?}", host).contains("ghp_secret"));
    }
}
