//! Deployment platform
//!
//! Application creation and deployment on a Coolify instance.

use async_trait::async_trait;
use hatch_client::CoolifyClient;
use hatch_client::coolify::{NewApplication, primary_domain};
use hatch_core::domain::progress::{ProgressEvent, ProgressSink};
use hatch_core::dto::application::{
    CreateApplication, CreatedApplication, DeployRequest, Deployment,
};
use hatch_core::error::DeploymentError;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Repository trait for the deployment platform
#[async_trait]
pub trait DeploymentPlatform: Send + Sync {
    /// Validates the instance URL and credentials
    async fn init(&self) -> Result<(), DeploymentError>;

    /// Creates an application bound to a git repository
    ///
    /// Private repositories need `request.github_app_uuid`; without it this
    /// fails with [`DeploymentError::PrivateRepository`].
    ///
    /// # Arguments
    /// * `request` - Placement identifiers and repository
    /// * `progress` - Sink for local `0..=100` progress
    async fn create_application(
        &self,
        request: &CreateApplication,
        progress: &dyn ProgressSink,
    ) -> Result<CreatedApplication, DeploymentError>;

    /// Creates or updates environment variables on an application
    async fn set_environment_variables(
        &self,
        uuid: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), DeploymentError>;

    /// Triggers a deployment
    async fn deploy(
        &self,
        request: &DeployRequest,
        progress: &dyn ProgressSink,
    ) -> Result<Deployment, DeploymentError>;
}

/// Coolify implementation of DeploymentPlatform
#[derive(Debug, Clone)]
pub struct CoolifyPlatform {
    client: Option<CoolifyClient>,
    build_pack: String,
    ports_exposes: String,
}

impl CoolifyPlatform {
    /// Creates a platform backed by a Coolify instance
    ///
    /// # Arguments
    /// * `client` - API client
    /// * `build_pack` - Build pack for new applications (e.g., "nixpacks")
    /// * `ports_exposes` - Ports exposed by new applications (e.g., "3000")
    pub fn new(
        client: CoolifyClient,
        build_pack: impl Into<String>,
        ports_exposes: impl Into<String>,
    ) -> Self {
        Self {
            client: Some(client),
            build_pack: build_pack.into(),
            ports_exposes: ports_exposes.into(),
        }
    }

    /// Creates a platform whose every operation reports "not configured"
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            build_pack: String::new(),
            ports_exposes: String::new(),
        }
    }

    fn client(&self) -> Result<&CoolifyClient, DeploymentError> {
        self.client
            .as_ref()
            .ok_or_else(|| DeploymentError::NotConfigured("URL and token".to_string()))
    }
}

#[async_trait]
impl DeploymentPlatform for CoolifyPlatform {
    async fn init(&self) -> Result<(), DeploymentError> {
        let version = self
            .client()?
            .version()
            .await
            .map_err(|e| DeploymentError::Api(e.to_string()))?;

        debug!("Connected to Coolify {}", version);
        Ok(())
    }

    async fn create_application(
        &self,
        request: &CreateApplication,
        progress: &dyn ProgressSink,
    ) -> Result<CreatedApplication, DeploymentError> {
        let github_app_uuid = match (request.private, &request.github_app_uuid) {
            (true, None) => return Err(DeploymentError::PrivateRepository),
            (true, Some(app)) => Some(app.clone()),
            (false, _) => None,
        };
        let client = self.client()?;
        progress.report(ProgressEvent::new(
            10,
            format!("Creating application {}", request.name),
            None,
        ));

        let body = NewApplication {
            project_uuid: request.project_uuid.clone(),
            server_uuid: request.server_uuid.clone(),
            environment_uuid: request.environment_uuid.clone(),
            destination_uuid: request.destination_uuid.clone(),
            git_repository: request.repo_url.clone(),
            git_branch: request.branch.clone(),
            build_pack: self.build_pack.clone(),
            ports_exposes: self.ports_exposes.clone(),
            github_app_uuid,
            name: Some(request.name.clone()),
            description: request.description.clone(),
            instant_deploy: false,
        };
        let created = if body.github_app_uuid.is_some() {
            client.create_github_app_application(&body).await
        } else {
            client.create_public_application(&body).await
        };
        let app = created.map_err(|e| DeploymentError::Api(e.to_string()))?;

        progress.report(ProgressEvent::new(100, "Application created", None));
        Ok(app.into())
    }

    async fn set_environment_variables(
        &self,
        uuid: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), DeploymentError> {
        self.client()?
            .set_envs(uuid, vars)
            .await
            .map_err(|e| DeploymentError::EnvironmentVariables(e.to_string()))?;

        debug!("Set {} environment variables on {}", vars.len(), uuid);
        Ok(())
    }

    async fn deploy(
        &self,
        request: &DeployRequest,
        progress: &dyn ProgressSink,
    ) -> Result<Deployment, DeploymentError> {
        let client = self.client()?;
        progress.report(ProgressEvent::new(10, "Triggering deployment", None));

        let response = client
            .deploy(&request.uuid)
            .await
            .map_err(|e| DeploymentError::Deploy(e.to_string()))?;

        let deployment_uuid = response
            .deployments
            .into_iter()
            .find_map(|d| d.deployment_uuid);
        info!(
            "Deployment queued for {} ({})",
            request.uuid,
            deployment_uuid.as_deref().unwrap_or("no deployment id")
        );
        progress.report(ProgressEvent::new(70, "Deployment queued", None));

        // The deploy endpoint does not return domains; look them up separately.
        let url = match client.get_application(&request.uuid).await {
            Ok(app) => app.fqdn.as_deref().and_then(primary_domain),
            Err(e) => {
                debug!("Could not fetch application {}: {}", request.uuid, e);
                None
            }
        };

        progress.report(ProgressEvent::new(100, "Deployment started", None));
        Ok(Deployment {
            deployment_uuid,
            url,
        })
    }
}
