//! Provisioning pipeline
//!
//! Runs the four steps in a fixed order:
//! - Registration: obtain a bot token from the messaging platform
//! - Scaffolding: generate the project directory from a template
//! - Repository: create a remote repository and push the project
//! - Deployment: create an application on the platform and deploy it
//!
//! The orchestrator owns the fatal/non-fatal policy, threads values produced
//! by earlier steps into later ones and normalizes collaborator progress.
//! `run` never fails: every collaborator error or panic becomes an entry in
//! the returned result.

use anyhow::{Context, Result};
use futures::FutureExt;
use hatch_client::{CoolifyClient, GitHubClient};
use hatch_core::domain::options::PipelineOptions;
use hatch_core::domain::result::PipelineResult;
use hatch_core::domain::step::{PipelineState, Step};
use hatch_core::dto::application::{CreateApplication, DeployRequest};
use hatch_core::dto::bot::CreateBot;
use hatch_core::dto::repository::CreateRepo;
use hatch_core::error::{DeploymentError, RegistrationError, RepositoryError, ScaffoldError};
use hatch_core::settings::Settings;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::repository::{
    BotRegistrar, CoolifyPlatform, DeploymentPlatform, GitHubHost, RepositoryHost,
    SettingsProvider, UnconfiguredRegistrar,
};
use crate::service::{CommandScaffolder, ProgressPlan, ProgressTracker, ScaffoldRequest, Scaffolder};

#[cfg(test)]
mod tests;

/// Environment variable the bot token is exposed as on the deployed application
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

/// External services the pipeline delegates to
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn SettingsProvider>,
    pub registrar: Arc<dyn BotRegistrar>,
    pub scaffolder: Arc<dyn Scaffolder>,
    pub host: Arc<dyn RepositoryHost>,
    pub platform: Arc<dyn DeploymentPlatform>,
}

/// Bot provisioning orchestrator
///
/// Stateless between runs apart from the collaborators it holds; concurrent
/// runs for different bot names are independent.
pub struct Orchestrator {
    collaborators: Collaborators,
    plan: ProgressPlan,
    template: String,
    branch: String,
}

/// What a step decided for the rest of the run
type StepOutcome = std::result::Result<(), String>;

/// Mutable state of one run
struct RunContext {
    settings: Settings,
    result: PipelineResult,
    state: PipelineState,
    tracker: ProgressTracker,
}

impl RunContext {
    fn begin(&mut self, step: Step) {
        self.transition(step.state());
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state.can_advance_to(next) {
            debug!("Pipeline state {} -> {}", self.state, next);
            self.state = next;
        } else {
            warn!("Ignoring invalid transition {} -> {}", self.state, next);
        }
    }
}

impl Orchestrator {
    /// Creates an orchestrator
    ///
    /// # Arguments
    /// * `collaborators` - Services used by the steps
    /// * `config` - Default template and branch
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        Self {
            collaborators,
            plan: ProgressPlan::default(),
            template: config.template.clone(),
            branch: config.branch.clone(),
        }
    }

    /// Wires the real services from runtime configuration
    ///
    /// Services without credentials are still wired; they report
    /// "not configured" if a run actually reaches them.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let http = config.http_client()?;

        let host = match &config.github_token {
            Some(token) => GitHubHost::new(
                GitHubClient::with_client(&config.github_api_url, token, http.clone()),
                token,
            ),
            None => GitHubHost::unconfigured(),
        };

        let platform = match (&config.coolify_url, &config.coolify_token) {
            (Some(url), Some(token)) => CoolifyPlatform::new(
                CoolifyClient::with_client(url, token, http),
                &config.build_pack,
                &config.ports_exposes,
            ),
            _ => CoolifyPlatform::unconfigured(),
        };

        let collaborators = Collaborators {
            settings: Arc::new(config.settings_provider()?),
            registrar: Arc::new(UnconfiguredRegistrar::new()),
            scaffolder: Arc::new(CommandScaffolder::new(&config.scaffold_command)),
            host: Arc::new(host),
            platform: Arc::new(platform),
        };

        Ok(Self::new(collaborators, config))
    }

    /// Replaces the progress partition
    pub fn with_progress_plan(mut self, plan: ProgressPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Provisions one bot
    ///
    /// Always returns a result describing how far the run got; `success()` is
    /// false iff some step failed fatally.
    pub async fn run(&self, options: &PipelineOptions) -> PipelineResult {
        let mut ctx = RunContext {
            settings: Settings::default(),
            result: PipelineResult::new(),
            state: PipelineState::Idle,
            tracker: ProgressTracker::new(options.progress.clone(), self.plan),
        };

        if options.bot_name.trim().is_empty() {
            error!("Refusing to provision a bot without a name");
            ctx.result.record_error("Bot name cannot be empty");
            ctx.transition(PipelineState::Failed);
            return ctx.result;
        }

        info!("Provisioning bot '{}'", options.bot_name);

        match self.collaborators.settings.get().await {
            Ok(settings) => ctx.settings = settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {:#}", e);
                ctx.result
                    .record_warning(format!("Failed to load settings, using defaults: {:#}", e));
            }
        }

        for step in Step::ALL {
            let outcome = match step {
                Step::Registration => guarded(step, self.register(options, &mut ctx)).await,
                Step::Scaffolding => guarded(step, self.scaffold(options, &mut ctx)).await,
                Step::Repository => guarded(step, self.publish(options, &mut ctx)).await,
                Step::Deployment => guarded(step, self.deploy(options, &mut ctx)).await,
            };

            if let Err(message) = outcome {
                ctx.result.record_error(message);
                ctx.transition(PipelineState::Failed);
                warn!(
                    "Provisioning '{}' stopped at {}: {}",
                    options.bot_name,
                    step,
                    ctx.result.errors().join("; ")
                );
                return ctx.result;
            }
        }

        ctx.transition(PipelineState::Completed);
        ctx.tracker
            .complete(&format!("Bot '{}' provisioned", options.bot_name));
        info!("Provisioned bot '{}'", options.bot_name);

        ctx.result
    }

    // =========================================================================
    // Steps
    // =========================================================================

    async fn register(&self, options: &PipelineOptions, ctx: &mut RunContext) -> StepOutcome {
        let supplied = options
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(token) = supplied {
            ctx.result.record_bot_token(token);
            if !options.skip_registration {
                ctx.begin(Step::Registration);
                ctx.tracker
                    .step(Step::Registration)
                    .update(100, "Using provided bot token");
            }
            debug!("Using pre-supplied bot token, registration not contacted");
            return Ok(());
        }

        if options.skip_registration {
            debug!("Registration skipped");
            return Ok(());
        }

        ctx.begin(Step::Registration);
        let registrar = &self.collaborators.registrar;
        let progress = ctx.tracker.step(Step::Registration);

        progress.update(0, "Opening session");
        registrar.init().await.map_err(|e| failure(Step::Registration, e))?;

        let request = CreateBot {
            name: options.bot_name.clone(),
            description: options.description.clone(),
        };
        let bot = match registrar.create_bot(&request, &progress.phase(10, 90)).await {
            Ok(bot) => bot,
            Err(e) => {
                if let Err(close) = registrar.disconnect().await {
                    warn!("Session left open after failed registration: {}", close);
                }
                return Err(failure(Step::Registration, e));
            }
        };

        info!("Registered bot @{}", bot.username);
        let username = bot.username.clone();
        ctx.result.record_bot_token(bot.token);
        ctx.result.record_bot_username(bot.username);

        if let Err(e) = registrar.disconnect().await {
            warn!("Failed to close registration session: {}", e);
            ctx.result.record_warning(e.to_string());
        }

        progress.update(100, &format!("Registered @{}", username));
        Ok(())
    }

    async fn scaffold(&self, options: &PipelineOptions, ctx: &mut RunContext) -> StepOutcome {
        ctx.begin(Step::Scaffolding);
        let progress = ctx.tracker.step(Step::Scaffolding);

        let parent_dir = match &options.target_path {
            Some(path) => path.clone(),
            None => std::env::current_dir()
                .map_err(|e| format!("Failed to resolve working directory: {}", e))?,
        };
        let target_dir = parent_dir.join(&options.bot_name);

        progress.update(0, &format!("Preparing {}", target_dir.display()));
        match tokio::fs::try_exists(&target_dir).await {
            Ok(false) => {}
            Ok(true) => {
                return Err(failure(
                    Step::Scaffolding,
                    ScaffoldError::DirectoryExists(target_dir),
                ));
            }
            Err(e) => {
                return Err(failure(
                    Step::Scaffolding,
                    ScaffoldError::TargetUnreadable {
                        path: target_dir,
                        message: e.to_string(),
                    },
                ));
            }
        }

        let request = ScaffoldRequest {
            name: options.bot_name.clone(),
            template: options.template.clone().unwrap_or_else(|| self.template.clone()),
            parent_dir,
            target_dir,
        };
        let path = self
            .collaborators
            .scaffolder
            .scaffold(&request, &progress)
            .await
            .map_err(|e| failure(Step::Scaffolding, e))?;

        ctx.result.record_project_path(path);
        Ok(())
    }

    async fn publish(&self, options: &PipelineOptions, ctx: &mut RunContext) -> StepOutcome {
        if !options.create_repository {
            debug!("Repository creation disabled");
            return Ok(());
        }
        let Some(path) = ctx.result.project_path().map(Path::to_path_buf) else {
            debug!("No project path, skipping repository creation");
            return Ok(());
        };

        ctx.begin(Step::Repository);
        let host = &self.collaborators.host;
        let progress = ctx.tracker.step(Step::Repository);

        progress.update(0, "Connecting");
        host.init().await.map_err(|e| failure(Step::Repository, e))?;

        let request = CreateRepo {
            name: options.bot_name.clone(),
            description: options.description.clone(),
            private: ctx.settings.github.private,
            owner: options
                .organization
                .clone()
                .or_else(|| ctx.settings.github.default_org.clone()),
        };
        let repo = host
            .create_repo(&request, &progress.phase(5, 30))
            .await
            .map_err(|e| failure(Step::Repository, e))?;

        let clone_url = repo
            .clone_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| failure(Step::Repository, RepositoryError::NoCloneUrl))?;

        host.push_to_repo(&clone_url, &path, &self.branch, &progress.phase(30, 100))
            .await
            .map_err(|e| failure(Step::Repository, e))?;

        ctx.result
            .record_github_repo_url(repo.html_url.unwrap_or(clone_url));
        Ok(())
    }

    async fn deploy(&self, options: &PipelineOptions, ctx: &mut RunContext) -> StepOutcome {
        if !options.deploy_to_platform {
            debug!("Deployment disabled");
            return Ok(());
        }
        let Some(repo_url) = ctx.result.github_repo_url().map(str::to_string) else {
            debug!("No repository URL, skipping deployment");
            return Ok(());
        };

        ctx.begin(Step::Deployment);

        let defaults = &ctx.settings.coolify;
        let server = options.server_uuid.clone().or_else(|| defaults.server_uuid.clone());
        let destination = options
            .destination_uuid
            .clone()
            .or_else(|| defaults.destination_uuid.clone());
        let project = options.project_uuid.clone().or_else(|| defaults.project_uuid.clone());
        let environment = options
            .environment_uuid
            .clone()
            .or_else(|| defaults.environment_uuid.clone());

        let (Some(server_uuid), Some(destination_uuid)) = (server, destination) else {
            return Err(failure(
                Step::Deployment,
                DeploymentError::NotConfigured("server and destination".to_string()),
            ));
        };
        let (Some(project_uuid), Some(environment_uuid)) = (project, environment) else {
            return Err(failure(
                Step::Deployment,
                DeploymentError::NotConfigured("project and environment".to_string()),
            ));
        };

        let private = ctx.settings.github.private;
        let github_app_uuid = defaults.github_app_uuid.clone();
        if private && github_app_uuid.is_none() {
            return Err(failure(Step::Deployment, DeploymentError::PrivateRepository));
        }

        let platform = &self.collaborators.platform;
        let progress = ctx.tracker.step(Step::Deployment);

        progress.update(0, "Connecting");
        platform.init().await.map_err(|e| failure(Step::Deployment, e))?;

        let request = CreateApplication {
            name: options.bot_name.clone(),
            description: options.description.clone(),
            server_uuid,
            destination_uuid,
            project_uuid,
            environment_uuid,
            repo_url,
            branch: self.branch.clone(),
            private,
            github_app_uuid,
        };
        let app = platform
            .create_application(&request, &progress.phase(5, 40))
            .await
            .map_err(|e| failure(Step::Deployment, e))?;

        let uuid = app
            .uuid
            .clone()
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| failure(Step::Deployment, DeploymentError::NoApplicationUuid))?;

        if let Some(token) = ctx.result.bot_token().map(str::to_string) {
            progress.update(45, "Setting environment variables");
            let vars = BTreeMap::from([(BOT_TOKEN_ENV.to_string(), token)]);
            if let Err(e) = platform.set_environment_variables(&uuid, &vars).await {
                warn!("Continuing without {} on {}: {}", BOT_TOKEN_ENV, uuid, e);
                ctx.result.record_warning(e.to_string());
            }
        }

        let deployment = platform
            .deploy(&DeployRequest { uuid: uuid.clone() }, &progress.phase(50, 100))
            .await
            .map_err(|e| {
                warn!("Application {} was created but never deployed", uuid);
                failure(Step::Deployment, e)
            })?;

        ctx.result.record_coolify_app_uuid(uuid);
        if let Some(url) = deployment.url.or(app.url) {
            ctx.result.record_deployment_url(url);
        }
        Ok(())
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("plan", &self.plan)
            .field("template", &self.template)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Failure handling
// =============================================================================

/// Step failures carrying a machine-readable code
trait Coded: fmt::Display {
    fn code(&self) -> &'static str;
}

impl Coded for RegistrationError {
    fn code(&self) -> &'static str {
        RegistrationError::code(self)
    }
}

impl Coded for ScaffoldError {
    fn code(&self) -> &'static str {
        ScaffoldError::code(self)
    }
}

impl Coded for RepositoryError {
    fn code(&self) -> &'static str {
        RepositoryError::code(self)
    }
}

impl Coded for DeploymentError {
    fn code(&self) -> &'static str {
        DeploymentError::code(self)
    }
}

/// Logs a step failure with its code and returns the message for the result
fn failure(step: Step, err: impl Coded) -> String {
    error!("{} failed [{}]: {}", step, err.code(), err);
    err.to_string()
}

/// Runs a step, converting a panic into a fatal failure
async fn guarded<F>(step: Step, fut: F) -> StepOutcome
where
    F: Future<Output = StepOutcome>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = format!("Unexpected failure during {}: {}", step, panic_message(&*panic));
            error!("{}", message);
            Err(message)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
