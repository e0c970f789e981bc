use super::*;
use crate::repository::StaticSettings;
use crate::service::Slice;
use async_trait::async_trait;
use hatch_core::domain::progress::{ProgressEvent, ProgressSink};
use hatch_core::domain::step::StepTag;
use hatch_core::dto::application::{CreatedApplication, Deployment};
use hatch_core::dto::bot::RegisteredBot;
use hatch_core::dto::repository::CreatedRepo;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

// =============================================================================
// Fakes
// =============================================================================

/// Ordered record of collaborator calls shared by every fake in a run
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct FakeRegistrar {
    journal: Journal,
    fail_init: bool,
    fail_create: bool,
    fail_disconnect: bool,
}

#[async_trait]
impl BotRegistrar for FakeRegistrar {
    async fn init(&self) -> std::result::Result<(), RegistrationError> {
        self.journal.push("registrar.init");
        if self.fail_init {
            return Err(RegistrationError::Session("phone number not authorized".to_string()));
        }
        Ok(())
    }

    async fn create_bot(
        &self,
        request: &CreateBot,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<RegisteredBot, RegistrationError> {
        self.journal.push("registrar.create_bot");
        progress.report(ProgressEvent::new(50, "Talking to BotFather", None));
        if self.fail_create {
            return Err(RegistrationError::CreateBot("username is taken".to_string()));
        }
        Ok(RegisteredBot {
            token: "123456:ABC".to_string(),
            username: format!("{}_bot", request.name),
        })
    }

    async fn disconnect(&self) -> std::result::Result<(), RegistrationError> {
        self.journal.push("registrar.disconnect");
        if self.fail_disconnect {
            return Err(RegistrationError::Disconnect("connection reset".to_string()));
        }
        Ok(())
    }
}

#[derive(Default, Clone, Copy)]
enum ScaffoldBehavior {
    #[default]
    Create,
    Fail,
    Panic,
}

#[derive(Default)]
struct FakeScaffolder {
    journal: Journal,
    behavior: ScaffoldBehavior,
}

#[async_trait]
impl Scaffolder for FakeScaffolder {
    async fn scaffold(
        &self,
        request: &ScaffoldRequest,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<PathBuf, ScaffoldError> {
        self.journal.push("scaffolder.scaffold");
        match self.behavior {
            ScaffoldBehavior::Create => {
                progress.report(ProgressEvent::new(20, "Generating", None));
                std::fs::create_dir_all(&request.target_dir).unwrap();
                progress.report(ProgressEvent::new(100, "Generated", None));
                Ok(request.target_dir.clone())
            }
            ScaffoldBehavior::Fail => Err(ScaffoldError::GeneratorFailed {
                exit_code: 1,
                stderr: "template not found".to_string(),
            }),
            ScaffoldBehavior::Panic => panic!("generator exploded"),
        }
    }
}

struct FakeHost {
    journal: Journal,
    clone_url: Option<String>,
    html_url: Option<String>,
    fail_push: bool,
    requests: Mutex<Vec<CreateRepo>>,
}

impl FakeHost {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            clone_url: Some("https://github.com/acme/demo.git".to_string()),
            html_url: Some("https://github.com/acme/demo".to_string()),
            fail_push: false,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RepositoryHost for FakeHost {
    async fn init(&self) -> std::result::Result<(), RepositoryError> {
        self.journal.push("host.init");
        Ok(())
    }

    async fn create_repo(
        &self,
        request: &CreateRepo,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<CreatedRepo, RepositoryError> {
        self.journal.push("host.create_repo");
        self.requests.lock().unwrap().push(request.clone());
        progress.report(ProgressEvent::new(100, "Repository created", None));
        Ok(CreatedRepo {
            full_name: Some(format!("acme/{}", request.name)),
            clone_url: self.clone_url.clone(),
            html_url: self.html_url.clone(),
        })
    }

    async fn push_to_repo(
        &self,
        _clone_url: &str,
        path: &Path,
        _branch: &str,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<(), RepositoryError> {
        self.journal.push("host.push_to_repo");
        assert!(path.is_dir());
        progress.report(ProgressEvent::new(0, "Pushing", None));
        if self.fail_push {
            return Err(RepositoryError::Push("remote rejected".to_string()));
        }
        progress.report(ProgressEvent::new(100, "Pushed", None));
        Ok(())
    }
}

struct FakePlatform {
    journal: Journal,
    app_uuid: Option<String>,
    app_url: Option<String>,
    deployment_url: Option<String>,
    fail_env: bool,
    fail_deploy: bool,
    applications: Mutex<Vec<CreateApplication>>,
    env_vars: Mutex<Vec<BTreeMap<String, String>>>,
}

impl FakePlatform {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            app_uuid: Some("app-1".to_string()),
            app_url: Some("https://demo.apps.local".to_string()),
            deployment_url: Some("https://demo.deploy.local".to_string()),
            fail_env: false,
            fail_deploy: false,
            applications: Mutex::new(Vec::new()),
            env_vars: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeploymentPlatform for FakePlatform {
    async fn init(&self) -> std::result::Result<(), DeploymentError> {
        self.journal.push("platform.init");
        Ok(())
    }

    async fn create_application(
        &self,
        request: &CreateApplication,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<CreatedApplication, DeploymentError> {
        self.journal.push("platform.create_application");
        self.applications.lock().unwrap().push(request.clone());
        progress.report(ProgressEvent::new(100, "Application created", None));
        Ok(CreatedApplication {
            uuid: self.app_uuid.clone(),
            url: self.app_url.clone(),
        })
    }

    async fn set_environment_variables(
        &self,
        _uuid: &str,
        vars: &BTreeMap<String, String>,
    ) -> std::result::Result<(), DeploymentError> {
        self.journal.push("platform.set_environment_variables");
        self.env_vars.lock().unwrap().push(vars.clone());
        if self.fail_env {
            return Err(DeploymentError::EnvironmentVariables("403 forbidden".to_string()));
        }
        Ok(())
    }

    async fn deploy(
        &self,
        _request: &DeployRequest,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<Deployment, DeploymentError> {
        self.journal.push("platform.deploy");
        progress.report(ProgressEvent::new(10, "Queued", None));
        if self.fail_deploy {
            return Err(DeploymentError::Deploy("build server offline".to_string()));
        }
        progress.report(ProgressEvent::new(100, "Deployed", None));
        Ok(Deployment {
            deployment_uuid: Some("dep-1".to_string()),
            url: self.deployment_url.clone(),
        })
    }
}

struct FailingSettings;

#[async_trait]
impl SettingsProvider for FailingSettings {
    async fn get(&self) -> Result<Settings> {
        anyhow::bail!("config.json is not valid JSON")
    }
}

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    journal: Journal,
    dir: TempDir,
    registrar: FakeRegistrar,
    scaffolder: FakeScaffolder,
    host: FakeHost,
    platform: FakePlatform,
    settings: Settings,
    settings_fail: bool,
    plan: Option<ProgressPlan>,
}

struct Outcome {
    result: PipelineResult,
    events: Vec<ProgressEvent>,
    calls: Vec<String>,
    host: Arc<FakeHost>,
    platform: Arc<FakePlatform>,
    dir: TempDir,
}

impl Outcome {
    fn called(&self, prefix: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(prefix))
    }
}

fn complete_settings() -> Settings {
    let mut settings = Settings::default();
    settings.github.default_org = Some("acme".to_string());
    settings.coolify.server_uuid = Some("srv-1".to_string());
    settings.coolify.destination_uuid = Some("dst-1".to_string());
    settings.coolify.project_uuid = Some("prj-1".to_string());
    settings.coolify.environment_uuid = Some("env-1".to_string());
    settings.coolify.github_app_uuid = Some("gha-1".to_string());
    settings
}

impl Harness {
    fn new() -> Self {
        let journal = Journal::default();
        Self {
            dir: tempfile::tempdir().unwrap(),
            registrar: FakeRegistrar {
                journal: journal.clone(),
                ..Default::default()
            },
            scaffolder: FakeScaffolder {
                journal: journal.clone(),
                ..Default::default()
            },
            host: FakeHost::new(journal.clone()),
            platform: FakePlatform::new(journal.clone()),
            journal,
            settings: complete_settings(),
            settings_fail: false,
            plan: None,
        }
    }

    /// Options with every step enabled, generating into the temp dir
    fn options(&self, name: &str) -> PipelineOptions {
        PipelineOptions::new(name)
            .with_repository(true)
            .with_deployment(true)
            .with_target_path(self.dir.path())
    }

    async fn run(self, options: PipelineOptions) -> Outcome {
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = events.clone();
        let options = options.with_progress(Arc::new(move |event: ProgressEvent| {
            captured.lock().unwrap().push(event)
        }));

        let settings: Arc<dyn SettingsProvider> = if self.settings_fail {
            Arc::new(FailingSettings)
        } else {
            Arc::new(StaticSettings(self.settings))
        };
        let host = Arc::new(self.host);
        let platform = Arc::new(self.platform);

        let mut orchestrator = Orchestrator::new(
            Collaborators {
                settings,
                registrar: Arc::new(self.registrar),
                scaffolder: Arc::new(self.scaffolder),
                host: host.clone(),
                platform: platform.clone(),
            },
            &Config::default(),
        );
        if let Some(plan) = self.plan {
            orchestrator = orchestrator.with_progress_plan(plan);
        }

        let result = orchestrator.run(&options).await;
        let events = events.lock().unwrap().clone();

        Outcome {
            result,
            events,
            calls: self.journal.entries(),
            host,
            platform,
            dir: self.dir,
        }
    }
}

fn assert_non_decreasing(events: &[ProgressEvent]) {
    for pair in events.windows(2) {
        assert!(
            pair[0].percent <= pair[1].percent,
            "progress went backwards: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_full_run_populates_every_field() {
    let harness = Harness::new();
    let options = harness.options("demo");
    let outcome = harness.run(options).await;
    let result = &outcome.result;

    assert!(result.success(), "errors: {:?}", result.errors());
    assert!(result.errors().is_empty());
    assert!(result.warnings().is_empty());
    assert_eq!(result.bot_token(), Some("123456:ABC"));
    assert_eq!(result.bot_username(), Some("demo_bot"));
    assert_eq!(result.project_path(), Some(outcome.dir.path().join("demo").as_path()));
    assert_eq!(result.github_repo_url(), Some("https://github.com/acme/demo"));
    assert_eq!(result.coolify_app_uuid(), Some("app-1"));
    assert_eq!(result.deployment_url(), Some("https://demo.deploy.local"));

    assert_eq!(
        outcome.calls,
        vec![
            "registrar.init",
            "registrar.create_bot",
            "registrar.disconnect",
            "scaffolder.scaffold",
            "host.init",
            "host.create_repo",
            "host.push_to_repo",
            "platform.init",
            "platform.create_application",
            "platform.set_environment_variables",
            "platform.deploy",
        ]
    );
}

#[tokio::test]
async fn test_full_run_threads_values_between_steps() {
    let harness = Harness::new();
    let options = harness.options("demo").with_description("Weather bot");
    let outcome = harness.run(options).await;
    assert!(outcome.result.success());

    let repos = outcome.host.requests.lock().unwrap();
    assert_eq!(repos[0].owner.as_deref(), Some("acme"));
    assert!(repos[0].private);
    assert_eq!(repos[0].description.as_deref(), Some("Weather bot"));

    let apps = outcome.platform.applications.lock().unwrap();
    assert_eq!(apps[0].repo_url, "https://github.com/acme/demo");
    assert_eq!(apps[0].server_uuid, "srv-1");
    assert_eq!(apps[0].environment_uuid, "env-1");
    assert_eq!(apps[0].branch, "main");
    assert!(apps[0].private);
    assert_eq!(apps[0].github_app_uuid.as_deref(), Some("gha-1"));

    let vars = outcome.platform.env_vars.lock().unwrap();
    assert_eq!(vars[0].get(BOT_TOKEN_ENV).map(String::as_str), Some("123456:ABC"));
}

#[tokio::test]
async fn test_full_run_progress_is_monotonic_and_ends_at_100() {
    let harness = Harness::new();
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_non_decreasing(&outcome.events);

    let last = outcome.events.last().unwrap();
    assert_eq!(last.percent, 100);
    assert_eq!(last.step, None);

    for tag in [StepTag::Telegram, StepTag::Scaffold, StepTag::GitHub, StepTag::Coolify] {
        let tagged: Vec<_> = outcome.events.iter().filter(|e| e.step == Some(tag)).collect();
        assert!(!tagged.is_empty(), "no events for {}", tag);
        assert!(tagged.iter().all(|e| e.message.starts_with(&tag.to_string())));
    }
}

#[tokio::test]
async fn test_missing_destination_stops_deployment() {
    let mut harness = Harness::new();
    harness.settings.coolify.destination_uuid = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;
    let result = &outcome.result;

    assert!(!result.success());
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].ends_with("server and destination not configured"));
    assert_eq!(result.github_repo_url(), Some("https://github.com/acme/demo"));
    assert_eq!(result.coolify_app_uuid(), None);
    assert_eq!(result.deployment_url(), None);
    assert!(!outcome.called("platform."));
}

#[tokio::test]
async fn test_missing_project_stops_deployment() {
    let mut harness = Harness::new();
    harness.settings.coolify.project_uuid = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert_eq!(
        outcome.result.errors(),
        ["Coolify project and environment not configured".to_string()]
    );
    assert!(!outcome.called("platform."));
}

#[tokio::test]
async fn test_private_repository_without_github_app_stops_deployment() {
    let mut harness = Harness::new();
    harness.settings.coolify.github_app_uuid = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;
    let result = &outcome.result;

    assert!(!result.success());
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].contains("cannot be deployed via public source"));
    assert_eq!(result.github_repo_url(), Some("https://github.com/acme/demo"));
    assert_eq!(result.coolify_app_uuid(), None);
    assert!(!outcome.called("platform."));
}

#[tokio::test]
async fn test_public_repository_deploys_without_github_app() {
    let mut harness = Harness::new();
    harness.settings.github.private = false;
    harness.settings.coolify.github_app_uuid = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert!(!outcome.host.requests.lock().unwrap()[0].private);
    let apps = outcome.platform.applications.lock().unwrap();
    assert!(!apps[0].private);
    assert_eq!(apps[0].github_app_uuid, None);
}

#[tokio::test]
async fn test_overrides_take_precedence_over_settings() {
    let mut harness = Harness::new();
    harness.settings.coolify.server_uuid = None;
    let mut options = harness.options("demo").with_organization("other-org");
    options.server_uuid = Some("srv-override".to_string());
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(
        outcome.host.requests.lock().unwrap()[0].owner.as_deref(),
        Some("other-org")
    );
    assert_eq!(
        outcome.platform.applications.lock().unwrap()[0].server_uuid,
        "srv-override"
    );
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_skip_registration_never_contacts_registrar() {
    let harness = Harness::new();
    let options = harness.options("demo").skipping_registration();
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(outcome.result.bot_token(), None);
    assert_eq!(outcome.result.bot_username(), None);
    assert!(!outcome.called("registrar."));
    assert!(outcome.events.iter().all(|e| e.step != Some(StepTag::Telegram)));
    // No credential, so nothing to set on the application.
    assert!(!outcome.called("platform.set_environment_variables"));
}

#[tokio::test]
async fn test_supplied_token_short_circuits_registration() {
    let harness = Harness::new();
    let options = harness.options("demo").with_bot_token("999:XYZ");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(outcome.result.bot_token(), Some("999:XYZ"));
    assert_eq!(outcome.result.bot_username(), None);
    assert!(!outcome.called("registrar."));

    let vars = outcome.platform.env_vars.lock().unwrap();
    assert_eq!(vars[0].get(BOT_TOKEN_ENV).map(String::as_str), Some("999:XYZ"));
}

#[tokio::test]
async fn test_init_failure_is_fatal() {
    let mut harness = Harness::new();
    harness.registrar.fail_init = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("phone number not authorized"));
    assert_eq!(outcome.calls, vec!["registrar.init"]);
    assert_eq!(outcome.result.project_path(), None);
}

#[tokio::test]
async fn test_create_bot_failure_is_fatal_and_closes_session() {
    let mut harness = Harness::new();
    harness.registrar.fail_create = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("username is taken"));
    assert_eq!(
        outcome.calls,
        vec!["registrar.init", "registrar.create_bot", "registrar.disconnect"]
    );
    assert_eq!(outcome.result.bot_token(), None);
    assert!(!outcome.dir.path().join("demo").exists());
}

#[tokio::test]
async fn test_disconnect_failure_is_a_warning() {
    let mut harness = Harness::new();
    harness.registrar.fail_disconnect = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(outcome.result.bot_token(), Some("123456:ABC"));
    assert_eq!(outcome.result.warnings().len(), 1);
    assert!(outcome.result.warnings()[0].contains("connection reset"));
    assert!(outcome.called("platform.deploy"));
}

// =============================================================================
// Scaffolding
// =============================================================================

#[tokio::test]
async fn test_existing_directory_is_fatal() {
    let harness = Harness::new();
    std::fs::create_dir(harness.dir.path().join("demo")).unwrap();
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("already exists"));
    assert!(!outcome.called("scaffolder."));
    assert!(!outcome.called("host."));
    assert!(!outcome.called("platform."));
    assert_eq!(outcome.result.project_path(), None);
    // Registration had already succeeded.
    assert_eq!(outcome.result.bot_token(), Some("123456:ABC"));
}

#[tokio::test]
async fn test_unreadable_target_is_fatal() {
    let harness = Harness::new();
    let file = harness.dir.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();
    let options = harness.options("demo").with_target_path(&file);
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("Cannot inspect"));
    assert!(!outcome.called("scaffolder."));
    assert!(!outcome.called("host."));
    assert_eq!(outcome.result.project_path(), None);
}

#[tokio::test]
async fn test_generator_failure_is_fatal() {
    let mut harness = Harness::new();
    harness.scaffolder.behavior = ScaffoldBehavior::Fail;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("template not found"));
    assert!(!outcome.called("host."));
}

#[tokio::test]
async fn test_panicking_collaborator_is_recorded() {
    let mut harness = Harness::new();
    harness.scaffolder.behavior = ScaffoldBehavior::Panic;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert_eq!(outcome.result.errors().len(), 1);
    assert!(outcome.result.errors()[0].contains("generator exploded"));
    assert!(outcome.result.errors()[0].contains("scaffolding"));
    assert!(!outcome.called("host."));
}

#[tokio::test]
async fn test_scaffold_only_run() {
    let harness = Harness::new();
    let options = PipelineOptions::new("demo")
        .skipping_registration()
        .with_target_path(harness.dir.path());
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(outcome.calls, vec!["scaffolder.scaffold"]);
    assert!(
        outcome
            .events
            .iter()
            .all(|e| e.step.is_none() || e.step == Some(StepTag::Scaffold))
    );
    assert_eq!(outcome.events.last().unwrap().percent, 100);
}

// =============================================================================
// Repository
// =============================================================================

#[tokio::test]
async fn test_repository_disabled_skips_deployment() {
    let harness = Harness::new();
    let options = harness.options("demo").with_repository(false);
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(outcome.result.github_repo_url(), None);
    assert!(!outcome.called("host."));
    assert!(!outcome.called("platform."));
    assert_eq!(outcome.result.coolify_app_uuid(), None);
}

#[tokio::test]
async fn test_missing_clone_url_is_fatal() {
    let mut harness = Harness::new();
    harness.host.clone_url = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("no clone URL returned"));
    assert!(!outcome.called("host.push_to_repo"));
    assert!(!outcome.called("platform."));
    assert_eq!(outcome.result.github_repo_url(), None);
}

#[tokio::test]
async fn test_push_failure_keeps_partial_result() {
    let mut harness = Harness::new();
    harness.host.fail_push = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("remote rejected"));
    assert_eq!(outcome.result.github_repo_url(), None);
    assert!(outcome.result.project_path().is_some());
    assert_eq!(outcome.result.bot_token(), Some("123456:ABC"));
    assert!(!outcome.called("platform."));
}

#[tokio::test]
async fn test_repo_url_falls_back_to_clone_url() {
    let mut harness = Harness::new();
    harness.host.html_url = None;
    let options = harness.options("demo").with_deployment(false);
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(
        outcome.result.github_repo_url(),
        Some("https://github.com/acme/demo.git")
    );
}

// =============================================================================
// Deployment
// =============================================================================

#[tokio::test]
async fn test_env_var_failure_does_not_block_deploy() {
    let mut harness = Harness::new();
    harness.platform.fail_env = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert!(outcome.called("platform.deploy"));
    assert_eq!(outcome.result.warnings().len(), 1);
    assert!(outcome.result.warnings()[0].contains("403 forbidden"));
    assert_eq!(outcome.result.coolify_app_uuid(), Some("app-1"));
}

#[tokio::test]
async fn test_missing_application_uuid_is_fatal() {
    let mut harness = Harness::new();
    harness.platform.app_uuid = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("no application UUID returned"));
    assert!(!outcome.called("platform.deploy"));
    assert_eq!(outcome.result.github_repo_url(), Some("https://github.com/acme/demo"));
}

#[tokio::test]
async fn test_deploy_failure_is_fatal() {
    let mut harness = Harness::new();
    harness.platform.fail_deploy = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert!(outcome.result.errors()[0].contains("build server offline"));
    assert_eq!(outcome.result.coolify_app_uuid(), None);
    assert_eq!(outcome.result.deployment_url(), None);
    assert_non_decreasing(&outcome.events);
    assert!(outcome.events.last().unwrap().percent < 100);
}

#[tokio::test]
async fn test_deployment_url_falls_back_to_application_url() {
    let mut harness = Harness::new();
    harness.platform.deployment_url = None;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_eq!(outcome.result.deployment_url(), Some("https://demo.apps.local"));
}

// =============================================================================
// Run-level behavior
// =============================================================================

#[test]
fn test_steps_advance_run_state_in_order() {
    let mut ctx = RunContext {
        settings: Settings::default(),
        result: PipelineResult::new(),
        state: PipelineState::Idle,
        tracker: ProgressTracker::new(None, ProgressPlan::default()),
    };

    for step in Step::ALL {
        ctx.begin(step);
        assert_eq!(ctx.state, step.state());
    }

    ctx.begin(Step::Scaffolding);
    assert_eq!(ctx.state, PipelineState::Deploying);

    ctx.transition(PipelineState::Completed);
    assert_eq!(ctx.state, PipelineState::Completed);
}

#[tokio::test]
async fn test_empty_bot_name_is_rejected() {
    let harness = Harness::new();
    let options = harness.options("  ");
    let outcome = harness.run(options).await;

    assert!(!outcome.result.success());
    assert_eq!(outcome.result.errors(), ["Bot name cannot be empty".to_string()]);
    assert!(outcome.calls.is_empty());
    assert!(outcome.events.is_empty());
}

#[tokio::test]
async fn test_settings_failure_falls_back_to_defaults() {
    let mut harness = Harness::new();
    harness.settings_fail = true;
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    // Defaults carry no Coolify identifiers.
    assert!(!outcome.result.success());
    assert!(outcome.result.warnings()[0].contains("Failed to load settings"));
    assert!(outcome.result.errors()[0].contains("not configured"));
    assert_eq!(outcome.host.requests.lock().unwrap()[0].owner, None);
}

#[tokio::test]
async fn test_custom_progress_plan() {
    let mut harness = Harness::new();
    harness.plan = Some(
        ProgressPlan::new([
            Slice::new(0, 10),
            Slice::new(10, 20),
            Slice::new(20, 30),
            Slice::new(30, 100),
        ])
        .unwrap(),
    );
    let options = harness.options("demo");
    let outcome = harness.run(options).await;

    assert!(outcome.result.success());
    assert_non_decreasing(&outcome.events);
    for event in outcome.events.iter().filter(|e| e.step == Some(StepTag::Scaffold)) {
        assert!((10..=20).contains(&event.percent), "{:?}", event);
    }
    assert_eq!(outcome.events.last().unwrap().percent, 100);
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let harness = Harness::new();
    let dir = harness.dir.path().to_path_buf();
    let host = Arc::new(FakeHost::new(harness.journal.clone()));
    let platform = Arc::new(FakePlatform::new(harness.journal.clone()));
    let orchestrator = Orchestrator::new(
        Collaborators {
            settings: Arc::new(StaticSettings(complete_settings())),
            registrar: Arc::new(harness.registrar),
            scaffolder: Arc::new(harness.scaffolder),
            host,
            platform,
        },
        &Config::default(),
    );

    let first = PipelineOptions::new("alpha").with_repository(true).with_target_path(&dir);
    let second = PipelineOptions::new("beta").with_repository(true).with_target_path(&dir);
    let (a, b) = tokio::join!(orchestrator.run(&first), orchestrator.run(&second));

    assert!(a.success() && b.success());
    assert_eq!(a.bot_username(), Some("alpha_bot"));
    assert_eq!(b.bot_username(), Some("beta_bot"));
    assert!(dir.join("alpha").is_dir() && dir.join("beta").is_dir());
}
