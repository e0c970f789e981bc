//! Scaffolding service
//!
//! Generates a bot project from a template by running an external generator
//! command. Success is exit code zero followed by the target directory
//! existing; any other outcome is a typed failure carrying the generator's
//! error stream.

use async_trait::async_trait;
use hatch_core::domain::progress::{ProgressEvent, ProgressSink};
use hatch_core::error::ScaffoldError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Longest stderr excerpt carried in a failure message
const MAX_STDERR_LEN: usize = 2000;

/// One generator invocation
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
    /// Project name, also the generated directory's name
    pub name: String,
    /// Template identifier handed to the generator
    pub template: String,
    /// Directory the generator runs in
    pub parent_dir: PathBuf,
    /// Directory the generator is expected to create
    pub target_dir: PathBuf,
}

/// Service trait for project generation
#[async_trait]
pub trait Scaffolder: Send + Sync {
    /// Generates a project
    ///
    /// # Arguments
    /// * `request` - What to generate and where
    /// * `progress` - Sink for local `0..=100` progress
    async fn scaffold(
        &self,
        request: &ScaffoldRequest,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf, ScaffoldError>;
}

/// Scaffolder that shells out to a template generator
///
/// The command line is split on whitespace; `{template}` and `{name}` are
/// substituted per argument, so substituted values may contain spaces.
#[derive(Debug, Clone)]
pub struct CommandScaffolder {
    command: String,
}

impl CommandScaffolder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn build_args(&self, request: &ScaffoldRequest) -> Result<(String, Vec<String>), ScaffoldError> {
        let mut parts = self.command.split_whitespace().map(|part| {
            part.replace("{template}", &request.template)
                .replace("{name}", &request.name)
        });

        let program = parts
            .next()
            .ok_or_else(|| ScaffoldError::Spawn("generator command is empty".to_string()))?;

        Ok((program, parts.collect()))
    }
}

#[async_trait]
impl Scaffolder for CommandScaffolder {
    async fn scaffold(
        &self,
        request: &ScaffoldRequest,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf, ScaffoldError> {
        let (program, args) = self.build_args(request)?;

        tokio::fs::create_dir_all(&request.parent_dir)
            .await
            .map_err(|e| {
                ScaffoldError::Spawn(format!(
                    "cannot create {}: {}",
                    request.parent_dir.display(),
                    e
                ))
            })?;

        progress.report(ProgressEvent::new(
            10,
            format!("Generating {} from {}", request.name, request.template),
            None,
        ));
        debug!("Running {} {:?} in {}", program, args, request.parent_dir.display());

        let output = Command::new(&program)
            .args(&args)
            .current_dir(&request.parent_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ScaffoldError::Spawn(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(ScaffoldError::GeneratorFailed {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: truncate(stderr, MAX_STDERR_LEN),
            });
        }

        progress.report(ProgressEvent::new(90, "Verifying generated project", None));
        if !tokio::fs::try_exists(&request.target_dir)
            .await
            .unwrap_or(false)
        {
            return Err(ScaffoldError::MissingOutput(request.target_dir.clone()));
        }

        info!("Scaffolded {}", request.target_dir.display());
        progress.report(ProgressEvent::new(100, "Project generated", None));
        Ok(request.target_dir.clone())
    }
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("...");
    text
}
