//! Create command handler
//!
//! Runs the provisioning pipeline and renders its progress and result.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::*;
use hatch_core::domain::options::{PipelineOptions, validate_bot_name};
use hatch_core::error::BotNameError;
use hatch_core::domain::progress::ProgressEvent;
use hatch_core::domain::result::PipelineResult;
use hatch_orchestrator::{Config, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Arguments of `hatch create`
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Bot name, also used as directory and repository name
    #[arg(value_parser = parse_bot_name)]
    pub name: String,

    /// Short description of the bot
    #[arg(short, long)]
    pub description: Option<String>,

    /// Create a GitHub repository and push the project
    #[arg(long)]
    pub repo: bool,

    /// Deploy to Coolify (requires --repo)
    #[arg(long)]
    pub deploy: bool,

    /// Do not register a bot with BotFather
    #[arg(long)]
    pub skip_registration: bool,

    /// Use an existing bot token instead of registering
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// GitHub organization (default: github.default_org)
    #[arg(long)]
    pub org: Option<String>,

    /// Coolify server UUID
    #[arg(long)]
    pub server: Option<String>,

    /// Coolify destination UUID
    #[arg(long)]
    pub destination: Option<String>,

    /// Coolify project UUID
    #[arg(long)]
    pub project: Option<String>,

    /// Coolify environment UUID
    #[arg(long)]
    pub environment: Option<String>,

    /// Parent directory for the generated project (default: current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Template identifier passed to the generator
    #[arg(short, long)]
    pub template: Option<String>,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl CreateArgs {
    fn into_options(self) -> PipelineOptions {
        let mut options = PipelineOptions::new(self.name)
            .with_repository(self.repo)
            .with_deployment(self.deploy);

        options.description = self.description;
        options.skip_registration = self.skip_registration;
        options.bot_token = self.bot_token;
        options.organization = self.org;
        options.server_uuid = self.server;
        options.destination_uuid = self.destination;
        options.project_uuid = self.project;
        options.environment_uuid = self.environment;
        options.target_path = self.path;
        options.template = self.template;
        options
    }
}

fn parse_bot_name(name: &str) -> std::result::Result<String, BotNameError> {
    validate_bot_name(name)?;
    Ok(name.to_string())
}

/// Handle `hatch create`
///
/// Exits with status 1 when any step failed.
///
/// # Arguments
/// * `args` - Parsed command arguments
/// * `config` - The runtime configuration
pub async fn handle_create_command(args: CreateArgs, config: &Config) -> Result<()> {
    if args.deploy && !args.repo {
        println!(
            "{}",
            "⚠ --deploy has no effect without --repo: deployment needs a repository".yellow()
        );
    }

    let json = args.json;
    let orchestrator =
        Orchestrator::from_config(config).context("Failed to initialize the pipeline")?;

    let mut options = args.into_options();
    if !json {
        options = options.with_progress(Arc::new(print_progress));
        println!("{}", format!("Provisioning {}", options.bot_name).bold());
        println!("{}", "─".repeat(80).dimmed());
    }

    debug!("Running pipeline with {:?}", options);
    let result = orchestrator.run(&options).await;

    if json {
        let rendered =
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", rendered);
    } else {
        println!("{}", "─".repeat(80).dimmed());
        print_result(&options.bot_name, &result);
    }

    if !result.success() {
        std::process::exit(1);
    }

    Ok(())
}

/// Print a progress event as one timestamped line
fn print_progress(event: ProgressEvent) {
    println!(
        "{} {} {}",
        Local::now().format("%H:%M:%S").to_string().dimmed(),
        format!("{:>3}%", event.percent).cyan(),
        event.message
    );
}

/// Print the run summary
fn print_result(name: &str, result: &PipelineResult) {
    if result.success() {
        println!("{} {}", "✓".green(), format!("Bot '{}' is ready", name).bold());
    } else {
        println!("{} {}", "✗".red(), format!("Provisioning '{}' failed", name).bold());
    }

    if let Some(token) = result.bot_token() {
        println!("  Token:       {}", mask_token(token).dimmed());
    }
    if let Some(username) = result.bot_username() {
        println!("  Username:    {}", format!("@{}", username).cyan());
    }
    if let Some(path) = result.project_path() {
        println!("  Project:     {}", path.display());
    }
    if let Some(url) = result.github_repo_url() {
        println!("  Repository:  {}", url.cyan());
    }
    if let Some(uuid) = result.coolify_app_uuid() {
        println!("  Application: {}", uuid.dimmed());
    }
    if let Some(url) = result.deployment_url() {
        println!("  URL:         {}", url.cyan());
    }

    if !result.warnings().is_empty() {
        println!("\n{}", "Warnings:".bold());
        for warning in result.warnings() {
            println!("  {} {}", "⚠".yellow(), warning.yellow());
        }
    }

    if !result.errors().is_empty() {
        println!("\n{}", "Errors:".bold());
        for error in result.errors() {
            println!("  {} {}", "✗".red(), error.red());
        }
    }
}

/// Keep the bot id, hide the secret half of a `<id>:<secret>` token
fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) => format!("{}:****", id),
        None => "****".to_string(),
    }
}
