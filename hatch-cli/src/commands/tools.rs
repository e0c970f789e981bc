//! Tool command handlers
//!
//! Lists the agent tool definitions and calls them with raw JSON input.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use hatch_orchestrator::tools::{execute_tool, tool_definitions};
use hatch_orchestrator::{Config, Orchestrator};
use serde_json::Value;

/// Tool subcommands
#[derive(Subcommand)]
pub enum ToolCommands {
    /// List available tools
    List {
        /// Also print each input schema
        #[arg(short, long)]
        schema: bool,
    },
    /// Call a tool with JSON input
    Call {
        /// Tool name
        name: String,
        /// JSON object (e.g. '{"botName": "demo"}')
        input: String,
    },
}

/// Handle tool commands
///
/// # Arguments
/// * `command` - The tool command to execute
/// * `config` - The runtime configuration
pub async fn handle_tool_command(command: ToolCommands, config: &Config) -> Result<()> {
    match command {
        ToolCommands::List { schema } => list_tools(schema),
        ToolCommands::Call { name, input } => call_tool(config, &name, &input).await,
    }
}

fn list_tools(schema: bool) -> Result<()> {
    for tool in tool_definitions() {
        println!("  {} {}", "▸".cyan(), tool.name.bold());
        println!("    {}", tool.description.dimmed());
        if schema {
            println!("{}", serde_json::to_string_pretty(&tool.input_schema)?);
        }
        println!();
    }

    Ok(())
}

/// Call a tool and print its JSON result; exits with status 1 on failure
async fn call_tool(config: &Config, name: &str, input: &str) -> Result<()> {
    let input: Value = serde_json::from_str(input).context("Tool input is not valid JSON")?;
    let orchestrator =
        Orchestrator::from_config(config).context("Failed to initialize the pipeline")?;

    let output = execute_tool(&orchestrator, name, &input).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    if output["success"] == Value::Bool(false) {
        std::process::exit(1);
    }

    Ok(())
}
