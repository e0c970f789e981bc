//! Tool definitions and execution for AI agents.
//!
//! Exposes the pipeline as tool calls: the agent's JSON input is mapped
//! directly onto pipeline options and the serialized result is returned.

use anyhow::{Context, Result};
use hatch_core::domain::options::{PipelineOptions, PipelineRequest, validate_bot_name};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::info;

use crate::pipeline::Orchestrator;

/// A tool the agent may call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScaffoldInput {
    bot_name: String,
    #[serde(default)]
    target_path: Option<PathBuf>,
    #[serde(default)]
    template: Option<String>,
}

/// Execute a tool call and return its JSON result.
///
/// Pipeline failures are part of the returned result, not an `Err`; only
/// unknown tools and malformed input fail. A `botName` that is not a plain
/// directory and repository name counts as malformed.
pub async fn execute_tool(orchestrator: &Orchestrator, tool_name: &str, input: &Value) -> Result<Value> {
    let options = match tool_name {
        "provision_bot" => {
            let request: PipelineRequest = serde_json::from_value(input.clone())
                .context("Invalid provision_bot input")?;
            PipelineOptions::from(request)
        }

        "scaffold_project" => {
            let input: ScaffoldInput = serde_json::from_value(input.clone())
                .context("Invalid scaffold_project input")?;
            let mut options = PipelineOptions::new(input.bot_name).skipping_registration();
            options.target_path = input.target_path;
            options.template = input.template;
            options
        }

        _ => anyhow::bail!("Unknown tool: {tool_name}"),
    };
    validate_bot_name(&options.bot_name)
        .with_context(|| format!("Invalid botName for {tool_name}"))?;

    info!("Tool call {} for '{}'", tool_name, options.bot_name);
    let result = orchestrator.run(&options).await;
    serde_json::to_value(&result).context("Failed to serialize pipeline result")
}

/// Tool definitions for the provisioning agent.
pub fn tool_definitions() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "provision_bot".to_string(),
            description: "Create a Telegram bot end to end: register it with BotFather, generate the project from a template, optionally push it to a new GitHub repository and deploy it on Coolify.".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["botName"],
                "properties": {
                    "botName": {
                        "type": "string",
                        "description": "Bot name, also used as directory and repository name (letters, digits, -, _ and .)"
                    },
                    "description": {
                        "type": "string",
                        "description": "Short description of the bot"
                    },
                    "createRepository": {
                        "type": "boolean",
                        "description": "Create a GitHub repository and push the project (default: false)"
                    },
                    "deployToPlatform": {
                        "type": "boolean",
                        "description": "Deploy to Coolify; requires createRepository (default: false)"
                    },
                    "skipRegistration": {
                        "type": "boolean",
                        "description": "Do not register a bot with BotFather (default: false)"
                    },
                    "botToken": {
                        "type": "string",
                        "description": "Existing bot token; registration is not contacted when set"
                    },
                    "organization": {
                        "type": "string",
                        "description": "GitHub organization owning the repository"
                    },
                    "serverUuid": { "type": "string", "description": "Coolify server UUID" },
                    "destinationUuid": { "type": "string", "description": "Coolify destination UUID" },
                    "projectUuid": { "type": "string", "description": "Coolify project UUID" },
                    "environmentUuid": { "type": "string", "description": "Coolify environment UUID" },
                    "targetPath": {
                        "type": "string",
                        "description": "Parent directory for the generated project"
                    },
                    "template": {
                        "type": "string",
                        "description": "Template identifier passed to the generator"
                    }
                }
            }),
        },
        ToolDef {
            name: "scaffold_project".to_string(),
            description: "Generate a bot project from a template without registering, publishing or deploying it.".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["botName"],
                "properties": {
                    "botName": {
                        "type": "string",
                        "description": "Project directory name (letters, digits, -, _ and .)"
                    },
                    "targetPath": {
                        "type": "string",
                        "description": "Parent directory for the generated project"
                    },
                    "template": {
                        "type": "string",
                        "description": "Template identifier passed to the generator"
                    }
                }
            }),
        },
    ]
}
