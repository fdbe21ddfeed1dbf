//! Tool catalogue and argument handling for the email tools.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::types::{ToolDefinition, INTERNAL_ERROR, INVALID_PARAMS};
use crate::assistant::{EmailAssistant, UpstreamError};
use crate::prompts::BulletPoints;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ToolError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) | ToolError::UnknownTool(_) => INVALID_PARAMS,
            ToolError::Upstream(_) => INTERNAL_ERROR,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DraftParams {
    email_draft: String,
}

#[derive(Debug, Deserialize)]
struct RewriteParams {
    email_draft: String,
    target_tone: String,
}

#[derive(Debug, Deserialize)]
struct ExpandParams {
    bullet_points: BulletPoints,
    goal: String,
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    // Clients may omit `arguments` entirely for no-arg tools; treat that as `{}`.
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "validate",
            description: "Returns the server owner's phone number for host validation.",
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "analyze_email_tone",
            description: "Analyzes the tone of a draft email and provides feedback.",
            input_schema: json!({
                "type": "object",
                "required": ["email_draft"],
                "properties": {
                    "email_draft": {"type": "string", "description": "The user's draft email text."}
                }
            }),
        },
        ToolDefinition {
            name: "rewrite_email",
            description: "Rewrites an email draft to match a specific target tone.",
            input_schema: json!({
                "type": "object",
                "required": ["email_draft", "target_tone"],
                "properties": {
                    "email_draft": {"type": "string", "description": "The email draft to rewrite."},
                    "target_tone": {
                        "type": "string",
                        "description": "The desired tone (e.g., Formal, Confident, Friendly)."
                    }
                }
            }),
        },
        ToolDefinition {
            name: "shorten_email",
            description: "Shortens an email draft to make it more concise.",
            input_schema: json!({
                "type": "object",
                "required": ["email_draft"],
                "properties": {
                    "email_draft": {"type": "string", "description": "The email draft to be shortened."}
                }
            }),
        },
        ToolDefinition {
            name: "expand_from_bullets",
            description: "Expands a list of bullet points into a full, well-formatted email.",
            input_schema: json!({
                "type": "object",
                "required": ["bullet_points", "goal"],
                "properties": {
                    "bullet_points": {
                        "description": "A list of bullet points or short notes.",
                        "oneOf": [
                            {"type": "string"},
                            {"type": "array", "items": {"type": "string"}}
                        ]
                    },
                    "goal": {
                        "type": "string",
                        "description": "The overall goal or context of the email (e.g., 'a project update to my manager')."
                    }
                }
            }),
        },
    ]
}

/// Run a tool by name and return its text output.
pub async fn call_tool(
    assistant: &EmailAssistant,
    name: &str,
    arguments: Value,
) -> Result<String, ToolError> {
    match name {
        "validate" => Ok(assistant.validate()),
        "analyze_email_tone" => {
            let params: DraftParams = parse(arguments)?;
            Ok(assistant.analyze_email_tone(&params.email_draft).await?)
        }
        "rewrite_email" => {
            let params: RewriteParams = parse(arguments)?;
            Ok(assistant
                .rewrite_email(&params.email_draft, &params.target_tone)
                .await?)
        }
        "shorten_email" => {
            let params: DraftParams = parse(arguments)?;
            Ok(assistant.shorten_email(&params.email_draft).await?)
        }
        "expand_from_bullets" => {
            let params: ExpandParams = parse(arguments)?;
            Ok(assistant
                .expand_from_bullets(&params.bullet_points, Some(&params.goal))
                .await?)
        }
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}
