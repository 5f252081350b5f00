//! Tool registry and dispatch

use super::Gateway;
use super::resource::UI_RESOURCE_URI;
use crate::error::{Error, Result};
use crate::types::MergeMethod;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Tool that reports the open PR count and opens the UI
pub const TOOL_SHOW_PULL_REQUESTS: &str = "show_pull_requests";
/// Tool returning the open PR list as JSON text
pub const TOOL_LIST_PULL_REQUESTS: &str = "list_pull_requests";
/// Tool merging one PR
pub const TOOL_MERGE_PULL_REQUEST: &str = "merge_pull_request";

/// Metadata a host needs to present and call a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Name hosts call the tool by
    pub name: String,
    /// Human title
    pub title: String,
    /// What the tool does
    pub description: String,
    /// JSON schema of the arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// JSON schema of `structuredContent`, when the tool returns any
    #[serde(rename = "outputSchema", default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Host-specific metadata (UI resource link)
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

fn repo_properties(owner_help: &str) -> Value {
    json!({
        "owner": { "type": "string", "description": owner_help },
        "repo": { "type": "string", "description": "Repository name" },
    })
}

/// All registered tools, in registration order
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    let show = ToolDescriptor {
        name: TOOL_SHOW_PULL_REQUESTS.into(),
        title: "Show Pull Requests".into(),
        description:
            "Display a list of open pull requests for a GitHub repository with merge buttons."
                .into(),
        input_schema: json!({
            "type": "object",
            "properties": repo_properties("Repository owner (username or organization)"),
            "required": ["owner", "repo"],
        }),
        output_schema: Some(json!({
            "type": "object",
            "properties": {
                "success": { "type": "boolean" },
                "count": { "type": "number" },
            },
            "required": ["success", "count"],
        })),
        meta: Some(json!({ "ui": { "resourceUri": UI_RESOURCE_URI } })),
    };

    let list = ToolDescriptor {
        name: TOOL_LIST_PULL_REQUESTS.into(),
        title: "List Pull Requests".into(),
        description: "Get a list of open pull requests for a repository".into(),
        input_schema: json!({
            "type": "object",
            "properties": repo_properties("Repository owner"),
            "required": ["owner", "repo"],
        }),
        output_schema: None,
        meta: None,
    };

    let mut merge_properties = repo_properties("Repository owner");
    merge_properties["pull_number"] = json!({
        "type": "number",
        "description": "Pull request number",
    });
    merge_properties["merge_method"] = json!({
        "type": "string",
        "enum": ["merge", "squash", "rebase"],
        "default": "merge",
        "description": "Merge method",
    });
    let merge = ToolDescriptor {
        name: TOOL_MERGE_PULL_REQUEST.into(),
        title: "Merge Pull Request".into(),
        description: "Merge a pull request".into(),
        input_schema: json!({
            "type": "object",
            "properties": merge_properties,
            "required": ["owner", "repo", "pull_number"],
        }),
        output_schema: None,
        meta: None,
    };

    vec![show, list, merge]
}

// =============================================================================
// Tool results
// =============================================================================

/// One content block of a tool result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// Any block kind pr-deck does not produce (images, links, ...)
    #[serde(other)]
    Unsupported,
}

/// Result of a tool call as returned to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Content blocks
    pub content: Vec<Content>,
    /// Machine-readable result matching the tool's output schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    /// Set when the tool itself failed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Successful result with one text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            structured_content: None,
            is_error: false,
        }
    }

    /// Failed result carrying the error description
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    /// Attach structured content
    #[must_use]
    pub fn with_structured(mut self, value: Value) -> Self {
        self.structured_content = Some(value);
        self
    }

    /// First text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            Content::Text { text } => Some(text.as_str()),
            Content::Unsupported => None,
        })
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Arguments of the list and show tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListArgs {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Arguments of `merge_pull_request`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeArgs {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pull_number: u64,
    /// Merge method, `merge` when omitted
    #[serde(default)]
    pub merge_method: MergeMethod,
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    // Hosts send `null` or omit arguments entirely for argument-less calls
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| Error::InvalidArgument(format!("{tool}: {e}")))
}

pub(super) async fn call_tool(
    gateway: &Gateway,
    name: &str,
    arguments: Value,
) -> Result<CallToolResult> {
    debug!(tool = name, "calling tool");
    match name {
        TOOL_SHOW_PULL_REQUESTS => {
            let args: ListArgs = parse_args(name, arguments)?;
            Ok(
                match gateway.show_pull_requests(&args.owner, &args.repo).await {
                    Ok(count) => CallToolResult::text(format!(
                        "Found {count} open pull request(s) for {}/{}",
                        args.owner, args.repo
                    ))
                    .with_structured(json!({ "success": true, "count": count })),
                    Err(e) => {
                        warn!(tool = name, error = %e, "tool failed");
                        CallToolResult::error(e.to_string())
                    }
                },
            )
        }
        TOOL_LIST_PULL_REQUESTS => {
            let args: ListArgs = parse_args(name, arguments)?;
            match gateway
                .enumerate_open_pull_requests(&args.owner, &args.repo)
                .await
            {
                Ok(prs) => Ok(CallToolResult::text(serde_json::to_string_pretty(&prs)?)),
                Err(e) => {
                    warn!(tool = name, error = %e, "tool failed");
                    Ok(CallToolResult::error(e.to_string()))
                }
            }
        }
        TOOL_MERGE_PULL_REQUEST => {
            let args: MergeArgs = parse_args(name, arguments)?;
            let outcome = gateway
                .merge_pull_request(&args.owner, &args.repo, args.pull_number, args.merge_method)
                .await;
            Ok(CallToolResult::text(serde_json::to_string(&outcome)?))
        }
        other => Err(Error::UnknownTool(other.to_string())),
    }
}
