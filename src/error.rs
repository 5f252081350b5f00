//! Error types for pr-deck

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the gateway, the tool server and the UI controller
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub API returned an error or could not be reached
    #[error("{0}")]
    GitHubApi(String),

    /// A tool or operation received an invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A tool name that is not registered
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A resource URI that is not registered
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// The UI document could not be read
    #[error("failed to read UI document {}: {source}", path.display())]
    UiDocument {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The host returned a tool result that could not be understood
    #[error("{0}")]
    ToolResponse(String),

    /// The UI view could not be rendered to HTML
    #[error("failed to render view: {0}")]
    Render(#[from] minijinja::Error),

    /// JSON (de)serialization failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O failure on the transport
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invariant violation inside pr-deck
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(github_error_message(&err))
    }
}

/// Extract the human-readable message from an octocrab error.
///
/// GitHub answers failed requests with a JSON body whose `message` field is
/// what users expect to see ("Merge conflict", "Not Found", ...). Transport
/// and decoding failures fall back to the error's display form.
pub fn github_error_message(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => source.message.clone(),
        other => other.to_string(),
    }
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
