//! Core types for pr-deck

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

/// GitHub owner and repository names: letters, digits, `-`, `_` and `.`
static IDENTIFIER_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9_.-]+$").expect("identifier regex is valid")
});

/// A repository on the upstream provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoIdentity {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoIdentity {
    /// Build a validated identity.
    ///
    /// Both parts must be non-empty GitHub identifiers.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();
        validate_identifier("owner", &owner)?;
        validate_identifier("repo", &repo)?;
        Ok(Self { owner, repo })
    }
}

impl std::fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{field} must not be empty")));
    }
    if !IDENTIFIER_RE.is_match(value) {
        return Err(Error::InvalidArgument(format!(
            "{field} '{value}' is not a valid GitHub name"
        )));
    }
    Ok(())
}

/// An open pull request, reshaped from the upstream listing
///
/// Rebuilt on every list call; nothing about it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// PR number, unique within the repository
    pub number: u64,
    /// PR title
    pub title: String,
    /// Author login, `"unknown"` when upstream omits it
    pub user: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Last update time (RFC 3339)
    pub updated_at: String,
    /// Web URL for the PR
    pub html_url: String,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Whether PR is a draft
    pub draft: bool,
}

/// Author shown when upstream does not report one
pub const UNKNOWN_USER: &str = "unknown";

/// Merge strategy/method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

impl FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            other => Err(Error::InvalidArgument(format!(
                "merge_method must be one of merge, squash, rebase (got '{other}')"
            ))),
        }
    }
}

/// Raw result of the upstream merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Upstream confirmation that the merge happened
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation
    pub message: Option<String>,
}

/// Outcome of a merge tool call
///
/// Upstream failures are folded into [`MergeOutcome::Failed`] at the gateway,
/// so callers branch on [`MergeOutcome::is_success`] instead of handling an
/// error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MergeOutcomeWire", try_from = "MergeOutcomeWire")]
pub enum MergeOutcome {
    /// The merge call completed
    Merged {
        /// Upstream confirmation; a completed call may still report `false`
        merged: bool,
        /// Upstream message
        message: String,
        /// Merge commit SHA
        sha: Option<String>,
    },
    /// The merge call failed upstream or was rejected locally
    Failed {
        /// Description of the failure
        error: String,
    },
}

impl MergeOutcome {
    /// Whether the call completed without error
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }

    /// Upstream message on success, failure reason otherwise
    pub fn message(&self) -> &str {
        match self {
            Self::Merged { message, .. } => message,
            Self::Failed { error } => error,
        }
    }

    /// Merge commit SHA, present only on success
    pub fn sha(&self) -> Option<&str> {
        match self {
            Self::Merged { sha, .. } => sha.as_deref(),
            Self::Failed { .. } => None,
        }
    }
}

impl From<MergeResult> for MergeOutcome {
    fn from(result: MergeResult) -> Self {
        Self::Merged {
            merged: result.merged,
            message: result.message.unwrap_or_default(),
            sha: result.sha,
        }
    }
}

/// Flat JSON shape of [`MergeOutcome`] as exchanged with hosts
#[derive(Serialize, Deserialize)]
struct MergeOutcomeWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    merged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Outer `None` omits the field; a success always carries it, `null` or not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<MergeOutcome> for MergeOutcomeWire {
    fn from(outcome: MergeOutcome) -> Self {
        match outcome {
            MergeOutcome::Merged {
                merged,
                message,
                sha,
            } => Self {
                success: true,
                merged: Some(merged),
                message: Some(message),
                sha: Some(sha),
                error: None,
            },
            MergeOutcome::Failed { error } => Self {
                success: false,
                merged: None,
                message: None,
                sha: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<MergeOutcomeWire> for MergeOutcome {
    type Error = String;

    fn try_from(wire: MergeOutcomeWire) -> std::result::Result<Self, Self::Error> {
        if wire.success {
            return Ok(Self::Merged {
                merged: wire.merged.unwrap_or(true),
                message: wire.message.unwrap_or_default(),
                sha: wire.sha.flatten(),
            });
        }
        let error = wire
            .error
            .or(wire.message)
            .ok_or_else(|| "failed merge outcome carries no error message".to_string())?;
        Ok(Self::Failed { error })
    }
}

// =============================================================================
// UI merge state
// =============================================================================

/// Merge status of one pull request in a UI session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStatus {
    /// No merge attempted
    #[default]
    Idle,
    /// Merge request in flight
    Merging,
    /// Merged upstream; terminal for the session
    Merged,
    /// Last merge attempt failed; can be retried
    Error,
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Merging => write!(f, "merging"),
            Self::Merged => write!(f, "merged"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Merge status plus the message shown next to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeState {
    /// Current status
    pub status: MergeStatus,
    /// Set for `merged` and `error` only
    pub message: Option<String>,
}

impl MergeState {
    /// A state with no message
    pub const fn new(status: MergeStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }

    /// A state carrying a message
    pub fn with_message(status: MergeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }
}
