//! Repository identity as delivered by the host
//!
//! Hosts stream tool arguments while the model is still producing them, then
//! deliver a final copy. Only the final copy may trigger network calls.

use crate::types::RepoIdentity;
use serde::{Deserialize, Serialize};

/// Tool arguments naming the repository; fields may be missing mid-stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInput {
    /// Repository owner
    #[serde(default)]
    pub owner: Option<String>,
    /// Repository name
    #[serde(default)]
    pub repo: Option<String>,
}

impl ToolInput {
    /// Input with both fields set
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            repo: Some(repo.into()),
        }
    }
}

/// Latest partial and final inputs received from the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInputs {
    /// Final arguments, once the host has them
    pub complete: Option<ToolInput>,
    /// Arguments still being streamed
    pub partial: Option<ToolInput>,
}

/// What the controller may do with the current inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPhase {
    /// Nothing usable has arrived yet
    Missing,
    /// Only streaming arguments so far; wait for the final copy
    Streaming,
    /// Final identity known; fetching is allowed
    Ready(RepoIdentity),
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ToolInputs {
    /// Resolve the current phase.
    ///
    /// Final fields take precedence over streamed ones. The identity is not
    /// validated here; the gateway rejects bad names and the error surfaces
    /// through the normal fetch path.
    pub fn phase(&self) -> InputPhase {
        if self.complete.is_none() && self.partial.is_some() {
            return InputPhase::Streaming;
        }

        let complete = self.complete.as_ref();
        let partial = self.partial.as_ref();
        let owner = non_empty(complete.and_then(|i| i.owner.as_ref()))
            .or_else(|| non_empty(partial.and_then(|i| i.owner.as_ref())));
        let repo = non_empty(complete.and_then(|i| i.repo.as_ref()))
            .or_else(|| non_empty(partial.and_then(|i| i.repo.as_ref())));

        match (owner, repo) {
            (Some(owner), Some(repo)) => InputPhase::Ready(RepoIdentity {
                owner: owner.clone(),
                repo: repo.clone(),
            }),
            _ => InputPhase::Missing,
        }
    }
}
