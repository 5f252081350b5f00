//! Operation gateway
//!
//! Presents the stable operation contract hosts call by name:
//! - enumerate open pull requests,
//! - merge a pull request (errors folded into [`MergeOutcome`]),
//! - render the UI document,
//! - show pull requests (count summary that opens the UI).
//!
//! No business logic lives here beyond argument validation, reshaping and
//! turning merge errors into values.

mod resource;
mod tools;

pub use resource::{UI_MIME_TYPE, UI_RESOURCE_URI, UiResource, resource_descriptors};
pub use tools::{
    CallToolResult, Content, ListArgs, MergeArgs, TOOL_LIST_PULL_REQUESTS,
    TOOL_MERGE_PULL_REQUEST, TOOL_SHOW_PULL_REQUESTS, ToolDescriptor, tool_descriptors,
};

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeOutcome, PullRequestSummary, RepoIdentity};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tool gateway over a [`PlatformService`]
#[derive(Clone)]
pub struct Gateway {
    platform: Arc<dyn PlatformService>,
    ui: UiResource,
}

impl Gateway {
    /// Create a gateway reading the UI document from `ui_dir`
    pub fn new(platform: Arc<dyn PlatformService>, ui_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            ui: UiResource::new(ui_dir),
        }
    }

    /// List open pull requests for `owner/repo`.
    ///
    /// Upstream errors propagate unchanged.
    pub async fn enumerate_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestSummary>> {
        let repo = RepoIdentity::new(owner, repo)?;
        let prs = self.platform.list_open_prs(&repo).await?;
        let prs = dedupe_by_number(prs);
        debug!(%repo, count = prs.len(), "enumerated open pull requests");
        Ok(prs)
    }

    /// Merge a pull request.
    ///
    /// Never fails: validation and upstream errors come back as
    /// [`MergeOutcome::Failed`] carrying the error's description.
    pub async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
        merge_method: MergeMethod,
    ) -> MergeOutcome {
        let repo = match RepoIdentity::new(owner, repo) {
            Ok(r) => r,
            Err(e) => {
                return MergeOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        info!(%repo, pull_number, %merge_method, "merging pull request");
        match self
            .platform
            .merge_pr(&repo, pull_number, merge_method)
            .await
        {
            Ok(result) => {
                info!(%repo, pull_number, merged = result.merged, "merge call completed");
                MergeOutcome::from(result)
            }
            Err(e) => {
                warn!(%repo, pull_number, error = %e, "merge call failed");
                MergeOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Count open pull requests; backs the `show_pull_requests` tool
    pub async fn show_pull_requests(&self, owner: &str, repo: &str) -> Result<usize> {
        Ok(self.enumerate_open_pull_requests(owner, repo).await?.len())
    }

    /// Read the UI document fresh from disk
    pub async fn render_ui_document(&self) -> Result<String> {
        self.ui.read().await
    }

    /// Resource backing the UI document
    pub const fn ui_resource(&self) -> &UiResource {
        &self.ui
    }

    /// Dispatch a tool call by name.
    ///
    /// Unknown tools and malformed arguments are errors. Failures of the list
    /// tools become `isError` results so the host sees the upstream message.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        tools::call_tool(self, name, arguments).await
    }
}

/// Drop repeated PR numbers, keeping the first occurrence.
///
/// A page can repeat an entry when PRs are opened while it is being served.
fn dedupe_by_number(prs: Vec<PullRequestSummary>) -> Vec<PullRequestSummary> {
    let mut seen = HashSet::with_capacity(prs.len());
    let before = prs.len();
    let unique: Vec<_> = prs.into_iter().filter(|pr| seen.insert(pr.number)).collect();
    if unique.len() != before {
        warn!(dropped = before - unique.len(), "dropped duplicate pull request numbers");
    }
    unique
}
