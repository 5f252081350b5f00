//! Platform services for the upstream hosting provider
//!
//! Provides the two pull-request calls the gateway needs behind a trait, so
//! the tool layer and its tests do not depend on GitHub being reachable.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{MergeMethod, MergeResult, PullRequestSummary, RepoIdentity};
use async_trait::async_trait;

/// Platform service trait for PR operations
///
/// Implementations translate one-to-one onto provider calls. They perform no
/// recovery: errors come back exactly as the provider reported them.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List open PRs for a repository.
    ///
    /// Fetches exactly one page in the provider's default order.
    async fn list_open_prs(&self, repo: &RepoIdentity) -> Result<Vec<PullRequestSummary>>;

    /// Merge a PR with the specified method
    async fn merge_pr(
        &self,
        repo: &RepoIdentity,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult>;
}
