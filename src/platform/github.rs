//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeResult, PullRequestSummary, RepoIdentity, UNKNOWN_USER};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::Octocrab;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
}

impl GitHubService {
    /// Create a new GitHub service.
    ///
    /// `host` selects a GitHub Enterprise instance (`https://{host}/api/v3`);
    /// without it requests go to api.github.com. A missing token produces an
    /// unauthenticated client.
    pub fn new(token: Option<&str>, host: Option<&str>) -> Result<Self> {
        match host {
            Some(h) => Self::with_base_uri(token, &format!("https://{h}/api/v3")),
            None => Self::build(token, None),
        }
    }

    /// Create a service against an explicit API base URI
    pub fn with_base_uri(token: Option<&str>, base_uri: &str) -> Result<Self> {
        Self::build(token, Some(base_uri))
    }

    fn build(token: Option<&str>, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();

        if let Some(t) = token {
            builder = builder.personal_token(t.to_string());
        }
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::GitHubApi(format!("invalid API base URI {uri}: {e}")))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { client })
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Helper to convert octocrab PR to our `PullRequestSummary` type
fn summary_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequestSummary {
    PullRequestSummary {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        user: pr
            .user
            .as_ref()
            .map_or_else(|| UNKNOWN_USER.to_string(), |u| u.login.clone()),
        created_at: pr.created_at.map(format_timestamp).unwrap_or_default(),
        updated_at: pr.updated_at.map(format_timestamp).unwrap_or_default(),
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
        draft: pr.draft.unwrap_or(false),
    }
}

const fn octocrab_method(method: MergeMethod) -> octocrab::params::pulls::MergeMethod {
    match method {
        MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
        MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
        MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_open_prs(&self, repo: &RepoIdentity) -> Result<Vec<PullRequestSummary>> {
        debug!(owner = %repo.owner, repo = %repo.repo, "listing open PRs");

        let page = self
            .client
            .pulls(&repo.owner, &repo.repo)
            .list()
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result: Vec<PullRequestSummary> = page.items.iter().map(summary_from_octocrab).collect();
        debug!(count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn merge_pr(
        &self,
        repo: &RepoIdentity,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        debug!(pr_number, %method, "merging PR");

        let result = self
            .client
            .pulls(&repo.owner, &repo.repo)
            .merge(pr_number)
            .method(octocrab_method(method))
            .send()
            .await?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_use_github_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-01T12:30:05Z");
    }

    #[tokio::test]
    async fn test_enterprise_host_builds_client() {
        assert!(GitHubService::new(Some("t"), Some("github.example.com")).is_ok());
        assert!(GitHubService::new(None, None).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_base_uri_is_rejected() {
        let err = GitHubService::with_base_uri(None, "not a uri").err().unwrap();
        assert!(matches!(err, Error::GitHubApi(_)));
    }
}
