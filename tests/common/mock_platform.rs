//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use pr_deck::error::{Error, Result};
use pr_deck::platform::PlatformService;
use pr_deck::types::{MergeMethod, MergeResult, PullRequestSummary, RepoIdentity};
use std::collections::HashMap;
use std::sync::Mutex;

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub repo: RepoIdentity,
    pub pr_number: u64,
    pub method: MergeMethod,
}

/// Hand-written `PlatformService` double
///
/// Features:
/// - Configurable open PR list and per-number merge results
/// - Call tracking for verification
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockPlatformService {
    open_prs: Mutex<Vec<PullRequestSummary>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    // Call tracking
    list_calls: Mutex<Vec<RepoIdentity>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_merge: Mutex<HashMap<u64, String>>,
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock listing `prs`
    pub fn with_prs(prs: Vec<PullRequestSummary>) -> Self {
        let mock = Self::new();
        mock.set_open_prs(prs);
        mock
    }

    /// Replace the open PR list
    pub fn set_open_prs(&self, prs: Vec<PullRequestSummary>) {
        *self.open_prs.lock().unwrap() = prs;
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    // === Error injection methods ===

    /// Make `list_open_prs` return an error
    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    /// Stop failing `list_open_prs`
    pub fn clear_list_failure(&self) {
        *self.error_on_list.lock().unwrap() = None;
    }

    /// Make `merge_pr` fail for `pr_number`
    pub fn fail_merge_pr(&self, pr_number: u64, msg: &str) {
        self.error_on_merge
            .lock()
            .unwrap()
            .insert(pr_number, msg.to_string());
    }

    // === Call inspection ===

    pub fn list_calls(&self) -> Vec<RepoIdentity> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    pub fn merge_call_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_open_prs(&self, repo: &RepoIdentity) -> Result<Vec<PullRequestSummary>> {
        self.list_calls.lock().unwrap().push(repo.clone());
        if let Some(msg) = self.error_on_list.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(self.open_prs.lock().unwrap().clone())
    }

    async fn merge_pr(
        &self,
        repo: &RepoIdentity,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            repo: repo.clone(),
            pr_number,
            method,
        });
        if let Some(msg) = self.error_on_merge.lock().unwrap().get(&pr_number) {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_else(|| MergeResult {
                merged: true,
                sha: Some(format!("sha{pr_number}")),
                message: Some("Pull Request successfully merged".to_string()),
            }))
    }
}
