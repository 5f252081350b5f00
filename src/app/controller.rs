//! PR list controller - effectful operations
//!
//! Drives [`PrListState`] from host events: tool inputs arriving, refresh
//! and merge clicks, link opens. Every network call goes through the host's
//! `call_tool`, so the controller works the same against a real host or a
//! test double.

use super::host::{AppHost, LogLevel};
use super::input::{InputPhase, ToolInput, ToolInputs};
use super::state::{MERGED_REMOVAL_DELAY, PrListState};
use super::view::{View, render};
use crate::error::{Error, Result};
use crate::gateway::{CallToolResult, TOOL_LIST_PULL_REQUESTS, TOOL_MERGE_PULL_REQUEST};
use crate::types::{
    MergeMethod, MergeOutcome, MergeState, MergeStatus, PullRequestSummary, RepoIdentity,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Controller for one PR list session
pub struct PrListController {
    host: Arc<dyn AppHost>,
    state: Arc<Mutex<PrListState>>,
    inputs: Mutex<ToolInputs>,
    /// Identity the current list belongs to
    fetched_for: Mutex<Option<RepoIdentity>>,
    merge_method: MergeMethod,
    removal_delay: Duration,
    removal_timers: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl PrListController {
    /// Controller talking to `host`, merging with the default method
    pub fn new(host: Arc<dyn AppHost>) -> Self {
        Self {
            host,
            state: Arc::new(Mutex::new(PrListState::new())),
            inputs: Mutex::new(ToolInputs::default()),
            fetched_for: Mutex::new(None),
            merge_method: MergeMethod::default(),
            removal_delay: MERGED_REMOVAL_DELAY,
            removal_timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Merge with `method` instead of a merge commit
    #[must_use]
    pub fn with_merge_method(mut self, method: MergeMethod) -> Self {
        self.merge_method = method;
        self
    }

    /// Keep merged rows visible for `delay` instead of the default
    #[must_use]
    pub fn with_removal_delay(mut self, delay: Duration) -> Self {
        self.removal_delay = delay;
        self
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(target: "pr_deck::app", "{message}"),
            LogLevel::Info => info!(target: "pr_deck::app", "{message}"),
            LogLevel::Warning => warn!(target: "pr_deck::app", "{message}"),
            LogLevel::Error => error!(target: "pr_deck::app", "{message}"),
        }
        self.host.send_log(level, message);
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Streamed tool arguments from the host
    pub async fn set_partial_input(&self, input: ToolInput) {
        lock(&self.inputs).partial = Some(input);
        self.on_inputs_changed().await;
    }

    /// Final tool arguments from the host
    pub async fn set_input(&self, input: ToolInput) {
        lock(&self.inputs).complete = Some(input);
        self.on_inputs_changed().await;
    }

    /// Phase of the current inputs
    pub fn phase(&self) -> InputPhase {
        lock(&self.inputs).phase()
    }

    /// Fetch once per distinct final identity
    async fn on_inputs_changed(&self) {
        let InputPhase::Ready(repo) = self.phase() else {
            debug!("repository identity not final yet");
            return;
        };
        {
            let mut fetched = lock(&self.fetched_for);
            if fetched.as_ref() == Some(&repo) {
                return;
            }
            if fetched.is_some() {
                debug!(%repo, "repository changed, clearing list");
                self.cancel_removals();
                lock(&self.state).clear();
            }
            *fetched = Some(repo.clone());
        }
        self.fetch(&repo).await;
    }

    // =========================================================================
    // List fetch
    // =========================================================================

    /// Re-run the list fetch.
    ///
    /// Returns `false` without calling anything while the identity is not
    /// final.
    pub async fn refresh(&self) -> bool {
        let InputPhase::Ready(repo) = self.phase() else {
            debug!("refresh ignored: repository identity not final");
            return false;
        };
        *lock(&self.fetched_for) = Some(repo.clone());
        self.fetch(&repo).await;
        true
    }

    async fn fetch(&self, repo: &RepoIdentity) {
        let ticket = lock(&self.state).begin_fetch();
        self.log(LogLevel::Info, &format!("Fetching PRs for {repo}"));

        let result = self.list_pull_requests(repo).await;
        match &result {
            Ok(prs) => self.log(LogLevel::Info, &format!("Loaded {} PRs", prs.len())),
            Err(e) => self.log(LogLevel::Error, &e.to_string()),
        }

        let applied = lock(&self.state).complete_fetch(ticket, result.map_err(|e| e.to_string()));
        if !applied {
            debug!(%repo, "fetch superseded");
        }
    }

    async fn list_pull_requests(&self, repo: &RepoIdentity) -> Result<Vec<PullRequestSummary>> {
        let result = self
            .host
            .call_tool(
                TOOL_LIST_PULL_REQUESTS,
                json!({ "owner": repo.owner, "repo": repo.repo }),
            )
            .await?;
        let text = tool_text(TOOL_LIST_PULL_REQUESTS, &result)?;
        serde_json::from_str(text)
            .map_err(|e| Error::ToolResponse(format!("Invalid pull request list: {e}")))
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Merge PR `number`.
    ///
    /// Returns `false` when the guard rejects it (draft, not listed, already
    /// merging or merged); no tool call is made then. Failures land in the
    /// PR's merge state, not in the return value.
    pub async fn merge(&self, number: u64) -> bool {
        // identity and session are read under one lock so they agree
        let begun = {
            let fetched = lock(&self.fetched_for);
            let Some(repo) = fetched.clone() else {
                debug!(number, "merge ignored: no repository");
                return false;
            };
            let mut state = lock(&self.state);
            state
                .begin_merge(number)
                .map(|pr| (repo, pr, state.session()))
        };
        let (repo, pr, session) = match begun {
            Ok(begun) => begun,
            Err(reason) => {
                debug!(number, %reason, "merge ignored");
                return false;
            }
        };

        debug!(number, title = %pr.title, "merge started");
        self.log(LogLevel::Info, &format!("Merging PR #{number}"));

        let result = self.request_merge(&repo, number).await;

        // settle only if the list still belongs to the repository merged in
        let status = {
            let mut state = lock(&self.state);
            (state.session() == session).then(|| match &result {
                Ok(outcome) => state.complete_merge(number, outcome),
                Err(e) => state.fail_merge(number, e.to_string()),
            })
        };
        let Some(status) = status else {
            debug!(number, %repo, "repository changed during merge, outcome dropped");
            return true;
        };

        match result {
            Ok(outcome) if outcome.is_success() => {
                self.log(LogLevel::Info, &format!("PR #{number} merged successfully"));
                if status == MergeStatus::Merged {
                    self.schedule_removal(number);
                }
            }
            Ok(outcome) => {
                self.log(
                    LogLevel::Error,
                    &format!("Failed to merge PR #{number}: {}", outcome.message()),
                );
            }
            Err(e) => self.log(LogLevel::Error, &format!("Merge error: {e}")),
        }
        true
    }

    async fn request_merge(&self, repo: &RepoIdentity, number: u64) -> Result<MergeOutcome> {
        let result = self
            .host
            .call_tool(
                TOOL_MERGE_PULL_REQUEST,
                json!({
                    "owner": repo.owner,
                    "repo": repo.repo,
                    "pull_number": number,
                    "merge_method": self.merge_method,
                }),
            )
            .await?;
        let text = tool_text(TOOL_MERGE_PULL_REQUEST, &result)?;
        serde_json::from_str(text)
            .map_err(|e| Error::ToolResponse(format!("Invalid merge response: {e}")))
    }

    fn schedule_removal(&self, number: u64) {
        let state = Arc::clone(&self.state);
        let timers = Arc::clone(&self.removal_timers);
        let delay = self.removal_delay;

        // the map stays locked until the handle is in, so the task's own
        // removal always finds it
        let mut pending = lock(&self.removal_timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if lock(&state).remove_merged(number) {
                debug!(number, "removed merged PR from list");
            }
            lock(&timers).remove(&number);
        });
        if let Some(previous) = pending.insert(number, handle) {
            previous.abort();
        }
    }

    /// Number of removal timers still pending
    pub fn pending_removals(&self) -> usize {
        lock(&self.removal_timers).len()
    }

    fn cancel_removals(&self) {
        let mut timers = lock(&self.removal_timers);
        for (number, handle) in timers.drain() {
            debug!(number, "cancelling removal timer");
            handle.abort();
        }
    }

    // =========================================================================
    // Links and rendering
    // =========================================================================

    /// Ask the host to open PR `number` in the browser.
    ///
    /// Only http(s) URLs of listed PRs are forwarded.
    pub fn open_pull_request(&self, number: u64) -> bool {
        let Some(html_url) = lock(&self.state)
            .pull_request(number)
            .map(|pr| pr.html_url.clone())
        else {
            debug!(number, "open ignored: PR not listed");
            return false;
        };

        match url::Url::parse(&html_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                self.host.open_link(url.as_str());
                true
            }
            Ok(url) => {
                warn!(number, scheme = url.scheme(), "refusing to open non-web link");
                false
            }
            Err(e) => {
                warn!(number, url = %html_url, error = %e, "refusing to open invalid link");
                false
            }
        }
    }

    /// Render the current state; `now` anchors relative times
    pub fn view(&self, now: DateTime<Utc>) -> View {
        let phase = self.phase();
        let context = self.host.host_context();
        let state = lock(&self.state);
        render(&phase, &state, &context, now)
    }

    /// Render the current state as HTML
    pub fn view_html(&self, now: DateTime<Utc>) -> Result<String> {
        self.view(now).to_html()
    }

    /// Copy of the current state
    pub fn state_snapshot(&self) -> PrListState {
        lock(&self.state).clone()
    }

    /// Merge state of PR `number`
    pub fn merge_state(&self, number: u64) -> MergeState {
        lock(&self.state).merge_state(number)
    }

    /// Cancel pending removal timers
    pub fn teardown(&self) {
        self.cancel_removals();
    }
}

impl Drop for PrListController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Text payload of a tool result, or the failure it reports
fn tool_text<'a>(tool: &str, result: &'a CallToolResult) -> Result<&'a str> {
    let text = result.first_text().filter(|t| !t.is_empty());
    if result.is_error {
        return Err(Error::ToolResponse(
            text.map_or_else(|| format!("{tool} failed"), str::to_string),
        ));
    }
    text.ok_or_else(|| Error::ToolResponse(format!("{tool} returned no text content")))
}
