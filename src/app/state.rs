//! Pull-request list state - pure transitions
//!
//! Everything the UI shows lives in [`PrListState`]. Its methods are the
//! state machine; they perform no I/O, so the controller's effectful code can
//! stay small and these rules can be tested directly.

use crate::types::{MergeOutcome, MergeState, MergeStatus, PullRequestSummary};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// How long a merged PR stays visible before it is removed
pub const MERGED_REMOVAL_DELAY: Duration = Duration::from_millis(2000);

/// Handle for one list fetch; only the newest fetch may apply its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Why a merge request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRejection {
    /// Number is not in the visible list
    NotFound,
    /// Drafts cannot be merged
    Draft,
    /// A merge for this number is already in flight
    InFlight,
    /// Already merged this session
    AlreadyMerged,
}

impl std::fmt::Display for MergeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not in the list"),
            Self::Draft => write!(f, "draft"),
            Self::InFlight => write!(f, "merge in progress"),
            Self::AlreadyMerged => write!(f, "already merged"),
        }
    }
}

/// Session state of the PR list UI
#[derive(Debug, Clone, Default)]
pub struct PrListState {
    pull_requests: Vec<PullRequestSummary>,
    /// Keyed by PR number, never by position: the list can be replaced while
    /// merges are in flight
    merge_states: HashMap<u64, MergeState>,
    is_loading: bool,
    error: Option<String>,
    fetch_generation: u64,
    /// Bumped by [`PrListState::clear`]; merges begun before a clear must not
    /// settle after it
    session: u64,
}

impl PrListState {
    /// Empty state: no PRs, not loading, no error
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible PRs in upstream order
    pub fn pull_requests(&self) -> &[PullRequestSummary] {
        &self.pull_requests
    }

    /// Visible PR by number
    pub fn pull_request(&self, number: u64) -> Option<&PullRequestSummary> {
        self.pull_requests.iter().find(|pr| pr.number == number)
    }

    /// Whether a list fetch is in flight
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Error of the last list fetch
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Merge state of `number`; idle when never touched
    pub fn merge_state(&self, number: u64) -> MergeState {
        self.merge_states.get(&number).cloned().unwrap_or_default()
    }

    /// Merge status of `number`
    pub fn merge_status(&self, number: u64) -> MergeStatus {
        self.merge_states
            .get(&number)
            .map_or(MergeStatus::Idle, |s| s.status)
    }

    /// Current session; changes whenever the state is cleared
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Forget the list and every merge state, e.g. when the repository changes.
    ///
    /// The fetch generation survives so fetches for the old repository
    /// still count as superseded. The session moves on so merges begun
    /// before the clear are recognised as stale.
    pub fn clear(&mut self) {
        self.pull_requests.clear();
        self.merge_states.clear();
        self.error = None;
        self.session += 1;
    }

    // =========================================================================
    // List fetch
    // =========================================================================

    /// Start a fetch: set loading, clear the error.
    ///
    /// Starting a new fetch supersedes any fetch still in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_generation += 1;
        self.is_loading = true;
        self.error = None;
        FetchTicket(self.fetch_generation)
    }

    /// Apply a fetch result.
    ///
    /// Returns `false` (and changes nothing) when `ticket` was superseded by
    /// a later fetch. On success the list is replaced wholesale and merge
    /// states for numbers no longer listed are dropped, except merges still
    /// in flight. On failure the error is recorded and the list left as is.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<PullRequestSummary>, String>,
    ) -> bool {
        if ticket.0 != self.fetch_generation {
            debug!(
                ticket = ticket.0,
                current = self.fetch_generation,
                "discarding superseded fetch result"
            );
            return false;
        }

        self.is_loading = false;
        match result {
            Ok(prs) => {
                self.merge_states.retain(|number, state| {
                    state.status == MergeStatus::Merging || prs.iter().any(|p| p.number == *number)
                });
                self.pull_requests = prs;
            }
            Err(message) => self.error = Some(message),
        }
        true
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Guarded start of a merge.
    ///
    /// On success the number is `Merging` and the PR is returned.
    pub fn begin_merge(&mut self, number: u64) -> Result<PullRequestSummary, MergeRejection> {
        let pr = self
            .pull_request(number)
            .cloned()
            .ok_or(MergeRejection::NotFound)?;

        if pr.draft {
            return Err(MergeRejection::Draft);
        }
        match self.merge_status(number) {
            MergeStatus::Merging => return Err(MergeRejection::InFlight),
            MergeStatus::Merged => return Err(MergeRejection::AlreadyMerged),
            MergeStatus::Idle | MergeStatus::Error => {}
        }

        self.merge_states
            .insert(number, MergeState::new(MergeStatus::Merging));
        Ok(pr)
    }

    /// Apply the gateway's merge outcome; returns the resulting status.
    ///
    /// Only a number that is `Merging` moves; anything else is left alone so
    /// `Merged` is never overwritten.
    pub fn complete_merge(&mut self, number: u64, outcome: &MergeOutcome) -> MergeStatus {
        let status = if outcome.is_success() {
            MergeStatus::Merged
        } else {
            MergeStatus::Error
        };
        self.settle_merge(number, MergeState::with_message(status, outcome.message()))
    }

    /// Record a transport-level failure of the merge call
    pub fn fail_merge(&mut self, number: u64, message: impl Into<String>) -> MergeStatus {
        self.settle_merge(
            number,
            MergeState::with_message(MergeStatus::Error, message),
        )
    }

    fn settle_merge(&mut self, number: u64, next: MergeState) -> MergeStatus {
        match self.merge_states.get_mut(&number) {
            Some(state) if state.status == MergeStatus::Merging => {
                *state = next;
                state.status
            }
            Some(state) => {
                debug!(number, status = %state.status, "ignoring merge completion");
                state.status
            }
            None => {
                debug!(number, "ignoring merge completion for untracked PR");
                MergeStatus::Idle
            }
        }
    }

    /// Drop a merged PR from the visible list.
    ///
    /// Its `Merged` state is kept so a late refetch that still lists it does
    /// not offer the merge again.
    pub fn remove_merged(&mut self, number: u64) -> bool {
        if self.merge_status(number) != MergeStatus::Merged {
            return false;
        }
        let before = self.pull_requests.len();
        self.pull_requests.retain(|pr| pr.number != number);
        before != self.pull_requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(number: u64, draft: bool) -> PullRequestSummary {
        PullRequestSummary {
            number,
            title: format!("PR {number}"),
            user: "octocat".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            html_url: format!("https://github.com/octo/demo/pull/{number}"),
            head_ref: format!("feat-{number}"),
            base_ref: "main".to_string(),
            draft,
        }
    }

    fn loaded(prs: Vec<PullRequestSummary>) -> PrListState {
        let mut state = PrListState::new();
        let ticket = state.begin_fetch();
        assert!(state.complete_fetch(ticket, Ok(prs)));
        state
    }

    fn merged_outcome() -> MergeOutcome {
        MergeOutcome::Merged {
            merged: true,
            message: "Pull Request successfully merged".to_string(),
            sha: Some("abc".to_string()),
        }
    }

    #[test]
    fn test_begin_fetch_sets_loading_and_clears_error() {
        let mut state = PrListState::new();
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Err("Bad credentials".to_string()));
        assert_eq!(state.error(), Some("Bad credentials"));
        assert!(!state.is_loading());

        state.begin_fetch();
        assert!(state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failed_fetch_keeps_list() {
        let mut state = loaded(vec![pr(1, false)]);
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Err("boom".to_string()));
        assert_eq!(state.pull_requests().len(), 1);
        assert_eq!(state.error(), Some("boom"));
    }

    #[test]
    fn test_superseded_fetch_is_discarded() {
        let mut state = PrListState::new();
        let first = state.begin_fetch();
        let second = state.begin_fetch();

        assert!(state.complete_fetch(second, Ok(vec![pr(2, false)])));
        assert!(!state.complete_fetch(first, Ok(vec![pr(1, false)])));

        let numbers: Vec<_> = state.pull_requests().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![2]);
    }

    #[test]
    fn test_stale_result_does_not_clear_loading() {
        let mut state = PrListState::new();
        let first = state.begin_fetch();
        let _second = state.begin_fetch();
        state.complete_fetch(first, Ok(vec![]));
        assert!(state.is_loading());
    }

    #[test]
    fn test_draft_never_reaches_merging() {
        let mut state = loaded(vec![pr(1, true)]);
        assert_eq!(state.begin_merge(1), Err(MergeRejection::Draft));
        assert_eq!(state.merge_status(1), MergeStatus::Idle);
    }

    #[test]
    fn test_merge_guard_blocks_second_attempt() {
        let mut state = loaded(vec![pr(2, false)]);
        assert!(state.begin_merge(2).is_ok());
        assert_eq!(state.begin_merge(2), Err(MergeRejection::InFlight));
    }

    #[test]
    fn test_merge_of_unknown_number_is_rejected() {
        let mut state = loaded(vec![pr(2, false)]);
        assert_eq!(state.begin_merge(9), Err(MergeRejection::NotFound));
    }

    #[test]
    fn test_error_can_be_retried() {
        let mut state = loaded(vec![pr(2, false)]);
        state.begin_merge(2).unwrap();
        let status = state.complete_merge(
            2,
            &MergeOutcome::Failed {
                error: "Merge conflict".to_string(),
            },
        );
        assert_eq!(status, MergeStatus::Error);
        assert_eq!(state.merge_state(2).message.as_deref(), Some("Merge conflict"));

        assert!(state.begin_merge(2).is_ok());
        assert_eq!(state.merge_state(2), MergeState::new(MergeStatus::Merging));
    }

    #[test]
    fn test_merged_is_terminal() {
        let mut state = loaded(vec![pr(2, false)]);
        state.begin_merge(2).unwrap();
        state.complete_merge(2, &merged_outcome());

        assert_eq!(state.begin_merge(2), Err(MergeRejection::AlreadyMerged));
        assert_eq!(state.fail_merge(2, "late failure"), MergeStatus::Merged);
        assert_eq!(state.merge_status(2), MergeStatus::Merged);
    }

    #[test]
    fn test_remove_merged_only_removes_merged() {
        let mut state = loaded(vec![pr(1, false), pr(2, false)]);
        assert!(!state.remove_merged(1));

        state.begin_merge(2).unwrap();
        state.complete_merge(2, &merged_outcome());
        assert!(state.remove_merged(2));

        let numbers: Vec<_> = state.pull_requests().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1]);
    }

    #[test]
    fn test_refetch_prunes_states_of_dropped_numbers() {
        let mut state = loaded(vec![pr(1, false), pr(2, false), pr(3, false)]);
        state.begin_merge(2).unwrap();
        state.complete_merge(2, &merged_outcome());
        state.begin_merge(3).unwrap();

        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(vec![pr(1, false)]));

        assert_eq!(state.merge_status(2), MergeStatus::Idle);
        // in-flight merge keeps its entry so the completion still lands
        assert_eq!(state.merge_status(3), MergeStatus::Merging);
    }

    #[test]
    fn test_clear_keeps_fetch_generation() {
        let mut state = loaded(vec![pr(2, false)]);
        let old = state.begin_fetch();
        state.clear();
        assert!(state.pull_requests().is_empty());

        let new = state.begin_fetch();
        assert!(!state.complete_fetch(old, Ok(vec![pr(9, false)])));
        assert!(state.complete_fetch(new, Ok(vec![])));
        assert!(state.pull_requests().is_empty());
    }

    #[test]
    fn test_clear_starts_a_new_session() {
        let mut state = loaded(vec![pr(2, false)]);
        let before = state.session();
        state.begin_merge(2).unwrap();
        state.clear();
        assert_ne!(state.session(), before);
        assert_eq!(state.merge_status(2), MergeStatus::Idle);
    }

    #[test]
    fn test_refetch_still_listing_merged_keeps_it_merged() {
        let mut state = loaded(vec![pr(2, false)]);
        state.begin_merge(2).unwrap();
        state.complete_merge(2, &merged_outcome());

        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(vec![pr(2, false)]));
        assert_eq!(state.merge_status(2), MergeStatus::Merged);
    }
}
