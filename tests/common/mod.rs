//! Shared test utilities

#![allow(dead_code)]

mod mock_host;
mod mock_platform;

pub use mock_host::{MockHost, ToolCall};
pub use mock_platform::{MergePrCall, MockPlatformService};

use chrono::{DateTime, Utc};
use pr_deck::app::{AppHost, PrListController};
use pr_deck::gateway::Gateway;
use pr_deck::platform::PlatformService;
use pr_deck::types::PullRequestSummary;
use std::sync::Arc;

/// Create a PR summary for testing
pub fn make_pr(number: u64, title: &str, draft: bool) -> PullRequestSummary {
    PullRequestSummary {
        number,
        title: title.to_string(),
        user: "octocat".to_string(),
        created_at: "2024-06-01T09:00:00Z".to_string(),
        updated_at: "2024-06-15T11:00:00Z".to_string(),
        html_url: format!("https://github.com/octo/demo/pull/{number}"),
        head_ref: format!("feature-{number}"),
        base_ref: "main".to_string(),
        draft,
    }
}

/// octo/demo: #1 is a draft, #2 is ready to merge
pub fn octo_demo_prs() -> Vec<PullRequestSummary> {
    vec![
        make_pr(1, "WIP: new parser", true),
        make_pr(2, "Fix typo in README", false),
    ]
}

/// Fixed "now" one hour after the fixtures' update time
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Gateway over `platform`; the UI directory is never read
pub fn gateway_for(platform: &Arc<MockPlatformService>) -> Gateway {
    let platform: Arc<dyn PlatformService> = platform.clone();
    Gateway::new(platform, "ui")
}

/// Platform, host and controller wired together
pub struct Harness {
    pub platform: Arc<MockPlatformService>,
    pub host: Arc<MockHost>,
    pub controller: Arc<PrListController>,
}

pub fn harness(prs: Vec<PullRequestSummary>) -> Harness {
    let platform = Arc::new(MockPlatformService::with_prs(prs));
    let host = Arc::new(MockHost::new(gateway_for(&platform)));
    let app_host: Arc<dyn AppHost> = host.clone();
    let controller = Arc::new(PrListController::new(app_host));
    Harness {
        platform,
        host,
        controller,
    }
}
