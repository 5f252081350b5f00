//! Render model for the PR list UI
//!
//! [`render`] turns controller state into plain data: every label, enabled
//! flag and CSS class the markup needs. [`View::to_html`] paints it as the
//! markup the UI document uses; tests assert on either.

use super::host::{HostContext, SafeAreaInsets};
use super::input::InputPhase;
use super::state::PrListState;
use crate::error::Result;
use crate::types::{MergeStatus, PullRequestSummary};
use chrono::{DateTime, TimeDelta, Utc};
use minijinja::{Environment, context};
use serde::Serialize;

/// Shown until a final repository identity is known
pub const LOADING_REPOSITORY_LABEL: &str = "Loading repository info...";
/// Shown while the first fetch is in flight
pub const LOADING_PULL_REQUESTS_LABEL: &str = "Loading pull requests...";
/// Shown for a repository without open PRs
pub const EMPTY_LABEL: &str = "No open pull requests";
/// Tooltip on a draft's merge button
pub const DRAFT_TOOLTIP: &str = "Cannot merge draft PR";

/// Container padding mirroring the host's safe-area insets
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ContainerStyle {
    /// Top padding
    pub padding_top: Option<f64>,
    /// Right padding
    pub padding_right: Option<f64>,
    /// Bottom padding
    pub padding_bottom: Option<f64>,
    /// Left padding
    pub padding_left: Option<f64>,
}

impl ContainerStyle {
    /// Padding for `insets`; unset when the host reports none
    pub fn from_insets(insets: Option<SafeAreaInsets>) -> Self {
        insets.map_or_else(Self::default, |i| Self {
            padding_top: Some(i.top),
            padding_right: Some(i.right),
            padding_bottom: Some(i.bottom),
            padding_left: Some(i.left),
        })
    }

    /// Inline CSS for the set paddings; empty when none is set
    pub fn css(&self) -> String {
        [
            ("padding-top", self.padding_top),
            ("padding-right", self.padding_right),
            ("padding-bottom", self.padding_bottom),
            ("padding-left", self.padding_left),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}:{v}px")))
        .collect::<Vec<_>>()
        .join(";")
    }
}

/// A clickable action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    /// Visible label
    pub label: String,
    /// Whether clicking does anything
    pub enabled: bool,
    /// Hover text
    pub tooltip: Option<String>,
    /// CSS class list
    pub class: String,
}

impl Button {
    fn new(label: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            tooltip: None,
            class: class.into(),
        }
    }
}

/// One PR row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrRow {
    /// PR number
    pub number: u64,
    /// `#N`
    pub number_label: String,
    /// PR title
    pub title: String,
    /// Show the draft badge
    pub draft: bool,
    /// `by <user>`
    pub author_label: String,
    /// Relative time since the last update
    pub updated_label: String,
    /// `head -> base`
    pub branch_label: String,
    /// Message of the last failed merge
    pub error_message: Option<String>,
    /// Opens the PR in the browser
    pub view_button: Button,
    /// Merge action; its class carries the merge status
    pub merge_button: Button,
}

/// Body under the list header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ListBody {
    /// First fetch in flight
    Loading(String),
    /// Nothing open
    Empty(String),
    /// One row per PR, upstream order
    Rows(Vec<PrRow>),
}

/// Header and body of the list view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    /// Container padding
    pub style: ContainerStyle,
    /// `owner/repo`
    pub title: String,
    /// `N open`
    pub count_label: String,
    /// Refresh action, disabled while loading
    pub refresh: Button,
    /// List body
    pub body: ListBody,
}

/// What the UI shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// No final repository identity yet
    Loading {
        /// Container padding
        style: ContainerStyle,
        /// Placeholder text
        message: String,
    },
    /// The last list fetch failed
    Error {
        /// Container padding
        style: ContainerStyle,
        /// Failure description
        message: String,
        /// Re-runs the fetch
        retry: Button,
    },
    /// The PR list
    List(ListView),
}

/// Markup for a [`View`]. Every interpolation is HTML-escaped; clickable
/// elements carry `data-action` (and `data-number` for rows).
const VIEW_TEMPLATE: &str = r#"
{%- macro button(b, action, number=0) -%}
<button class="{{ b.class }}" data-action="{{ action }}"
{%- if number %} data-number="{{ number }}"{% endif %}
{%- if b.tooltip %} title="{{ b.tooltip }}"{% endif %}
{%- if not b.enabled %} disabled{% endif %}>{{ b.label }}</button>
{%- endmacro -%}
<div class="pr-container"{% if style %} style="{{ style }}"{% endif %}>
{%- if view.kind == "loading" -%}
<div class="loading">{{ view.message }}</div>
{%- elif view.kind == "error" -%}
<div class="error">{{ view.message }}</div>{{ button(view.retry, "refresh") }}
{%- else -%}
<div class="pr-header"><h2>{{ view.title }}</h2><div class="pr-header-actions">
<span class="pr-count">{{ view.count_label }}</span>{{ button(view.refresh, "refresh") }}</div></div>
{%- if view.body.kind == "loading" -%}
<div class="loading">{{ view.body.value }}</div>
{%- elif view.body.kind == "empty" -%}
<div class="empty-state"><div class="empty-state-icon">PR</div><p>{{ view.body.value }}</p></div>
{%- else -%}
<div class="pr-list">
{%- for row in view.body.value -%}
<div class="pr-item" data-number="{{ row.number }}"><div class="pr-info">
<div class="pr-title-row"><span class="pr-number">{{ row.number_label }}</span>
<span class="pr-title">{{ row.title }}</span>
{%- if row.draft %}<span class="pr-draft">Draft</span>{% endif %}</div>
<div class="pr-meta"><span>{{ row.author_label }}</span><span>{{ row.updated_label }}</span>
<span class="pr-branch">{{ row.branch_label }}</span></div>
{%- if row.error_message %}<div class="pr-error">{{ row.error_message }}</div>{% endif -%}
</div><div class="pr-actions">{{ button(row.view_button, "open", row.number) }}
{{- button(row.merge_button, "merge", row.number) }}</div></div>
{%- endfor -%}
</div>
{%- endif -%}
{%- endif -%}
</div>"#;

impl View {
    /// Container padding of any variant
    pub const fn style(&self) -> &ContainerStyle {
        match self {
            Self::Loading { style, .. } | Self::Error { style, .. } => style,
            Self::List(list) => &list.style,
        }
    }

    /// Paint the view as HTML
    pub fn to_html(&self) -> Result<String> {
        let mut env = Environment::new();
        // the `.html` name turns on auto-escaping
        env.add_template("view.html", VIEW_TEMPLATE)?;
        let html = env.get_template("view.html")?.render(context! {
            view => self,
            style => self.style().css(),
        })?;
        Ok(html)
    }
}

/// Build the view for the current inputs and state.
///
/// `now` anchors relative times.
pub fn render(
    phase: &InputPhase,
    state: &PrListState,
    context: &HostContext,
    now: DateTime<Utc>,
) -> View {
    let style = ContainerStyle::from_insets(context.safe_area_insets);

    let InputPhase::Ready(repo) = phase else {
        return View::Loading {
            style,
            message: LOADING_REPOSITORY_LABEL.to_string(),
        };
    };

    if let Some(message) = state.error() {
        return View::Error {
            style,
            message: message.to_string(),
            retry: Button::new("Retry", "refresh-btn"),
        };
    }

    let prs = state.pull_requests();
    let refresh = Button {
        enabled: !state.is_loading(),
        ..Button::new(if state.is_loading() { "..." } else { "Refresh" }, "refresh-btn")
    };

    let body = if state.is_loading() && prs.is_empty() {
        ListBody::Loading(LOADING_PULL_REQUESTS_LABEL.to_string())
    } else if prs.is_empty() {
        ListBody::Empty(EMPTY_LABEL.to_string())
    } else {
        ListBody::Rows(prs.iter().map(|pr| render_row(pr, state, now)).collect())
    };

    View::List(ListView {
        style,
        title: repo.to_string(),
        count_label: format!("{} open", prs.len()),
        refresh,
        body,
    })
}

fn render_row(pr: &PullRequestSummary, state: &PrListState, now: DateTime<Utc>) -> PrRow {
    let merge_state = state.merge_state(pr.number);
    let status = merge_state.status;

    let label = match status {
        MergeStatus::Merging => "Merging...",
        MergeStatus::Merged => "Merged",
        MergeStatus::Error => "Retry",
        MergeStatus::Idle => "Merge",
    };
    let merge_button = Button {
        enabled: !matches!(status, MergeStatus::Merging | MergeStatus::Merged) && !pr.draft,
        tooltip: pr.draft.then(|| DRAFT_TOOLTIP.to_string()),
        ..Button::new(label, format!("merge-btn {status}"))
    };

    PrRow {
        number: pr.number,
        number_label: format!("#{}", pr.number),
        title: pr.title.clone(),
        draft: pr.draft,
        author_label: format!("by {}", pr.user),
        updated_label: format_relative_time(&pr.updated_at, now),
        branch_label: format!("{} -> {}", pr.head_ref, pr.base_ref),
        error_message: (status == MergeStatus::Error)
            .then_some(merge_state.message)
            .flatten(),
        view_button: Button::new("View", "view-btn"),
        merge_button,
    }
}

/// Short relative form of an RFC 3339 timestamp.
///
/// `Nm ago` within the hour, `Nh ago` within the day, `yesterday`, `Nd ago`
/// under a week, the calendar date after that. Future times count as zero
/// elapsed; unparsable input is returned as is.
pub fn format_relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let then = then.with_timezone(&Utc);
    let elapsed = (now - then).max(TimeDelta::zero());

    match elapsed.num_days() {
        0 if elapsed.num_hours() == 0 => format!("{}m ago", elapsed.num_minutes()),
        0 => format!("{}h ago", elapsed.num_hours()),
        1 => "yesterday".to_string(),
        days @ 2..=6 => format!("{days}d ago"),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoIdentity;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_relative_minutes_and_hours() {
        assert_eq!(format_relative_time("2024-06-15T11:55:00Z", now()), "5m ago");
        assert_eq!(format_relative_time("2024-06-15T12:00:00Z", now()), "0m ago");
        assert_eq!(format_relative_time("2024-06-15T09:30:00Z", now()), "2h ago");
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(format_relative_time("2024-06-14T10:00:00Z", now()), "yesterday");
        assert_eq!(format_relative_time("2024-06-12T12:00:00Z", now()), "3d ago");
        assert_eq!(format_relative_time("2024-06-01T08:00:00Z", now()), "2024-06-01");
    }

    #[test]
    fn test_relative_time_clamps_future() {
        assert_eq!(format_relative_time("2024-06-15T13:00:00Z", now()), "0m ago");
    }

    #[test]
    fn test_relative_time_keeps_unparsable_input() {
        assert_eq!(format_relative_time("last tuesday", now()), "last tuesday");
    }

    #[test]
    fn test_container_style_from_insets() {
        let style = ContainerStyle::from_insets(Some(SafeAreaInsets {
            top: 44.0,
            right: 0.0,
            bottom: 34.0,
            left: 0.0,
        }));
        assert_eq!(style.padding_top, Some(44.0));
        assert_eq!(style.padding_bottom, Some(34.0));
        assert_eq!(ContainerStyle::from_insets(None), ContainerStyle::default());
    }

    fn list_view(prs: Vec<PullRequestSummary>) -> View {
        let mut state = PrListState::new();
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(prs));
        let repo = RepoIdentity::new("octo", "demo").unwrap();
        render(&InputPhase::Ready(repo), &state, &HostContext::default(), now())
    }

    fn pr(number: u64, title: &str, draft: bool) -> PullRequestSummary {
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

    #[test]
    fn test_container_style_css_lists_set_paddings() {
        let style = ContainerStyle {
            padding_top: Some(44.0),
            padding_bottom: Some(34.5),
            ..ContainerStyle::default()
        };
        assert_eq!(style.css(), "padding-top:44px;padding-bottom:34.5px");
        assert_eq!(ContainerStyle::default().css(), "");
    }

    #[test]
    fn test_loading_view_html() {
        let view = View::Loading {
            style: ContainerStyle::default(),
            message: LOADING_REPOSITORY_LABEL.to_string(),
        };
        assert_eq!(
            view.to_html().unwrap(),
            r#"<div class="pr-container"><div class="loading">Loading repository info...</div></div>"#
        );
    }

    #[test]
    fn test_error_view_html_has_retry_action() {
        let view = View::Error {
            style: ContainerStyle::from_insets(Some(SafeAreaInsets {
                top: 10.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            })),
            message: "Not Found".to_string(),
            retry: Button::new("Retry", "refresh-btn"),
        };
        let html = view.to_html().unwrap();
        assert!(html.starts_with(r#"<div class="pr-container" style="padding-top:10px;"#));
        assert!(html.contains(r#"<div class="error">Not Found</div>"#));
        assert!(html.contains(r#"<button class="refresh-btn" data-action="refresh">Retry</button>"#));
    }

    #[test]
    fn test_list_view_html_rows_and_actions() {
        let html = list_view(vec![pr(1, "WIP: new parser", true), pr(2, "Fix typo", false)])
            .to_html()
            .unwrap();

        assert!(html.contains("<h2>octo"));
        assert!(html.contains("demo</h2>"));
        assert!(html.contains(r#"<span class="pr-count">2 open</span>"#));
        assert!(html.contains(r#"<span class="pr-draft">Draft</span>"#));
        assert!(html.contains("feature-2 -&gt; main"));
        assert!(html.contains(
            r#"<button class="merge-btn idle" data-action="merge" data-number="1" title="Cannot merge draft PR" disabled>Merge</button>"#
        ));
        assert!(html.contains(
            r#"<button class="merge-btn idle" data-action="merge" data-number="2">Merge</button>"#
        ));
        assert!(html.contains(
            r#"<button class="view-btn" data-action="open" data-number="2">View</button>"#
        ));
    }

    #[test]
    fn test_list_view_html_escapes_upstream_text() {
        let html = list_view(vec![pr(3, "<img src=x onerror=alert(1)>", false)])
            .to_html()
            .unwrap();
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_empty_list_view_html() {
        let html = list_view(vec![]).to_html().unwrap();
        assert!(html.contains(r#"<div class="empty-state"><div class="empty-state-icon">PR</div><p>No open pull requests</p></div>"#));
    }

    #[test]
    fn test_missing_identity_renders_loading() {
        let view = render(
            &InputPhase::Streaming,
            &PrListState::new(),
            &HostContext::default(),
            now(),
        );
        assert!(matches!(view, View::Loading { message, .. } if message == LOADING_REPOSITORY_LABEL));
    }
}
