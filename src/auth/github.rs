//! GitHub token lookup

use super::AuthSource;
use tracing::{debug, warn};

/// Environment variables checked for a GitHub token, in priority order
pub const GITHUB_TOKEN_VARS: [&str; 2] = ["GITHUB_PERSONAL_ACCESS_TOKEN", "GITHUB_TOKEN"];

/// Resolved GitHub credentials
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// Personal access token, if any
    pub token: Option<String>,
    /// Where the token came from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve GitHub auth from a key lookup (normally the process environment).
///
/// Blank values are ignored so an exported-but-empty variable does not
/// shadow the fallback.
pub fn get_github_auth<F>(lookup: F) -> GitHubAuthConfig
where
    F: Fn(&str) -> Option<String>,
{
    for var in GITHUB_TOKEN_VARS {
        if let Some(token) = lookup(var).filter(|t| !t.trim().is_empty()) {
            debug!(var, "using GitHub token from environment");
            return GitHubAuthConfig {
                token: Some(token.trim().to_string()),
                source: AuthSource::EnvVar,
            };
        }
    }

    warn!("no GitHub token found; requests will be unauthenticated and rate limited");
    GitHubAuthConfig {
        token: None,
        source: AuthSource::Anonymous,
    }
}
