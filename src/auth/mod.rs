//! Authentication for GitHub
//!
//! A single static token is read from the process environment at startup.
//! There is no per-request negotiation and no refresh.

mod github;

pub use github::{GITHUB_TOKEN_VARS, GitHubAuthConfig, get_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from environment variable
    EnvVar,
    /// No token found; requests go out unauthenticated
    Anonymous,
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar => write!(f, "environment"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}
