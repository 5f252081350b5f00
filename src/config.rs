//! Server configuration
//!
//! There is no config file. Values come from command-line flags (which clap
//! also reads from the environment) and the GitHub token variables.

use crate::auth::{GitHubAuthConfig, get_github_auth};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// File name of the UI document inside the UI directory
pub const UI_DOCUMENT_FILE: &str = "mcp-app.html";

/// Runtime configuration for the tool server
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub credentials
    pub auth: GitHubAuthConfig,
    /// GitHub Enterprise host (None for github.com)
    pub github_host: Option<String>,
    /// Directory holding the UI document
    pub ui_dir: PathBuf,
}

impl Config {
    /// Build configuration from explicit values and a key lookup for secrets.
    ///
    /// `ui_dir` falls back to the directory containing the running executable.
    pub fn from_lookup<F>(
        lookup: F,
        github_host: Option<String>,
        ui_dir: Option<PathBuf>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ui_dir = match ui_dir {
            Some(dir) => dir,
            None => default_ui_dir()?,
        };
        let github_host = github_host
            .map(|h| h.trim().trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty());

        Ok(Self {
            auth: get_github_auth(lookup),
            github_host,
            ui_dir,
        })
    }

    /// Build configuration reading secrets from the process environment
    pub fn from_env(github_host: Option<String>, ui_dir: Option<PathBuf>) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), github_host, ui_dir)
    }

    /// Full path of the UI document
    pub fn ui_document_path(&self) -> PathBuf {
        ui_document_path(&self.ui_dir)
    }
}

/// Path of the UI document inside `ui_dir`
pub fn ui_document_path(ui_dir: &Path) -> PathBuf {
    ui_dir.join(UI_DOCUMENT_FILE)
}

fn default_ui_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::Internal(format!("{} has no parent directory", exe.display())))
}
