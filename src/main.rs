//! pr-deck tool server entrypoint

use anyhow::{Context, Result};
use clap::Parser;
use pr_deck::config::Config;
use pr_deck::gateway::Gateway;
use pr_deck::platform::GitHubService;
use pr_deck::server::{ToolServer, serve_stdio};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// GitHub pull request tool server with a merge UI controller
#[derive(Parser, Debug)]
#[command(name = "pr-deck", version, about)]
struct Args {
    /// Directory containing mcp-app.html (default: next to the executable)
    #[arg(long, env = "PR_DECK_UI_DIR")]
    ui_dir: Option<PathBuf>,

    /// GitHub Enterprise host, e.g. github.example.com
    #[arg(long, env = "GITHUB_HOST")]
    github_host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries protocol traffic
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config =
        Config::from_env(args.github_host, args.ui_dir).context("Failed to load configuration")?;
    info!(
        auth = %config.auth.source,
        host = config.github_host.as_deref().unwrap_or("github.com"),
        ui = %config.ui_document_path().display(),
        "starting pr-deck"
    );

    let platform = GitHubService::new(config.auth.token.as_deref(), config.github_host.as_deref())
        .context("Failed to create GitHub client")?;
    let gateway = Gateway::new(Arc::new(platform), config.ui_dir);

    serve_stdio(ToolServer::new(gateway))
        .await
        .context("Tool server failed")
}
