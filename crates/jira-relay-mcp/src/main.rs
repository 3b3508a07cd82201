//! jira-relay MCP server binary.
//!
//! Connects to the configured Jira server and serves MCP over stdio.

use anyhow::Context;
use clap::Parser;
use jira_relay::config::PartialConfig;
use jira_relay::tracker::RestTracker;
use jira_relay_mcp::{Adapter, JiraRelayServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "jira_relay=info,jira_relay_mcp=info";

/// MCP server exposing Jira issue operations as tools.
#[derive(Parser)]
#[command(name = "jira-relay-mcp", version, about)]
struct Cli {
    /// YAML file with `url`, `username` and `api-token` keys
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Jira server URL (e.g., https://example.atlassian.net)
    #[arg(long, env = "JIRA_URL")]
    url: Option<String>,

    /// Account the API token belongs to
    #[arg(long, env = "JIRA_USERNAME")]
    username: Option<String>,

    /// API token for basic authentication
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
}

impl Cli {
    /// Configuration given on the command line or through the environment.
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            url: self.url.clone(),
            username: self.username.clone(),
            api_token: self.api_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries MCP frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => PartialConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PartialConfig::default(),
    };
    let config = file.merge(cli.overrides()).resolve()?;

    tracing::info!(server = %config.url, "Starting jira-relay-mcp server");

    let tracker = RestTracker::connect(&config)
        .await
        .context("Failed to authenticate with Jira")?;

    let server = JiraRelayServer::new(Adapter::new(Arc::new(tracker)));
    server.run().await?;

    Ok(())
}
