//! Error types for the jira-relay MCP server.

use thiserror::Error;

/// Errors that can occur in the jira-relay MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the Jira REST layer.
    #[error("Jira error: {0}")]
    Tracker(#[from] jira_relay::Error),

    /// MCP protocol error.
    #[error("MCP error: {0}")]
    Mcp(String),
}

/// Result type for jira-relay MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
