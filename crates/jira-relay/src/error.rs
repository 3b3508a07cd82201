//! Error types for jira-relay operations.

use std::io;
use thiserror::Error;

/// The error type for Jira REST operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connection refused, TLS, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server rejected the supplied credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The requested resource does not exist (or is not visible to the user).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the Jira API.
    #[error("Jira API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error text extracted from the response body.
        message: String,
    },

    /// The configured server URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// A specialized Result type for jira-relay operations.
pub type Result<T> = std::result::Result<T, Error>;
