//! Remote issue tracker abstraction.
//!
//! [`IssueTracker`] has one method per REST call the relay makes. It carries
//! no adaptation logic: responses come back as the wire DTOs from
//! [`crate::domain`] and callers decide how to flatten them.
//!
//! Implementations:
//!
//! - [`RestTracker`]: the real client, backed by `reqwest`.
//! - `RecordingTracker` (feature `test-util`): in-memory fake that records
//!   every call, for testing code written against the trait.
//!
//! # Example
//!
//! ```no_run
//! use jira_relay::config::JiraConfig;
//! use jira_relay::domain::IssueKey;
//! use jira_relay::tracker::{IssueTracker, RestTracker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = JiraConfig::new("https://example.atlassian.net", "me@example.com", "token")?;
//!     let tracker = RestTracker::connect(&config).await?;
//!
//!     let issue = tracker.get_issue(&IssueKey::new("PROJ-1")).await?;
//!     println!("{}: {:?}", issue.key, issue.fields.summary);
//!     Ok(())
//! }
//! ```

use crate::domain::{
    CreatedIssue, FieldMap, IssueKey, RemoteComment, RemoteIssue, RemoteUser, Transition,
};
use crate::error::Result;
use async_trait::async_trait;

pub mod rest;

#[cfg(any(test, feature = "test-util"))]
pub mod recording;

pub use rest::RestTracker;

#[cfg(any(test, feature = "test-util"))]
pub use recording::{RecordingTracker, TrackerCall};

/// Fields requested for search hits.
pub const SEARCH_FIELDS: &[&str] = &["summary", "status", "issuetype", "assignee", "updated"];

/// Raw operations against a remote issue tracker.
///
/// Implementations must be `Send + Sync`; a single instance is shared by all
/// concurrent tool invocations and must hold no per-call mutable state.
///
/// # Errors
///
/// Every method returns `Error::Auth` for rejected credentials,
/// `Error::NotFound` for missing resources, `Error::Api` for other server
/// rejections and `Error::Http` for transport failures.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// The account the credentials belong to.
    ///
    /// Used once at startup to prove the credentials work.
    async fn myself(&self) -> Result<RemoteUser>;

    /// Fetch one issue including its embedded comments.
    async fn get_issue(&self, key: &IssueKey) -> Result<RemoteIssue>;

    /// Create an issue from the given fields.
    async fn create_issue(&self, fields: &FieldMap) -> Result<CreatedIssue>;

    /// Overwrite the given fields on an existing issue.
    async fn update_fields(&self, key: &IssueKey, fields: &FieldMap) -> Result<()>;

    /// Transitions available from the issue's current status.
    ///
    /// The list depends on where the issue currently is in its workflow.
    async fn transitions(&self, key: &IssueKey) -> Result<Vec<Transition>>;

    /// Execute a transition by ID.
    async fn transition_issue(&self, key: &IssueKey, transition_id: &str) -> Result<()>;

    /// Delete an issue.
    async fn delete_issue(&self, key: &IssueKey) -> Result<()>;

    /// Add a plain-text comment.
    async fn add_comment(&self, key: &IssueKey, body: &str) -> Result<RemoteComment>;

    /// Run a query-language search returning at most `max_results` issues.
    ///
    /// Uses the enhanced `search/jql` endpoint; Jira Cloud no longer serves
    /// the plain `search` endpoint.
    ///
    /// Only the [`SEARCH_FIELDS`] are populated on the returned issues.
    async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<RemoteIssue>>;

    /// Find users whose name or email matches `query`.
    async fn search_users(&self, query: &str) -> Result<Vec<RemoteUser>>;
}
