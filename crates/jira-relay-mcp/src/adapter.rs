//! Tool operations on top of an [`IssueTracker`].
//!
//! The adapter turns tool arguments into tracker calls and the tracker's wire
//! DTOs into the flat records in [`crate::models`]. It holds no state beyond
//! the shared tracker handle, so concurrent invocations need no locking.

use crate::error::Result;
use crate::models::{
    Comment, CreatedIssueResponse, DeletedIssueResponse, IssueLookup, IssueLookupFailure,
    IssueSummary, SearchHit, UpdatedIssueResponse, UserLookup, UserNotFound, UserSummary,
    DEFAULT_MAX_RESULTS,
};
use jira_relay::domain::{FieldMap, IssueKey, IssueUpdate, NewIssue, Transition};
use jira_relay::tracker::IssueTracker;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Find the transition whose name equals `status`, ignoring case.
///
/// The first match in server order wins.
#[must_use]
pub fn resolve_transition<'a>(
    transitions: &'a [Transition],
    status: &str,
) -> Option<&'a Transition> {
    let wanted = status.to_lowercase();
    transitions
        .iter()
        .find(|transition| transition.name.to_lowercase() == wanted)
}

/// Jira operations exposed as MCP tools.
#[derive(Clone)]
pub struct Adapter {
    tracker: Arc<dyn IssueTracker>,
}

impl Adapter {
    /// Create an adapter over the given tracker.
    #[must_use]
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    /// Fetch one issue with its comments.
    ///
    /// Never fails: an upstream fault is logged and returned as an
    /// [`IssueLookupFailure`] naming the requested key.
    pub async fn get_issue(&self, issue_key: &str) -> IssueLookup {
        let key = IssueKey::new(issue_key);
        match self.tracker.get_issue(&key).await {
            Ok(issue) => IssueLookup::Found(IssueSummary::from(issue)),
            Err(e) => {
                error!(issue_key, error = %e, "Failed to fetch issue");
                IssueLookup::Failed(IssueLookupFailure {
                    error: e.to_string(),
                    issue_key: issue_key.to_string(),
                })
            }
        }
    }

    /// Create an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the issue or is unreachable.
    pub async fn create_issue(&self, issue: NewIssue) -> Result<CreatedIssueResponse> {
        let fields = FieldMap::for_create(&issue);
        let created = self.tracker.create_issue(&fields).await?;
        info!(key = %created.key, project = %issue.project_key, "Created issue");
        Ok(created.into())
    }

    /// Apply field changes and, if requested, move the issue to a new status.
    ///
    /// The status is matched case-insensitively against the transitions
    /// available right now. An unmatched status is not an error; the issue
    /// simply stays where it is.
    ///
    /// # Errors
    ///
    /// Returns an error if any upstream call fails. A field update that
    /// already succeeded is not rolled back.
    pub async fn update_issue(&self, update: IssueUpdate) -> Result<UpdatedIssueResponse> {
        let key = &update.issue_key;

        if update.has_field_changes() {
            let fields = FieldMap::for_update(&update);
            self.tracker.update_fields(key, &fields).await?;
            debug!(%key, fields = fields.len(), "Updated issue fields");
        }

        if let Some(status) = update.requested_status() {
            let transitions = self.tracker.transitions(key).await?;
            match resolve_transition(&transitions, status) {
                Some(transition) => {
                    self.tracker.transition_issue(key, &transition.id).await?;
                    info!(%key, status = %transition.name, "Transitioned issue");
                }
                None => {
                    debug!(
                        %key,
                        status,
                        available = transitions.len(),
                        "No transition matches requested status"
                    );
                }
            }
        }

        Ok(UpdatedIssueResponse {
            key: key.to_string(),
            updated: true,
        })
    }

    /// Delete an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue does not exist or the server refuses.
    pub async fn delete_issue(&self, issue_key: &str) -> Result<DeletedIssueResponse> {
        let key = IssueKey::new(issue_key);
        self.tracker.delete_issue(&key).await?;
        info!(%key, "Deleted issue");
        Ok(DeletedIssueResponse { deleted: true })
    }

    /// Add a comment to an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue does not exist or the server refuses.
    pub async fn add_comment(&self, issue_key: &str, body: &str) -> Result<Comment> {
        let key = IssueKey::new(issue_key);
        let comment = self.tracker.add_comment(&key, body).await?;
        Ok(comment.into())
    }

    /// Search with a JQL query, returning at most `max_results` hits
    /// (default [`DEFAULT_MAX_RESULTS`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the query is rejected or the server is unreachable.
    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: Option<u32>,
    ) -> Result<Vec<SearchHit>> {
        let limit = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        let issues = self.tracker.search(jql, limit).await?;
        let cap = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(issues.into_iter().take(cap).map(SearchHit::from).collect())
    }

    /// Look up a user by email. The first match wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the user search call fails.
    pub async fn get_user(&self, email: &str) -> Result<UserLookup> {
        let users = self.tracker.search_users(email).await?;
        Ok(users.into_iter().next().map_or_else(
            || UserLookup::NotFound(UserNotFound::default()),
            |user| UserLookup::Found(UserSummary::from_remote(user, email)),
        ))
    }
}
