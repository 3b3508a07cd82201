//! MCP request and response models.
//!
//! Parameter structs define the input schema of each tool. Response records
//! are the flat shapes returned to the caller; the `From` impls here are the
//! normalization from Jira's nested wire types.

use jira_relay::domain::{CreatedIssue, NamedRef, RemoteComment, RemoteIssue, RemoteUser};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default number of results for `search_issues`.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

// ============================================================================
// Tool parameters
// ============================================================================

/// Parameters for the `get_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// The JIRA issue key (e.g., PROJ-123)
    pub issue_key: String,
}

/// Parameters for the `create_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// The project key (e.g., PROJ)
    pub project_key: String,

    /// Issue summary
    pub summary: String,

    /// Issue description
    pub description: String,

    /// Issue type (e.g., Bug, Story)
    pub issue_type: String,

    /// Priority (e.g., High, Medium)
    pub priority: Option<String>,

    /// Account ID of assignee
    pub assignee_id: Option<String>,
}

/// Parameters for the `update_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// The issue key to update
    pub issue_key: String,

    /// New summary
    pub summary: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status; matched case-insensitively against the transitions currently available
    pub status: Option<String>,

    /// New priority
    pub priority: Option<String>,

    /// New assignee account ID
    pub assignee_id: Option<String>,
}

/// Parameters for the `delete_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteIssueParams {
    /// The issue key to delete
    pub issue_key: String,
}

/// Parameters for the `add_comment` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// The issue key
    pub issue_key: String,

    /// Comment text
    pub body: String,
}

/// Parameters for the `search_issues` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    /// JQL query string
    pub jql: String,

    /// Maximum number of results to return (default: 10)
    pub max_results: Option<u32>,
}

/// Parameters for the `get_user` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetUserParams {
    /// User email
    pub email: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Full read model of one issue.
///
/// Optional fields serialize as `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssueSummary {
    /// Issue key
    pub key: String,

    /// Issue ID
    pub id: String,

    /// Issue summary
    pub summary: String,

    /// Issue description
    pub description: Option<String>,

    /// Status name
    pub status: String,

    /// Issue type name
    pub issue_type: String,

    /// Priority name
    pub priority: Option<String>,

    /// Assignee display name
    pub assignee: Option<String>,

    /// Reporter display name
    pub reporter: Option<String>,

    /// Creation timestamp
    pub created: String,

    /// Last update timestamp
    pub updated: String,

    /// Comments in server order
    pub comments: Vec<Comment>,
}

impl From<RemoteIssue> for IssueSummary {
    fn from(issue: RemoteIssue) -> Self {
        let fields = issue.fields;
        Self {
            key: issue.key,
            id: issue.id,
            summary: fields.summary.unwrap_or_default(),
            description: fields.description,
            status: name_of(fields.status),
            issue_type: name_of(fields.issuetype),
            priority: fields.priority.map(|p| p.name),
            assignee: fields.assignee.map(|u| u.display_name),
            reporter: fields.reporter.map(|u| u.display_name),
            created: fields.created.unwrap_or_default(),
            updated: fields.updated.unwrap_or_default(),
            comments: fields
                .comment
                .map(|page| page.comments.into_iter().map(Into::into).collect())
                .unwrap_or_default(),
        }
    }
}

/// Failure shape returned by `get_issue` instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssueLookupFailure {
    /// Error text
    pub error: String,

    /// The key that was requested
    pub issue_key: String,
}

/// Result of `get_issue`: the issue, or a structured failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IssueLookup {
    /// The issue was fetched.
    Found(IssueSummary),
    /// The fetch failed.
    Failed(IssueLookupFailure),
}

/// An issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    /// Comment ID
    pub id: String,

    /// Comment text
    pub body: String,

    /// Author display name; empty when the author is unknown
    pub author: String,

    /// Creation timestamp
    pub created: String,
}

impl From<RemoteComment> for Comment {
    fn from(comment: RemoteComment) -> Self {
        Self {
            id: comment.id,
            body: comment.body,
            author: comment
                .author
                .map(|a| a.display_name)
                .unwrap_or_default(),
            created: comment.created,
        }
    }
}

/// Abbreviated issue returned by `search_issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    /// Issue key
    pub key: String,

    /// Issue summary
    pub summary: String,

    /// Status name
    pub status: String,

    /// Issue type name
    pub issue_type: String,

    /// Assignee display name
    pub assignee: Option<String>,

    /// Last update timestamp
    pub updated: String,
}

impl From<RemoteIssue> for SearchHit {
    fn from(issue: RemoteIssue) -> Self {
        let fields = issue.fields;
        Self {
            key: issue.key,
            summary: fields.summary.unwrap_or_default(),
            status: name_of(fields.status),
            issue_type: name_of(fields.issuetype),
            assignee: fields.assignee.map(|u| u.display_name),
            updated: fields.updated.unwrap_or_default(),
        }
    }
}

/// Response from the `create_issue` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreatedIssueResponse {
    /// Assigned issue key
    pub key: String,

    /// Issue ID
    pub id: String,

    /// REST self-link of the new issue
    #[serde(rename = "self")]
    pub self_link: String,
}

impl From<CreatedIssue> for CreatedIssueResponse {
    fn from(created: CreatedIssue) -> Self {
        Self {
            key: created.key,
            id: created.id,
            self_link: created.self_link,
        }
    }
}

/// Response from the `update_issue` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UpdatedIssueResponse {
    /// The updated issue key
    pub key: String,

    /// Always `true`
    pub updated: bool,
}

/// Response from the `delete_issue` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeletedIssueResponse {
    /// Always `true`
    pub deleted: bool,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserSummary {
    /// Account ID
    pub account_id: String,

    /// Display name
    pub display_name: String,

    /// Email address
    pub email: Option<String>,

    /// Whether the account is active
    pub active: bool,
}

impl UserSummary {
    /// Flatten a user, using `fallback_email` when the server hides the email.
    #[must_use]
    pub fn from_remote(user: RemoteUser, fallback_email: &str) -> Self {
        Self {
            account_id: user.account_id,
            display_name: user.display_name,
            email: Some(
                user.email_address
                    .unwrap_or_else(|| fallback_email.to_string()),
            ),
            active: user.active,
        }
    }
}

/// Marker returned by `get_user` when no account matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserNotFound {
    /// Always `false`
    pub found: bool,
}

/// Result of `get_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum UserLookup {
    /// A matching account.
    Found(UserSummary),
    /// No account matched.
    NotFound(UserNotFound),
}

fn name_of(named: Option<NamedRef>) -> String {
    named.map(|n| n.name).unwrap_or_default()
}
