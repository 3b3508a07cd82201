//! Domain types for the Jira REST layer.
//!
//! This module holds three groups of types:
//!
//! - Request records ([`NewIssue`], [`IssueUpdate`]) describing what a caller
//!   wants to change.
//! - Wire DTOs (`Remote*`, [`Transition`], [`CreatedIssue`]) mirroring the
//!   JSON returned by the REST v2 API. Every field the server may omit or null
//!   out is an `Option` with `#[serde(default)]`.
//! - [`FieldMap`], the outbound `fields` payload for create and edit calls.

use serde::{Deserialize, Serialize};
use std::fmt;

mod fields;

pub use fields::{FieldMap, FieldMapBuilder};

/// Project-scoped issue key (e.g. `PROJ-123`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(pub String);

impl IssueKey {
    /// Create a new issue key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Returns the value only when it is present and non-empty.
///
/// Optional string arguments that arrive as `""` are treated as absent.
#[must_use]
pub fn provided(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Data for creating a new issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    /// Key of the project the issue is created in (e.g. `PROJ`)
    pub project_key: String,

    /// Issue summary
    pub summary: String,

    /// Issue description
    pub description: String,

    /// Issue type name (e.g. `Bug`, `Story`)
    pub issue_type: String,

    /// Priority name (e.g. `High`)
    pub priority: Option<String>,

    /// Account ID of the assignee
    pub assignee_id: Option<String>,
}

/// Changes to apply to an existing issue.
///
/// `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdate {
    /// Key of the issue to update
    pub issue_key: IssueKey,

    /// New summary
    pub summary: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority name
    pub priority: Option<String>,

    /// New assignee account ID
    pub assignee_id: Option<String>,

    /// Target workflow status, reached through a transition
    pub status: Option<String>,
}

impl IssueUpdate {
    /// Whether any plain field (not the status) is being changed.
    #[must_use]
    pub fn has_field_changes(&self) -> bool {
        [
            &self.summary,
            &self.description,
            &self.priority,
            &self.assignee_id,
        ]
        .into_iter()
        .any(|field| provided(field.as_deref()).is_some())
    }

    /// The requested target status, if one was given.
    #[must_use]
    pub fn requested_status(&self) -> Option<&str> {
        provided(self.status.as_deref())
    }
}

/// An issue as returned by `GET /rest/api/2/issue/{key}` and by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// Numeric issue ID (as a string)
    pub id: String,

    /// Issue key
    pub key: String,

    /// REST self-link
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,

    /// Field values
    #[serde(default)]
    pub fields: RemoteFields,
}

/// The `fields` object of a [`RemoteIssue`].
///
/// Search responses only carry the fields that were requested, so every
/// member tolerates being absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteFields {
    /// Issue summary
    #[serde(default)]
    pub summary: Option<String>,

    /// Plain-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Current workflow status
    #[serde(default)]
    pub status: Option<NamedRef>,

    /// Issue type
    #[serde(default)]
    pub issuetype: Option<NamedRef>,

    /// Priority, null when the project has no priority scheme
    #[serde(default)]
    pub priority: Option<NamedRef>,

    /// Assignee, null when unassigned
    #[serde(default)]
    pub assignee: Option<RemoteUser>,

    /// Reporter, null when the reporter was removed
    #[serde(default)]
    pub reporter: Option<RemoteUser>,

    /// Creation timestamp
    #[serde(default)]
    pub created: Option<String>,

    /// Last update timestamp
    #[serde(default)]
    pub updated: Option<String>,

    /// Embedded comments; absent unless the comment field was returned
    #[serde(default)]
    pub comment: Option<CommentPage>,
}

/// Any object identified by a display `name` (status, issue type, priority).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Display name
    pub name: String,
}

impl NamedRef {
    /// Create a reference with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A user as returned by user search or embedded in an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    /// Atlassian account ID
    #[serde(default)]
    pub account_id: String,

    /// Display name
    #[serde(default)]
    pub display_name: String,

    /// Email, hidden by the server for most privacy settings
    #[serde(default)]
    pub email_address: Option<String>,

    /// Whether the account is active
    #[serde(default)]
    pub active: bool,
}

/// The comment container embedded under `fields.comment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPage {
    /// Comments in server order
    #[serde(default)]
    pub comments: Vec<RemoteComment>,
}

/// A single issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    /// Comment ID
    pub id: String,

    /// Comment text
    #[serde(default)]
    pub body: String,

    /// Author, absent for anonymized users
    #[serde(default)]
    pub author: Option<RemoteUser>,

    /// Creation timestamp
    #[serde(default)]
    pub created: String,
}

/// A workflow transition currently available on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Transition ID, used to execute it
    pub id: String,

    /// Display name matched against requested statuses
    pub name: String,
}

impl Transition {
    /// Create a transition with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Response body of `POST /rest/api/2/issue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// Numeric issue ID
    pub id: String,

    /// Assigned issue key
    pub key: String,

    /// REST self-link
    #[serde(rename = "self", default)]
    pub self_link: String,
}
