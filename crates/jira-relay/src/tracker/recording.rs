//! In-memory [`IssueTracker`] that records every call.
//!
//! Available under `#[cfg(test)]` and with the `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! jira-relay = { version = "...", features = ["test-util"] }
//! ```
//!
//! The tracker keeps just enough state to behave like a small Jira project:
//! issues, the transitions currently available on each issue, and users. It
//! does not interpret query-language strings; `search` returns stored issues
//! in insertion order, capped at `max_results`.

use super::IssueTracker;
use crate::domain::{
    CommentPage, CreatedIssue, FieldMap, IssueKey, NamedRef, RemoteComment, RemoteFields,
    RemoteIssue, RemoteUser, Transition,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Timestamp stamped on issues and comments created by the tracker.
pub const RECORDED_TIMESTAMP: &str = "2024-01-01T00:00:00.000+0000";

/// One remote call received by a [`RecordingTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerCall {
    /// `myself`
    Myself,
    /// `get_issue`
    GetIssue(IssueKey),
    /// `create_issue` with the exact outbound fields
    CreateIssue(FieldMap),
    /// `update_fields` with the exact outbound fields
    UpdateFields {
        /// Target issue
        key: IssueKey,
        /// Fields sent
        fields: FieldMap,
    },
    /// `transitions`
    Transitions(IssueKey),
    /// `transition_issue`
    TransitionIssue {
        /// Target issue
        key: IssueKey,
        /// Executed transition
        transition_id: String,
    },
    /// `delete_issue`
    DeleteIssue(IssueKey),
    /// `add_comment`
    AddComment {
        /// Target issue
        key: IssueKey,
        /// Comment text
        body: String,
    },
    /// `search`
    Search {
        /// Query as sent
        jql: String,
        /// Requested cap
        max_results: u32,
    },
    /// `search_users`
    SearchUsers(String),
}

#[derive(Default)]
struct State {
    issues: Vec<RemoteIssue>,
    transitions: HashMap<IssueKey, Vec<Transition>>,
    users: Vec<RemoteUser>,
    user_lookups: HashMap<String, Vec<RemoteUser>>,
    failing: HashMap<IssueKey, String>,
    calls: Vec<TrackerCall>,
    next_id: u64,
}

impl State {
    fn issue_mut(&mut self, key: &IssueKey) -> Result<&mut RemoteIssue> {
        self.issues
            .iter_mut()
            .find(|issue| issue.key == key.as_str())
            .ok_or_else(|| Error::NotFound(format!("Issue does not exist: {key}")))
    }

    fn check_failing(&self, key: &IssueKey) -> Result<()> {
        match self.failing.get(key) {
            Some(message) => Err(Error::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        10_000 + self.next_id
    }
}

/// Recording in-memory tracker for tests.
#[derive(Default)]
pub struct RecordingTracker {
    state: Mutex<State>,
}

impl RecordingTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A minimal issue in status `To Do` with every optional field unset.
    #[must_use]
    pub fn sample_issue(key: &str, summary: &str) -> RemoteIssue {
        RemoteIssue {
            id: format!("id-{key}"),
            key: key.to_string(),
            self_link: Some(format!("memory://issue/{key}")),
            fields: RemoteFields {
                summary: Some(summary.to_string()),
                status: Some(NamedRef::new("To Do")),
                issuetype: Some(NamedRef::new("Task")),
                created: Some(RECORDED_TIMESTAMP.to_string()),
                updated: Some(RECORDED_TIMESTAMP.to_string()),
                ..RemoteFields::default()
            },
        }
    }

    /// A user with the given account ID and display name.
    #[must_use]
    pub fn sample_user(account_id: &str, display_name: &str) -> RemoteUser {
        RemoteUser {
            account_id: account_id.to_string(),
            display_name: display_name.to_string(),
            email_address: None,
            active: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: TrackerCall) -> MutexGuard<'_, State> {
        let mut state = self.lock();
        state.calls.push(call);
        state
    }

    /// Store an issue, replacing any issue with the same key.
    pub fn insert_issue(&self, issue: RemoteIssue) {
        let mut state = self.lock();
        state.issues.retain(|existing| existing.key != issue.key);
        state.issues.push(issue);
    }

    /// Set the transitions available on an issue.
    pub fn set_transitions(&self, key: &str, transitions: Vec<Transition>) {
        self.lock()
            .transitions
            .insert(IssueKey::new(key), transitions);
    }

    /// Add a user found by substring match on display name or email.
    pub fn add_user(&self, user: RemoteUser) {
        self.lock().users.push(user);
    }

    /// Return exactly `users` when searched with `query`.
    ///
    /// Models servers that match on an email they do not disclose.
    pub fn add_user_lookup(&self, query: &str, users: Vec<RemoteUser>) {
        self.lock().user_lookups.insert(query.to_string(), users);
    }

    /// Make every call targeting `key` fail with a server error.
    pub fn fail_issue(&self, key: &str, message: &str) {
        self.lock()
            .failing
            .insert(IssueKey::new(key), message.to_string());
    }

    /// Current state of a stored issue.
    #[must_use]
    pub fn issue(&self, key: &str) -> Option<RemoteIssue> {
        self.lock()
            .issues
            .iter()
            .find(|issue| issue.key == key)
            .cloned()
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.lock().calls.clone()
    }

    /// Number of transitions executed so far.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, TrackerCall::TransitionIssue { .. }))
            .count()
    }

    /// Forget recorded calls, keeping stored data.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

fn field_str<'a>(fields: &'a FieldMap, name: &str, inner: Option<&str>) -> Option<&'a str> {
    let value = fields.get(name)?;
    match inner {
        Some(member) => value.get(member).and_then(Value::as_str),
        None => value.as_str(),
    }
}

fn apply_fields(target: &mut RemoteFields, fields: &FieldMap) {
    if let Some(summary) = field_str(fields, "summary", None) {
        target.summary = Some(summary.to_string());
    }
    if let Some(description) = field_str(fields, "description", None) {
        target.description = Some(description.to_string());
    }
    if let Some(issue_type) = field_str(fields, "issuetype", Some("name")) {
        target.issuetype = Some(NamedRef::new(issue_type));
    }
    if let Some(priority) = field_str(fields, "priority", Some("name")) {
        target.priority = Some(NamedRef::new(priority));
    }
    if let Some(account_id) = field_str(fields, "assignee", Some("accountId")) {
        target.assignee = Some(RecordingTracker::sample_user(account_id, account_id));
    }
}

/// Keep only the fields a search response carries.
fn search_view(issue: &RemoteIssue) -> RemoteIssue {
    RemoteIssue {
        id: issue.id.clone(),
        key: issue.key.clone(),
        self_link: issue.self_link.clone(),
        fields: RemoteFields {
            summary: issue.fields.summary.clone(),
            status: issue.fields.status.clone(),
            issuetype: issue.fields.issuetype.clone(),
            assignee: issue.fields.assignee.clone(),
            updated: issue.fields.updated.clone(),
            ..RemoteFields::default()
        },
    }
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn myself(&self) -> Result<RemoteUser> {
        self.record(TrackerCall::Myself);
        Ok(Self::sample_user("recording-user", "Recording User"))
    }

    async fn get_issue(&self, key: &IssueKey) -> Result<RemoteIssue> {
        let mut state = self.record(TrackerCall::GetIssue(key.clone()));
        state.check_failing(key)?;
        Ok(state.issue_mut(key)?.clone())
    }

    async fn create_issue(&self, fields: &FieldMap) -> Result<CreatedIssue> {
        let mut state = self.record(TrackerCall::CreateIssue(fields.clone()));

        let project = field_str(fields, "project", Some("key")).ok_or_else(|| Error::Api {
            status: 400,
            message: "project: project is required".to_string(),
        })?;
        let id = state.allocate_id();
        let key = format!("{project}-{}", state.next_id);

        let mut issue = Self::sample_issue(&key, "");
        issue.id = id.to_string();
        apply_fields(&mut issue.fields, fields);

        let created = CreatedIssue {
            id: issue.id.clone(),
            key: issue.key.clone(),
            self_link: format!("memory://issue/{id}"),
        };
        issue.self_link = Some(created.self_link.clone());
        state.issues.push(issue);
        Ok(created)
    }

    async fn update_fields(&self, key: &IssueKey, fields: &FieldMap) -> Result<()> {
        let mut state = self.record(TrackerCall::UpdateFields {
            key: key.clone(),
            fields: fields.clone(),
        });
        state.check_failing(key)?;
        let issue = state.issue_mut(key)?;
        apply_fields(&mut issue.fields, fields);
        Ok(())
    }

    async fn transitions(&self, key: &IssueKey) -> Result<Vec<Transition>> {
        let mut state = self.record(TrackerCall::Transitions(key.clone()));
        state.check_failing(key)?;
        state.issue_mut(key)?;
        Ok(state.transitions.get(key).cloned().unwrap_or_default())
    }

    async fn transition_issue(&self, key: &IssueKey, transition_id: &str) -> Result<()> {
        let mut state = self.record(TrackerCall::TransitionIssue {
            key: key.clone(),
            transition_id: transition_id.to_string(),
        });
        state.check_failing(key)?;

        let target = state
            .transitions
            .get(key)
            .and_then(|available| available.iter().find(|t| t.id == transition_id))
            .map(|t| t.name.clone())
            .ok_or_else(|| Error::Api {
                status: 400,
                message: format!("Transition id '{transition_id}' is not valid for this issue."),
            })?;

        state.issue_mut(key)?.fields.status = Some(NamedRef::new(target));
        Ok(())
    }

    async fn delete_issue(&self, key: &IssueKey) -> Result<()> {
        let mut state = self.record(TrackerCall::DeleteIssue(key.clone()));
        state.check_failing(key)?;
        state.issue_mut(key)?;
        state.issues.retain(|issue| issue.key != key.as_str());
        state.transitions.remove(key);
        Ok(())
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> Result<RemoteComment> {
        let mut state = self.record(TrackerCall::AddComment {
            key: key.clone(),
            body: body.to_string(),
        });
        state.check_failing(key)?;

        let id = state.allocate_id();
        let comment = RemoteComment {
            id: id.to_string(),
            body: body.to_string(),
            author: Some(Self::sample_user("recording-user", "Recording User")),
            created: RECORDED_TIMESTAMP.to_string(),
        };

        let issue = state.issue_mut(key)?;
        issue
            .fields
            .comment
            .get_or_insert_with(CommentPage::default)
            .comments
            .push(comment.clone());
        Ok(comment)
    }

    async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<RemoteIssue>> {
        let state = self.record(TrackerCall::Search {
            jql: jql.to_string(),
            max_results,
        });
        let cap = usize::try_from(max_results).unwrap_or(usize::MAX);
        Ok(state.issues.iter().take(cap).map(search_view).collect())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<RemoteUser>> {
        let state = self.record(TrackerCall::SearchUsers(query.to_string()));

        if let Some(users) = state.user_lookups.get(query) {
            return Ok(users.clone());
        }

        let needle = query.to_lowercase();
        Ok(state
            .users
            .iter()
            .filter(|user| {
                user.display_name.to_lowercase().contains(&needle)
                    || user
                        .email_address
                        .as_deref()
                        .is_some_and(|email| email.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}
