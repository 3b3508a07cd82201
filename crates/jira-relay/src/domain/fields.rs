//! Outbound `fields` payloads for issue create and edit calls.
//!
//! Jira rejects keys that are not on an issue type's screen, so optional
//! fields must be left out of the payload entirely rather than sent as
//! `null`. [`FieldMapBuilder`] starts from the required fields and appends
//! each optional field only when a value was provided.

use super::{provided, IssueUpdate, NewIssue};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Immutable `fields` object sent to the create and edit endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(Map<String, Value>);

impl FieldMap {
    /// Start building an empty field map.
    #[must_use]
    pub fn builder() -> FieldMapBuilder {
        FieldMapBuilder::default()
    }

    /// Fields for `POST /rest/api/2/issue`.
    ///
    /// Always contains `project`, `summary`, `description` and `issuetype`;
    /// `priority` and `assignee` only when given.
    #[must_use]
    pub fn for_create(issue: &NewIssue) -> Self {
        Self::builder()
            .keyed("project", &issue.project_key)
            .text("summary", &issue.summary)
            .text("description", &issue.description)
            .named("issuetype", &issue.issue_type)
            .named_opt("priority", issue.priority.as_deref())
            .account_opt("assignee", issue.assignee_id.as_deref())
            .build()
    }

    /// Fields for `PUT /rest/api/2/issue/{key}`.
    ///
    /// Contains only the fields the update actually changes. The status is
    /// not a field; it is handled through transitions.
    #[must_use]
    pub fn for_update(update: &IssueUpdate) -> Self {
        Self::builder()
            .text_opt("summary", update.summary.as_deref())
            .text_opt("description", update.description.as_deref())
            .named_opt("priority", update.priority.as_deref())
            .account_opt("assignee", update.assignee_id.as_deref())
            .build()
    }

    /// Whether the map carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the named field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Value of the named field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The map as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Builder for [`FieldMap`].
#[derive(Debug, Default)]
pub struct FieldMapBuilder {
    fields: Map<String, Value>,
}

impl FieldMapBuilder {
    /// Plain string field: `"name": "value"`.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), Value::from(value));
        self
    }

    /// Reference by display name: `"name": {"name": "value"}`.
    #[must_use]
    pub fn named(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), json!({ "name": value }));
        self
    }

    /// Reference by key: `"name": {"key": "value"}`.
    #[must_use]
    pub fn keyed(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), json!({ "key": value }));
        self
    }

    /// Reference to a user account: `"name": {"accountId": "value"}`.
    #[must_use]
    pub fn account(mut self, name: &str, account_id: &str) -> Self {
        self.fields
            .insert(name.to_string(), json!({ "accountId": account_id }));
        self
    }

    /// [`text`](Self::text) when a non-empty value is provided.
    #[must_use]
    pub fn text_opt(self, name: &str, value: Option<&str>) -> Self {
        match provided(value) {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    /// [`named`](Self::named) when a non-empty value is provided.
    #[must_use]
    pub fn named_opt(self, name: &str, value: Option<&str>) -> Self {
        match provided(value) {
            Some(v) => self.named(name, v),
            None => self,
        }
    }

    /// [`account`](Self::account) when a non-empty value is provided.
    #[must_use]
    pub fn account_opt(self, name: &str, account_id: Option<&str>) -> Self {
        match provided(account_id) {
            Some(v) => self.account(name, v),
            None => self,
        }
    }

    /// Freeze the collected fields.
    #[must_use]
    pub fn build(self) -> FieldMap {
        FieldMap(self.fields)
    }
}
