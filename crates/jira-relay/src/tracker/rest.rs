//! `reqwest`-backed [`IssueTracker`] for the Jira REST API v2.

use super::{IssueTracker, SEARCH_FIELDS};
use crate::auth::JiraAuth;
use crate::config::JiraConfig;
use crate::domain::{
    CreatedIssue, FieldMap, IssueKey, RemoteComment, RemoteIssue, RemoteUser, Transition,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

/// Path prefix of every REST v2 endpoint, relative to the server URL.
const API_PREFIX: [&str; 3] = ["rest", "api", "2"];

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    issues: Vec<RemoteIssue>,
}

#[derive(Deserialize)]
struct TransitionList {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

/// Jira client holding one authenticated HTTP connection pool.
///
/// Cheap to share behind an `Arc`; it holds no per-request state.
#[derive(Debug, Clone)]
pub struct RestTracker {
    client: Client,
    base_url: Url,
    auth: JiraAuth,
}

impl RestTracker {
    /// Build a client for the configured server without contacting it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid configuration, `Error::InvalidUrl`
    /// if the URL cannot carry a path, or `Error::Http` if the HTTP client
    /// cannot be built.
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jira-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(config, client)
    }

    /// Like [`RestTracker::new`], with a caller-built `reqwest` client
    /// (custom TLS roots, proxies).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid configuration or
    /// `Error::InvalidUrl` if the URL cannot carry a path.
    pub fn with_client(config: &JiraConfig, client: Client) -> Result<Self> {
        config.validate()?;

        let base_url =
            Url::parse(config.url.trim()).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(config.url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            auth: JiraAuth::new(&config.username, &config.api_token),
        })
    }

    /// Build a client and verify the credentials against the server.
    ///
    /// # Errors
    ///
    /// Everything [`RestTracker::new`] returns, plus the errors of
    /// [`RestTracker::verify`].
    pub async fn connect(config: &JiraConfig) -> Result<Self> {
        Self::new(config)?.verify().await
    }

    /// Establish identity with the server by fetching the current account.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` when the server rejects the credentials and
    /// `Error::Http` when it is unreachable.
    pub async fn verify(self) -> Result<Self> {
        let me = self.myself().await?;
        info!(
            server = %self.base_url,
            account = %me.display_name,
            "Authenticated with Jira"
        );
        Ok(self)
    }

    /// The server this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "Jira request");
        self.client
            .request(method, url)
            .header(AUTHORIZATION, self.auth.to_basic_auth())
            .header(ACCEPT, "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let error = error_for_status(status, &body);
        warn!(status = status.as_u16(), %path, error = %error, "Jira request failed");
        Err(error)
    }

    async fn read_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success response to an [`Error`].
fn error_for_status(status: StatusCode, body: &str) -> Error {
    let message = api_error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extract the human-readable messages from a Jira error body.
///
/// Jira reports problems as `{"errorMessages": [...], "errors": {field: msg}}`.
/// Returns `None` when the body is not in that shape or carries no messages.
fn api_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;

    let mut messages = parsed.error_messages;
    messages.extend(parsed.errors.into_iter().map(|(field, value)| match value {
        serde_json::Value::String(text) => format!("{field}: {text}"),
        other => format!("{field}: {other}"),
    }));

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

#[async_trait]
impl IssueTracker for RestTracker {
    async fn myself(&self) -> Result<RemoteUser> {
        let url = self.endpoint(&["myself"])?;
        self.read_json(self.request(Method::GET, url)).await
    }

    async fn get_issue(&self, key: &IssueKey) -> Result<RemoteIssue> {
        let url = self.endpoint(&["issue", key.as_str()])?;
        self.read_json(self.request(Method::GET, url)).await
    }

    async fn create_issue(&self, fields: &FieldMap) -> Result<CreatedIssue> {
        let url = self.endpoint(&["issue"])?;
        let request = self
            .request(Method::POST, url)
            .json(&json!({ "fields": fields }));
        self.read_json(request).await
    }

    async fn update_fields(&self, key: &IssueKey, fields: &FieldMap) -> Result<()> {
        let url = self.endpoint(&["issue", key.as_str()])?;
        let request = self
            .request(Method::PUT, url)
            .json(&json!({ "fields": fields }));
        self.execute(request).await?;
        Ok(())
    }

    async fn transitions(&self, key: &IssueKey) -> Result<Vec<Transition>> {
        let url = self.endpoint(&["issue", key.as_str(), "transitions"])?;
        let list: TransitionList = self.read_json(self.request(Method::GET, url)).await?;
        Ok(list.transitions)
    }

    async fn transition_issue(&self, key: &IssueKey, transition_id: &str) -> Result<()> {
        let url = self.endpoint(&["issue", key.as_str(), "transitions"])?;
        let request = self
            .request(Method::POST, url)
            .json(&json!({ "transition": { "id": transition_id } }));
        self.execute(request).await?;
        Ok(())
    }

    async fn delete_issue(&self, key: &IssueKey) -> Result<()> {
        let url = self.endpoint(&["issue", key.as_str()])?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> Result<RemoteComment> {
        let url = self.endpoint(&["issue", key.as_str(), "comment"])?;
        let request = self
            .request(Method::POST, url)
            .json(&json!({ "body": body }));
        self.read_json(request).await
    }

    async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<RemoteIssue>> {
        let mut url = self.endpoint(&["search", "jql"])?;
        url.query_pairs_mut()
            .append_pair("jql", jql)
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("fields", &SEARCH_FIELDS.join(","));
        let page: SearchPage = self.read_json(self.request(Method::GET, url)).await?;
        Ok(page.issues)
    }

    async fn search_users(&self, query: &str) -> Result<Vec<RemoteUser>> {
        let mut url = self.endpoint(&["user", "search"])?;
        url.query_pairs_mut().append_pair("query", query);
        self.read_json(self.request(Method::GET, url)).await
    }
}
