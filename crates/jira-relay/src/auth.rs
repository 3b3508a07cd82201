//! Basic authentication for the Jira REST API.

use base64::Engine;
use std::fmt;

/// Username and API token pair sent as an HTTP basic auth header.
#[derive(Clone)]
pub struct JiraAuth {
    username: String,
    api_token: String,
}

impl JiraAuth {
    /// Create credentials from a username (usually an email) and API token.
    pub fn new(username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_token: api_token.into(),
        }
    }

    /// The username these credentials authenticate as.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn to_basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.api_token);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

impl fmt::Debug for JiraAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraAuth")
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
