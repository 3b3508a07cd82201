//! Connection configuration for the Jira server.
//!
//! Settings can come from a YAML file, environment variables and command line
//! flags. Each source produces a [`PartialConfig`]; sources are layered with
//! [`PartialConfig::merge`] and turned into a validated [`JiraConfig`] with
//! [`PartialConfig::resolve`].

use crate::error::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Environment variable holding the server base URL.
pub const ENV_URL: &str = "JIRA_URL";

/// Environment variable holding the username.
pub const ENV_USERNAME: &str = "JIRA_USERNAME";

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Validated settings needed to talk to one Jira server.
#[derive(Clone, PartialEq, Eq)]
pub struct JiraConfig {
    /// Server base URL (e.g. `https://example.atlassian.net`)
    pub url: String,

    /// Username, usually the account email
    pub username: String,

    /// API token
    pub api_token: String,
}

impl JiraConfig {
    /// Create a configuration and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any value is blank or the URL is not http(s).
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            url: url.into(),
            username: username.into(),
            api_token: api_token.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is present and the URL is usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        require("url", ENV_URL, &self.url)?;
        require("username", ENV_USERNAME, &self.username)?;
        require("api-token", ENV_API_TOKEN, &self.api_token)?;

        let url = Url::parse(self.url.trim())
            .map_err(|e| Error::Config(format!("Invalid server URL '{}': {e}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Server URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

fn require(field: &str, env: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!(
            "Missing {field}: set it in the config file, via {env}, or with --{field}"
        )));
    }
    Ok(())
}

/// One layer of configuration where any value may be missing.
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialConfig {
    /// Server base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// API token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl PartialConfig {
    /// Load a layer from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, or `Error::Config` if it
    /// is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Layer `other` on top of `self`; values present in `other` win.
    #[must_use]
    pub fn merge(self, other: PartialConfig) -> Self {
        Self {
            url: other.url.or(self.url),
            username: other.username.or(self.username),
            api_token: other.api_token.or(self.api_token),
        }
    }

    /// Produce a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value is missing or invalid.
    pub fn resolve(self) -> Result<JiraConfig> {
        JiraConfig::new(
            self.url.unwrap_or_default(),
            self.username.unwrap_or_default(),
            self.api_token.unwrap_or_default(),
        )
    }
}

impl fmt::Debug for PartialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
