//! MCP server for Jira.
//!
//! This crate exposes a Jira server's issue operations to MCP clients as
//! tools, served over stdio.
//!
//! # Architecture
//!
//! [`JiraRelayServer`] binds each tool to an [`Adapter`] operation. The
//! adapter holds a shared [`jira_relay::tracker::IssueTracker`] handle and
//! flattens Jira's nested responses into the records in [`models`].
//!
//! # Tools
//!
//! ## Issues
//! - `get_issue` - Fetch an issue with its comments
//! - `create_issue` - Create an issue
//! - `update_issue` - Change fields and/or move to a new status
//! - `delete_issue` - Delete an issue
//! - `add_comment` - Comment on an issue
//!
//! ## Queries
//! - `search_issues` - Search with JQL
//! - `get_user` - Look up a user by email

pub mod adapter;
pub mod error;
pub mod models;
pub mod server;

pub use adapter::Adapter;
pub use error::{Error, Result};
pub use server::JiraRelayServer;
