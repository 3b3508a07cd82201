//! Jira REST layer for the jira-relay MCP server.
//!
//! This crate owns everything that talks to the Jira server: configuration,
//! credentials, the wire types of the REST v2 API, and the [`IssueTracker`]
//! trait with its `reqwest` implementation. It performs no response
//! normalization; that belongs to the MCP adapter built on top of it.
//!
//! [`IssueTracker`]: tracker::IssueTracker

#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod tracker;

pub use error::{Error, Result};
