//! MCP server implementation.
//!
//! Binds each adapter operation to an rmcp tool and serves them over stdio.

use crate::adapter::Adapter;
use crate::error::Error;
use crate::models::{
    AddCommentParams, CreateIssueParams, DeleteIssueParams, GetIssueParams, GetUserParams,
    SearchIssuesParams, UpdateIssueParams,
};
use jira_relay::domain::{IssueKey, IssueUpdate, NewIssue};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{
    handler::server::ServerHandler, tool, tool_handler, tool_router, ErrorData as McpError,
    ServiceExt,
};
use std::sync::Arc;

/// The jira-relay MCP server.
#[derive(Clone)]
pub struct JiraRelayServer {
    /// Tool implementations.
    adapter: Arc<Adapter>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl JiraRelayServer {
    /// Get details of a specific issue.
    #[tool(description = "Get details of a specific JIRA issue including comments")]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let issue = self.adapter.get_issue(&params.issue_key).await;
        Ok(CallToolResult::success(vec![Content::json(issue)?]))
    }

    /// Create a new issue.
    #[tool(description = "Create a new JIRA issue")]
    async fn create_issue(
        &self,
        Parameters(params): Parameters<CreateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let issue = NewIssue {
            project_key: params.project_key,
            summary: params.summary,
            description: params.description,
            issue_type: params.issue_type,
            priority: params.priority,
            assignee_id: params.assignee_id,
        };

        match self.adapter.create_issue(issue).await {
            Ok(created) => Ok(CallToolResult::success(vec![Content::json(created)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Update an existing issue.
    #[tool(
        description = "Update an existing JIRA issue. A status change is applied through the matching workflow transition."
    )]
    async fn update_issue(
        &self,
        Parameters(params): Parameters<UpdateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        let update = IssueUpdate {
            issue_key: IssueKey::new(params.issue_key),
            summary: params.summary,
            description: params.description,
            priority: params.priority,
            assignee_id: params.assignee_id,
            status: params.status,
        };

        match self.adapter.update_issue(update).await {
            Ok(updated) => Ok(CallToolResult::success(vec![Content::json(updated)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Delete an issue.
    #[tool(description = "Delete a JIRA issue")]
    async fn delete_issue(
        &self,
        Parameters(params): Parameters<DeleteIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.adapter.delete_issue(&params.issue_key).await {
            Ok(deleted) => Ok(CallToolResult::success(vec![Content::json(deleted)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Add a comment to an issue.
    #[tool(description = "Add a comment to a JIRA issue")]
    async fn add_comment(
        &self,
        Parameters(params): Parameters<AddCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .adapter
            .add_comment(&params.issue_key, &params.body)
            .await
        {
            Ok(comment) => Ok(CallToolResult::success(vec![Content::json(comment)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Search issues with JQL.
    #[tool(description = "Search JIRA issues using JQL")]
    async fn search_issues(
        &self,
        Parameters(params): Parameters<SearchIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .adapter
            .search_issues(&params.jql, params.max_results)
            .await
        {
            Ok(hits) => Ok(CallToolResult::success(vec![Content::json(hits)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Look up a user by email.
    #[tool(description = "Get JIRA user details by email")]
    async fn get_user(
        &self,
        Parameters(params): Parameters<GetUserParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.adapter.get_user(&params.email).await {
            Ok(user) => Ok(CallToolResult::success(vec![Content::json(user)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }
}

impl JiraRelayServer {
    /// Create a server exposing the given adapter's operations.
    #[must_use]
    pub fn new(adapter: Adapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
            tool_router: Self::tool_router(),
        }
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns `Error::Mcp` if the handshake fails or the session ends
    /// abnormally.
    pub async fn run(self) -> crate::Result<()> {
        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;

        tracing::info!("MCP session established");
        service
            .waiting()
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        tracing::info!("MCP session closed");
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for JiraRelayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jira-relay-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Jira MCP server. Read, create, update, delete and comment on issues, search with JQL, and look up users by email."
                    .into(),
            ),
        }
    }
}
