//! MCP surface: routes list/call requests to the tool registry.

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::Value;
use std::sync::Arc;
use waypoint_geo_tools::{GeoToolError, ToolRegistry};

#[derive(Clone)]
pub struct WaypointServer {
    registry: Arc<ToolRegistry>,
}

impl WaypointServer {
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for WaypointServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "waypoint-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(
                "Geospatial tools backed by a remote mapping API: geocoding, reverse \
                 geocoding, routing, nearby search and timezone lookup. All operations \
                 are read-only."
                    .to_string(),
            ),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.registry.list(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = Value::Object(request.arguments.unwrap_or_default());
        match self.registry.call(&request.name, arguments).await {
            Ok(result) => Ok(result),
            Err(err) => tool_error_to_mcp(&request.name, err),
        }
    }
}

/// Map tool-layer errors to the MCP surface. Upstream API errors and
/// transport exhaustion become agent-visible error results; argument and
/// internal problems become protocol errors.
fn tool_error_to_mcp(tool: &str, err: GeoToolError) -> Result<CallToolResult, McpError> {
    match err {
        GeoToolError::InvalidArguments(msg) => Err(ErrorData::invalid_params(msg, None)),
        GeoToolError::Config(msg) | GeoToolError::Decode(msg) => {
            tracing::error!(tool, error = %msg, "tool call failed internally");
            Err(ErrorData::internal_error(msg, None))
        }
        err @ (GeoToolError::Api { .. } | GeoToolError::Transport(_)) => {
            tracing::warn!(tool, error = %err, "tool call failed upstream");
            Ok(CallToolResult {
                content: vec![Content::text(err.to_string())],
                structured_content: None,
                is_error: Some(true),
                meta: None,
            })
        }
    }
}
