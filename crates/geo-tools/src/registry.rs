//! Tool trait and the static registry.

use crate::api::GeoApi;
use crate::error::{GeoToolError, Result};
use crate::tools::geocode::GeocodeAddress;
use crate::tools::reverse::ReverseGeocode;
use crate::tools::routing::RouteDirections;
use crate::tools::search::SearchNearby;
use crate::tools::timezone::TimezoneByCoordinates;
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// One callable geospatial operation. Implementations consume the injected
/// [`GeoApi`] only; they never invoke the transport directly.
#[async_trait]
pub trait GeoTool: Send + Sync {
    fn name(&self) -> &'static str;

    /// MCP tool definition (description, input schema, annotations).
    fn definition(&self) -> Tool;

    /// Execute the tool with already-routed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`GeoToolError`] for bad arguments, upstream API errors, or
    /// transport exhaustion.
    async fn call(&self, arguments: Value) -> Result<CallToolResult>;
}

/// Static, ordered set of tool instances. Fixed after construction.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn GeoTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// All tools this server ships, bound to `api`.
    #[must_use]
    pub fn standard(api: Arc<GeoApi>) -> Self {
        let tools: Vec<Arc<dyn GeoTool>> = vec![
            Arc::new(GeocodeAddress::new(Arc::clone(&api))),
            Arc::new(ReverseGeocode::new(Arc::clone(&api))),
            Arc::new(RouteDirections::new(Arc::clone(&api))),
            Arc::new(SearchNearby::new(Arc::clone(&api))),
            Arc::new(TimezoneByCoordinates::new(api)),
        ];
        Self { tools }
    }

    /// Apply the CLI enable/disable filter. An explicit enable list wins
    /// over the default-all set; disables are subtracted afterwards.
    ///
    /// # Errors
    ///
    /// Returns a config error when either list names a tool that does not
    /// exist, or when filtering leaves no tools at all.
    pub fn filtered(self, enabled: Option<&[String]>, disabled: &[String]) -> Result<Self> {
        let known: HashSet<&str> = self.tools.iter().map(|t| t.name()).collect();
        for name in enabled.unwrap_or_default().iter().chain(disabled) {
            if !known.contains(name.as_str()) {
                return Err(GeoToolError::Config(format!("unknown tool '{name}'")));
            }
        }

        let enabled: Option<HashSet<&str>> =
            enabled.map(|list| list.iter().map(String::as_str).collect());
        let disabled: HashSet<&str> = disabled.iter().map(String::as_str).collect();

        let tools: Vec<Arc<dyn GeoTool>> = self
            .tools
            .into_iter()
            .filter(|t| {
                enabled.as_ref().is_none_or(|e| e.contains(t.name()))
                    && !disabled.contains(t.name())
            })
            .collect();

        if tools.is_empty() {
            return Err(GeoToolError::Config(
                "tool filter leaves no tools enabled".to_string(),
            ));
        }
        Ok(Self { tools })
    }

    #[must_use]
    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Route a call to the named tool.
    ///
    /// # Errors
    ///
    /// `InvalidArguments` for an unknown tool name; otherwise whatever the
    /// tool itself returns.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| GeoToolError::InvalidArguments(format!("unknown tool '{name}'")))?;
        tracing::debug!(tool = name, "dispatching tool call");
        tool.call(arguments).await
    }
}

/// Annotations for the read-only GET operations this server exposes.
#[must_use]
pub(crate) fn read_only_annotations() -> ToolAnnotations {
    ToolAnnotations {
        title: None,
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    }
}

pub(crate) fn schema_object(schema: Value) -> Arc<JsonObject> {
    Arc::new(schema.as_object().cloned().unwrap_or_else(JsonObject::new))
}

pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| GeoToolError::InvalidArguments(e.to_string()))
}

/// Wrap a shaped JSON payload as a text tool result.
pub(crate) fn json_result(body: &Value) -> CallToolResult {
    let text = serde_json::to_string(body).unwrap_or_else(|_| body.to_string());
    CallToolResult::success(vec![Content::text(text)])
}
