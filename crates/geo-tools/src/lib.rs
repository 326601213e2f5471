//! Geospatial MCP tools for Waypoint.
//!
//! Declarative glue over the policy pipeline: per-tool input schemas,
//! request/response shaping for the remote geospatial API, and a static
//! registry with CLI-driven enable/disable filtering. Every network call
//! goes through the injected [`waypoint_pipeline::Pipeline`].

pub mod api;
pub mod coords;
pub mod error;
pub mod registry;
pub mod tools;

pub use api::{GeoApi, GeoApiConfig};
pub use coords::Coordinate;
pub use error::GeoToolError;
pub use registry::{GeoTool, ToolRegistry};
