//! Error types for the geo tool layer.

use thiserror::Error;
use waypoint_pipeline::TransportError;

#[derive(Debug, Error)]
pub enum GeoToolError {
    /// Startup configuration problems (bad base URL, unknown tool names in
    /// the enable/disable filter).
    #[error("config error: {0}")]
    Config(String),

    /// Tool arguments that fail schema-level expectations.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A delivered non-2xx response from the remote API. Interpretation of
    /// the body is left to this layer; the pipeline never reads it.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Retry exhaustion or terminal transport failure from the pipeline.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx response whose body did not parse as expected.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, GeoToolError>;
