//! Outbound HTTP policy pipeline for Waypoint MCP.
//!
//! Every tool issues its network requests through a [`Pipeline`]: an ordered
//! composition of [`Policy`] values (identification, retry, tracing)
//! terminating in an injected [`Transport`] adapter. Tools receive the bound
//! pipeline at construction and never touch the HTTP client directly, so
//! reliability and observability behavior lives in exactly one place and no
//! process-global transport state is ever mutated.

pub mod error;
pub mod identification;
pub mod model;
pub mod pipeline;
pub mod policy;
pub mod retry;
pub mod trace;
pub mod transport;

pub use error::{FailureKind, TransportError, TransportFailure};
pub use identification::IdentificationPolicy;
pub use model::{Body, CallContext, Headers, Request, Response};
pub use pipeline::{Pipeline, PipelineConfig};
pub use policy::Policy;
pub use retry::{RetryConfig, RetryPolicy};
pub use trace::{LogSink, SpanRecord, TraceSink, TracingPolicy};
pub use transport::{ReqwestTransport, Transport};
