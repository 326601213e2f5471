//! Tracing policy: observational span capture for outbound calls.
//!
//! The policy records one span per physical attempt; all records for one
//! logical call share its trace id, and the last record carries the final
//! outcome. Exporting span records to a collector is the sink's problem —
//! this crate's obligation ends at handing off a well-formed record.
//!
//! Tracing is strictly fail-open: a sink error is logged at debug level and
//! discarded, and never alters the request outcome.

use crate::error::TransportError;
use crate::model::{Request, Response};
use crate::policy::Next;
use crate::transport::redact_url;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Response headers captured for upstream correlation when present.
/// Azure front-door style identifiers by default.
pub const DEFAULT_CORRELATION_HEADERS: &[&str] = &["x-ms-request-id", "x-msedge-ref"];

/// A completed span record for one physical attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SpanRecord {
    pub trace_id: String,
    /// Caller's enclosing span id, when one was established.
    pub parent_span_id: Option<String>,
    pub attempt: u32,
    pub method: String,
    /// Redacted request URL (no credentials, query or fragment).
    pub url: String,
    /// Final HTTP status, when an HTTP response was observed.
    pub status: Option<u16>,
    /// Terminal error text, when the attempt did not produce a response.
    pub failure: Option<String>,
    /// Correlation response headers that were present, as `(name, value)`.
    pub correlation: Vec<(String, String)>,
    pub elapsed: Duration,
}

/// Destination for completed span records (external collaborator).
pub trait TraceSink: Send + Sync {
    /// Accept one completed span record.
    ///
    /// # Errors
    ///
    /// May fail (e.g. exporter unavailable); the tracing policy discards the
    /// error.
    fn record(&self, span: SpanRecord) -> anyhow::Result<()>;
}

/// Sink that emits span records as structured log events.
#[derive(Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&self, span: SpanRecord) -> anyhow::Result<()> {
        tracing::info!(
            target: "waypoint::spans",
            trace_id = %span.trace_id,
            parent_span_id = span.parent_span_id.as_deref(),
            attempt = span.attempt,
            method = %span.method,
            url = %span.url,
            status = span.status,
            failure = span.failure.as_deref(),
            elapsed_ms = span.elapsed.as_millis() as u64,
            correlation = ?span.correlation,
            "outbound attempt"
        );
        Ok(())
    }
}

pub struct TracingPolicy {
    sink: Arc<dyn TraceSink>,
    correlation_headers: Vec<String>,
}

impl TracingPolicy {
    #[must_use]
    pub fn new(sink: Arc<dyn TraceSink>) -> Self {
        Self {
            sink,
            correlation_headers: DEFAULT_CORRELATION_HEADERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_correlation_headers(mut self, headers: Vec<String>) -> Self {
        self.correlation_headers = headers;
        self
    }

    pub(crate) async fn apply(
        &self,
        request: Request,
        next: Next<'_>,
    ) -> Result<Response, TransportError> {
        // The pipeline assigns the trace id at the start of each logical
        // call; the fallback covers a policy chain assembled by hand.
        let trace_id = request
            .context
            .trace_id
            .clone()
            .unwrap_or_else(fresh_trace_id);
        let parent_span_id = request.context.parent_span_id.clone();
        let attempt = request.context.attempt.max(1);
        let method = request.method.to_string();
        let url = redact_url(&request.url);

        let started = Instant::now();
        let result = next.run(request).await;

        let span = match &result {
            Ok(response) => SpanRecord {
                trace_id,
                parent_span_id,
                attempt,
                method,
                url,
                status: Some(response.status),
                failure: None,
                correlation: self.collect_correlation(response),
                elapsed: response.elapsed,
            },
            Err(error) => SpanRecord {
                trace_id,
                parent_span_id,
                attempt,
                method,
                url,
                status: error.last_status(),
                failure: Some(error.to_string()),
                correlation: Vec::new(),
                elapsed: started.elapsed(),
            },
        };

        if let Err(e) = self.sink.record(span) {
            tracing::debug!(error = %e, "trace sink rejected span record");
        }

        result
    }

    fn collect_correlation(&self, response: &Response) -> Vec<(String, String)> {
        self.correlation_headers
            .iter()
            .filter_map(|name| {
                response
                    .headers
                    .get(name)
                    .map(|v| (name.clone(), v.to_string()))
            })
            .collect()
    }
}

/// Fresh 128-bit trace id, lowercase hex.
#[must_use]
pub fn fresh_trace_id() -> String {
    let id: u128 = rand::thread_rng().r#gen();
    format!("{id:032x}")
}
