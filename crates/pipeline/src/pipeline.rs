//! Pipeline: ordered policy composition terminating in a transport adapter.

use crate::error::TransportError;
use crate::identification::IdentificationPolicy;
use crate::model::{Request, Response};
use crate::policy::{Next, Policy};
use crate::retry::{RetryConfig, RetryPolicy};
use crate::trace::{TraceSink, TracingPolicy, fresh_trace_id};
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;

/// Configuration surface consumed by the pipeline, read once at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Product identifier for the identification policy.
    pub product: String,
    /// Build version string, resolved once at process start.
    pub version: String,
    pub retry: RetryConfig,
    /// Per-attempt request timeout applied by the transport adapter.
    pub request_timeout: Duration,
    /// When false, no tracing policy is installed at all: request/response
    /// handling is byte-identical to the enabled configuration.
    pub tracing_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            product: "waypoint-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
            tracing_enabled: true,
        }
    }
}

/// The ordered policy chain plus its terminal transport.
///
/// The chain is fixed after construction and shared read-only across all
/// calls; every call's working data (request clones, attempt records, span
/// context) is call-local, so concurrent `execute` calls never observe each
/// other.
pub struct Pipeline {
    policies: Vec<Policy>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Empty pipeline: `execute` goes straight to the transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            policies: Vec::new(),
            transport,
        }
    }

    /// Append a policy. Composition order is call order; call only during
    /// setup, before the first `execute`.
    pub fn use_policy(&mut self, policy: Policy) {
        self.policies.push(policy);
    }

    /// Conventional chain for `config`: identification → retry → tracing
    /// (tracing only when enabled and a sink is supplied).
    #[must_use]
    pub fn standard(
        config: &PipelineConfig,
        transport: Arc<dyn Transport>,
        sink: Option<Arc<dyn TraceSink>>,
    ) -> Self {
        let mut pipeline = Self::new(transport);
        pipeline.use_policy(Policy::Identification(IdentificationPolicy::new(
            &config.product,
            &config.version,
        )));
        pipeline.use_policy(Policy::Retry(RetryPolicy::new(config.retry.clone())));
        if config.tracing_enabled
            && let Some(sink) = sink
        {
            pipeline.use_policy(Policy::Tracing(TracingPolicy::new(sink)));
        }
        pipeline
    }

    /// Run one logical call through the chain.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError`] only when every configured retry is
    /// exhausted or a transport-level failure survives the retry policy.
    /// Delivered non-retryable responses (including 4xx other than 429) are
    /// returned as `Ok`.
    pub async fn execute(&self, mut request: Request) -> Result<Response, TransportError> {
        // Each logical call owns its correlation context; propagate a
        // caller-established trace id, mint a fresh one otherwise.
        if request.context.trace_id.is_none() {
            request.context.trace_id = Some(fresh_trace_id());
        }

        Next {
            policies: &self.policies,
            transport: self.transport.as_ref(),
        }
        .run(request)
        .await
    }
}
