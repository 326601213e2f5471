//! The policy chain: a closed set of cross-cutting behaviors, each wrapping
//! the remainder of the chain as its `next` handler.
//!
//! Keeping the set closed (an enum rather than open registration) keeps the
//! composition order auditable and each variant testable in isolation.

use crate::error::TransportError;
use crate::identification::IdentificationPolicy;
use crate::model::{Request, Response};
use crate::retry::RetryPolicy;
use crate::trace::TracingPolicy;
use crate::transport::Transport;

/// One unit of cross-cutting request/response behavior.
///
/// Conventional order: Identification → Retry → Tracing → transport, so that
/// tracing observes each physical attempt while retry governs repetition and
/// the identification header lands on every attempt's request clone.
pub enum Policy {
    Identification(IdentificationPolicy),
    Retry(RetryPolicy),
    Tracing(TracingPolicy),
}

impl Policy {
    pub(crate) async fn apply(
        &self,
        request: Request,
        next: Next<'_>,
    ) -> Result<Response, TransportError> {
        match self {
            Self::Identification(p) => p.apply(request, next).await,
            Self::Retry(p) => p.apply(request, next).await,
            Self::Tracing(p) => p.apply(request, next).await,
        }
    }
}

/// Cursor over the remaining chain, terminating in the transport adapter.
///
/// `Copy` so the retry policy can run the same tail once per attempt.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    pub(crate) policies: &'a [Policy],
    pub(crate) transport: &'a dyn Transport,
}

impl Next<'_> {
    /// Run the rest of the chain for `request`.
    ///
    /// # Errors
    ///
    /// Propagates [`TransportError`] from inner policies; at the terminal
    /// link, wraps a transport failure with the attempt number stamped on
    /// the request's context.
    pub(crate) async fn run(self, request: Request) -> Result<Response, TransportError> {
        match self.policies.split_first() {
            Some((policy, rest)) => {
                let next = Next {
                    policies: rest,
                    transport: self.transport,
                };
                Box::pin(policy.apply(request, next)).await
            }
            None => {
                let attempts = request.context.attempt.max(1);
                self.transport
                    .send(request)
                    .await
                    .map_err(|failure| TransportError::Transport { attempts, failure })
            }
        }
    }
}
