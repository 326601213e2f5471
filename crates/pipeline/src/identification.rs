//! Identification policy: stamps a stable product/version identifier into
//! the `user-agent` header of every request that flows through the chain.

use crate::error::TransportError;
use crate::model::{Request, Response};
use crate::policy::Next;

const USER_AGENT: &str = "user-agent";

/// Pure header augmentation; no error conditions.
///
/// The ident string is resolved once at construction from explicit config
/// (never a runtime global), so tests can inject arbitrary values.
#[derive(Debug, Clone)]
pub struct IdentificationPolicy {
    ident: String,
}

impl IdentificationPolicy {
    #[must_use]
    pub fn new(product: &str, version: &str) -> Self {
        Self {
            ident: format!("{product}/{version}"),
        }
    }

    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub(crate) async fn apply(
        &self,
        request: Request,
        next: Next<'_>,
    ) -> Result<Response, TransportError> {
        next.run(self.identify(request)).await
    }

    /// Set or augment the `user-agent` slot. Idempotent: if the ident is
    /// already the leading token, the request passes through unchanged.
    /// Caller-provided UA text is preserved after the ident; no other header
    /// is touched.
    #[must_use]
    pub fn identify(&self, mut request: Request) -> Request {
        let existing = request.headers.get(USER_AGENT).map(str::to_string);
        let value = match existing {
            Some(ua) if ua == self.ident || ua.starts_with(&format!("{} ", self.ident)) => {
                return request;
            }
            Some(ua) => format!("{} {ua}", self.ident),
            None => self.ident.clone(),
        };
        request.headers.insert(USER_AGENT, value);
        request
    }
}
