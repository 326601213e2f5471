//! Transport adapter: the terminal network call of the pipeline.
//!
//! The adapter is injected into the pipeline at construction time; nothing in
//! this crate reaches for a global HTTP client.

use crate::error::{FailureKind, TransportFailure};
use crate::model::{Body, Headers, Request, Response};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// The actual network call. Implemented over reqwest for production and by
/// in-memory stubs in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one physical attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] with a reason code when the request
    /// could not be delivered (timeout, connection error, DNS failure).
    /// Any delivered HTTP response, whatever its status, is `Ok`.
    async fn send(&self, request: Request) -> Result<Response, TransportFailure>;
}

/// Production transport over a reqwest client.
///
/// The client's connection pool is the only state shared across concurrent
/// calls; it is owned here and never exposed.
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Build a transport applying `timeout` to every physical attempt.
    /// A timed-out attempt is reported as a transient failure, so it flows
    /// through the retry policy like any other transport failure.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportFailure> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(Body::Json(payload)) => builder = builder.json(payload),
            Some(Body::Bytes(bytes)) => builder = builder.body(bytes.clone()),
            None => {}
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str(), v);
            }
        }
        let body = response
            .bytes()
            .await
            .map_err(classify_reqwest_error)?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
            elapsed: started.elapsed(),
        })
    }
}

/// Redact a URL for logs and error messages: drop credentials, query and
/// fragment (the query carries the subscription key).
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportFailure {
    let kind = if e.is_timeout() {
        FailureKind::Timeout
    } else if e.is_connect() {
        FailureKind::ConnectionRefused
    } else if error_chain_mentions_dns(&e) {
        FailureKind::DnsFailure
    } else {
        FailureKind::Other
    };
    TransportFailure::new(kind, sanitize_reqwest_error(&e))
}

fn error_chain_mentions_dns(e: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = source {
        let msg = err.to_string().to_ascii_lowercase();
        if msg.contains("dns") || msg.contains("name or service not known") {
            return true;
        }
        source = err.source();
    }
    false
}

fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
