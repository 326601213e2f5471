//! Plain data shapes for outbound requests and responses.
//!
//! These are deliberately behavior-free: policies and the transport adapter
//! are the only places that interpret them.

use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Header map with case-insensitive names (keys are lowercased on insert,
/// last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request body: either a structured JSON payload or opaque bytes.
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Bytes(Vec<u8>),
}

/// Correlation context attached to one logical call.
///
/// The pipeline assigns a fresh `trace_id` at the start of `execute` unless
/// the caller already established one (nested call scenario). `attempt` is
/// stamped per physical attempt by the retry policy; it never leaks between
/// attempts because each attempt works on its own request clone.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub trace_id: Option<String>,
    /// Span id of the caller's enclosing span, for nested-call correlation.
    pub parent_span_id: Option<String>,
    pub attempt: u32,
}

/// An outbound HTTP request as seen by the policy chain.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Body>,
    pub context: CallContext,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
            context: CallContext::default(),
        }
    }

    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_json(mut self, payload: Value) -> Self {
        self.body = Some(Body::Json(payload));
        self
    }
}

/// The response produced by the transport adapter. Immutable once built;
/// policies on the way back up may inspect it but never rewrite it.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub elapsed: Duration,
}

impl Response {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text (lossy for non-UTF-8 payloads).
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_are_case_insensitive_and_last_write_wins() {
        let mut headers = Headers::new();
        headers.insert("User-Agent", "first");
        headers.insert("user-agent", "second");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("USER-AGENT"), Some("second"));
    }

    #[test]
    fn request_builder_sets_header_and_body() {
        let url = Url::parse("https://atlas.microsoft.com/search").expect("url");
        let request = Request::get(url)
            .with_header("X-Test", "1")
            .with_json(json!({"q": "seattle"}));
        assert_eq!(request.headers.get("x-test"), Some("1"));
        assert!(matches!(request.body, Some(Body::Json(_))));
        assert_eq!(request.context.attempt, 0);
    }

    #[test]
    fn response_json_parses_body() {
        let response = Response {
            status: 200,
            headers: Headers::new(),
            body: br#"{"ok":true}"#.to_vec(),
            elapsed: Duration::from_millis(5),
        };
        assert!(response.is_success());
        assert_eq!(response.json().expect("json")["ok"], json!(true));
    }
}
