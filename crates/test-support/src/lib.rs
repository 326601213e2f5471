//! Shared test helpers: a scripted HTTP upstream for integration tests.

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One canned upstream response.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: Value,
    pub headers: Vec<(String, String)>,
    /// Artificial latency before responding (for timeout tests).
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            headers: Vec::new(),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request observed by the upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub user_agent: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct UpstreamState {
    /// Per-path scripts; responses are consumed in order, the last one
    /// repeats once the script is exhausted.
    scripts: Mutex<HashMap<String, (Vec<ScriptedResponse>, usize)>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

/// In-process HTTP server that replays scripted responses per path and
/// records every request it sees.
pub struct ScriptedUpstream {
    addr: SocketAddr,
    state: Arc<UpstreamState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ScriptedUpstream {
    /// Bind an ephemeral localhost port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(UpstreamState::default());
        let handler_state = Arc::clone(&state);
        let app = Router::new().route(
            "/{*path}",
            any(
                move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                    let state = Arc::clone(&handler_state);
                    async move { handle(state, method, uri, &headers, &body).await }
                },
            ),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let handle = tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            handle,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register the response sequence for `path` (leading slash included).
    pub fn script(&self, path: &str, responses: Vec<ScriptedResponse>) {
        assert!(!responses.is_empty(), "script needs at least one response");
        self.state
            .scripts
            .lock()
            .insert(path.to_string(), (responses, 0));
    }

    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.state.recorded.lock().clone()
    }

    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .recorded
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

async fn handle(
    state: Arc<UpstreamState>,
    method: Method,
    uri: Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response {
    state.recorded.lock().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        user_agent: headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });

    let scripted = {
        let mut scripts = state.scripts.lock();
        scripts.get_mut(uri.path()).map(|(responses, cursor)| {
            let response = responses[(*cursor).min(responses.len() - 1)].clone();
            *cursor += 1;
            response
        })
    };

    let Some(scripted) = scripted else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({"error": "no script for path"})),
        )
            .into_response();
    };

    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = (
        StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        axum::Json(scripted.body),
    )
        .into_response();
    for (name, value) in &scripted.headers {
        if let (Ok(name), Ok(value)) = (
            axum::http::HeaderName::try_from(name.as_str()),
            axum::http::HeaderValue::try_from(value.as_str()),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}
