//! Pipeline behavior over the real reqwest transport against a scripted
//! local upstream. These use real (short) retry delays.

use std::sync::Arc;
use std::time::Duration;
use url::Url;
use waypoint_pipeline::{
    FailureKind, Pipeline, PipelineConfig, ReqwestTransport, Request, RetryConfig, TransportError,
};
use waypoint_test_support::{ScriptedResponse, ScriptedUpstream};

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        product: "waypoint-mcp".to_string(),
        version: "0.1.0-test".to_string(),
        retry: RetryConfig {
            max_attempts: 3,
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        },
        request_timeout: Duration::from_millis(500),
        tracing_enabled: false,
    }
}

fn pipeline(config: &PipelineConfig) -> Pipeline {
    let transport = Arc::new(ReqwestTransport::new(Some(config.request_timeout)));
    Pipeline::standard(config, transport, None)
}

#[tokio::test]
async fn recovers_from_transient_server_errors_over_the_wire() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    upstream.script(
        "/search/address/json",
        vec![
            ScriptedResponse::json(503, serde_json::json!({"error": "busy"})),
            ScriptedResponse::json(503, serde_json::json!({"error": "busy"})),
            ScriptedResponse::json(200, serde_json::json!({"results": []}))
                .with_header("x-ms-request-id", "req-123"),
        ],
    );

    let config = fast_config();
    let url = Url::parse(&format!("{}/search/address/json", upstream.base_url())).expect("url");
    let response = pipeline(&config)
        .execute(Request::get(url))
        .await
        .expect("third attempt succeeds");

    assert_eq!(response.status, 200);
    assert_eq!(response.headers.get("x-ms-request-id"), Some("req-123"));
    assert_eq!(upstream.hits("/search/address/json"), 3);

    // The identification header reached the wire on every attempt.
    for recorded in upstream.recorded() {
        assert_eq!(recorded.user_agent.as_deref(), Some("waypoint-mcp/0.1.0-test"));
    }

    upstream.shutdown().await;
}

#[tokio::test]
async fn per_attempt_timeout_is_a_transient_failure() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    upstream.script(
        "/slow",
        vec![
            ScriptedResponse::json(200, serde_json::json!({}))
                .with_delay(Duration::from_secs(5)),
        ],
    );

    let mut config = fast_config();
    config.request_timeout = Duration::from_millis(100);
    let url = Url::parse(&format!("{}/slow", upstream.base_url())).expect("url");

    let err = pipeline(&config)
        .execute(Request::get(url))
        .await
        .expect_err("every attempt times out");

    match err {
        TransportError::Transport { attempts, failure } => {
            assert_eq!(attempts, 3);
            assert_eq!(failure.kind, FailureKind::Timeout);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(upstream.hits("/slow"), 3);

    upstream.shutdown().await;
}

#[tokio::test]
async fn delivered_client_error_is_not_retried_over_the_wire() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    upstream.script(
        "/missing",
        vec![ScriptedResponse::json(400, serde_json::json!({"error": "bad query"}))],
    );

    let config = fast_config();
    let url = Url::parse(&format!("{}/missing", upstream.base_url())).expect("url");
    let response = pipeline(&config)
        .execute(Request::get(url))
        .await
        .expect("delivered response");

    assert_eq!(response.status, 400);
    assert_eq!(upstream.hits("/missing"), 1);

    upstream.shutdown().await;
}
