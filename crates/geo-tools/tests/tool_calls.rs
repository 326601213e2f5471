//! Tool-layer behavior against a scripted upstream, through the real
//! pipeline and reqwest transport.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use waypoint_geo_tools::{GeoApi, GeoApiConfig, GeoToolError, ToolRegistry};
use waypoint_pipeline::{Pipeline, PipelineConfig, ReqwestTransport, RetryConfig};
use waypoint_test_support::{ScriptedResponse, ScriptedUpstream};

fn registry_for(upstream: &ScriptedUpstream) -> ToolRegistry {
    let pipeline_config = PipelineConfig {
        product: "waypoint-mcp".to_string(),
        version: "0.1.0-test".to_string(),
        retry: RetryConfig {
            max_attempts: 3,
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        },
        request_timeout: Duration::from_secs(5),
        tracing_enabled: false,
    };
    let transport = Arc::new(ReqwestTransport::new(Some(pipeline_config.request_timeout)));
    let pipeline = Arc::new(Pipeline::standard(&pipeline_config, transport, None));
    let config = GeoApiConfig::new(&upstream.base_url(), "test-key").expect("config");
    ToolRegistry::standard(Arc::new(GeoApi::new(config, pipeline)))
}

fn result_text(result: &rmcp::model::CallToolResult) -> Value {
    let v = serde_json::to_value(result).expect("CallToolResult serializes");
    let text = v["content"][0]["text"].as_str().expect("content[0].text");
    serde_json::from_str(text).expect("tool output is JSON")
}

#[tokio::test]
async fn geocode_shapes_upstream_results() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    upstream.script(
        "/search/address/json",
        vec![ScriptedResponse::json(
            200,
            json!({
                "results": [{
                    "score": 11.9,
                    "address": {
                        "freeformAddress": "400 Broad St, Seattle, WA 98109",
                        "countryCode": "US"
                    },
                    "position": { "lat": 47.6205, "lon": -122.3493 }
                }]
            }),
        )],
    );

    let registry = registry_for(&upstream);
    let result = registry
        .call("geocode_address", json!({"query": "Space Needle", "limit": 3}))
        .await
        .expect("geocode succeeds");

    let shaped = result_text(&result);
    assert_eq!(shaped["results"][0]["country"], "US");
    assert_eq!(shaped["results"][0]["latitude"], 47.6205);

    // Request shaping: versioned, keyed, and parameterized.
    let recorded = upstream.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "GET");
    assert!(recorded[0].query.contains("api-version=1.0"));
    assert!(recorded[0].query.contains("subscription-key=test-key"));
    assert!(recorded[0].query.contains("limit=3"));

    upstream.shutdown().await;
}

#[tokio::test]
async fn tool_call_retries_through_the_pipeline() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    upstream.script(
        "/timezone/byCoordinates/json",
        vec![
            ScriptedResponse::json(503, json!({"error": "busy"})),
            ScriptedResponse::json(
                200,
                json!({"TimeZones": [{"Id": "America/Los_Angeles", "ReferenceTime": {}}]}),
            ),
        ],
    );

    let registry = registry_for(&upstream);
    let result = registry
        .call(
            "timezone_by_coordinates",
            json!({"latitude": 47.6, "longitude": -122.3}),
        )
        .await
        .expect("second attempt succeeds");

    let shaped = result_text(&result);
    assert_eq!(shaped["timezones"][0]["timezone_id"], "America/Los_Angeles");
    assert_eq!(upstream.hits("/timezone/byCoordinates/json"), 2);

    upstream.shutdown().await;
}

#[tokio::test]
async fn delivered_client_error_surfaces_as_api_error() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    upstream.script(
        "/search/address/reverse/json",
        vec![ScriptedResponse::json(403, json!({"error": "key rejected"}))],
    );

    let registry = registry_for(&upstream);
    let err = registry
        .call(
            "reverse_geocode",
            json!({"latitude": 47.6, "longitude": -122.3}),
        )
        .await
        .expect_err("403 is an API error");

    match err {
        GeoToolError::Api { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("key rejected"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Non-retryable: exactly one hit.
    assert_eq!(upstream.hits("/search/address/reverse/json"), 1);

    upstream.shutdown().await;
}

#[tokio::test]
async fn invalid_coordinates_fail_before_any_request() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    let registry = registry_for(&upstream);

    let err = registry
        .call(
            "reverse_geocode",
            json!({"latitude": 95.0, "longitude": 0.0}),
        )
        .await
        .expect_err("latitude out of range");

    assert!(matches!(err, GeoToolError::InvalidArguments(_)));
    assert!(upstream.recorded().is_empty());

    upstream.shutdown().await;
}

#[tokio::test]
async fn route_directions_requires_two_waypoints() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    let registry = registry_for(&upstream);

    let err = registry
        .call("route_directions", json!({"waypoints": ["47.6,-122.3"]}))
        .await
        .expect_err("one waypoint is not a route");
    assert!(matches!(err, GeoToolError::InvalidArguments(_)));

    upstream.shutdown().await;
}

#[tokio::test]
async fn registry_lists_all_standard_tools_with_schemas() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    let registry = registry_for(&upstream);

    let tools = registry.list();
    let names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "geocode_address",
            "reverse_geocode",
            "route_directions",
            "search_nearby",
            "timezone_by_coordinates",
        ]
    );
    for tool in &tools {
        assert!(tool.input_schema.get("properties").is_some());
        let annotations = tool.annotations.as_ref().expect("annotations");
        assert_eq!(annotations.read_only_hint, Some(true));
        assert_eq!(annotations.open_world_hint, Some(true));
    }

    upstream.shutdown().await;
}

#[tokio::test]
async fn registry_filtering_enables_disables_and_rejects_unknown() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");

    let enabled = vec!["geocode_address".to_string(), "reverse_geocode".to_string()];
    let filtered = registry_for(&upstream)
        .filtered(Some(&enabled), &[])
        .expect("filter");
    assert_eq!(filtered.names(), vec!["geocode_address", "reverse_geocode"]);

    let disabled = vec!["route_directions".to_string()];
    let filtered = registry_for(&upstream)
        .filtered(None, &disabled)
        .expect("filter");
    assert!(!filtered.names().contains(&"route_directions"));
    assert_eq!(filtered.names().len(), 4);

    let unknown = vec!["teleport".to_string()];
    let err = registry_for(&upstream)
        .filtered(Some(&unknown), &[])
        .expect_err("unknown tool name");
    assert!(matches!(err, GeoToolError::Config(_)));

    upstream.shutdown().await;
}

#[tokio::test]
async fn unknown_tool_call_is_invalid_arguments() {
    let upstream = ScriptedUpstream::start().await.expect("upstream");
    let registry = registry_for(&upstream);

    let err = registry
        .call("teleport", json!({}))
        .await
        .expect_err("unknown tool");
    assert!(matches!(err, GeoToolError::InvalidArguments(_)));

    upstream.shutdown().await;
}
