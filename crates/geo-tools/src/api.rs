//! Request shaping for the remote geospatial API.
//!
//! Tools build [`Request`] values here and hand them to the injected
//! pipeline; nothing in this crate touches the HTTP client directly.

use crate::error::{GeoToolError, Result};
use serde_json::Value;
use std::sync::Arc;
use url::Url;
use waypoint_pipeline::{Pipeline, Request, Response};

/// Remote API settings, read once at startup.
#[derive(Debug, Clone)]
pub struct GeoApiConfig {
    pub base_url: Url,
    /// Subscription key, sent as the `subscription-key` query parameter.
    pub api_key: String,
}

impl GeoApiConfig {
    /// # Errors
    ///
    /// Returns a config error when `base_url` does not parse.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GeoToolError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
        })
    }
}

/// Bound accessor every tool receives at construction: config plus the
/// pipeline's `execute` entry point.
pub struct GeoApi {
    config: GeoApiConfig,
    pipeline: Arc<Pipeline>,
}

impl GeoApi {
    #[must_use]
    pub fn new(config: GeoApiConfig, pipeline: Arc<Pipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Build a GET request for `path`, attaching `api-version`, the
    /// subscription key and the given query parameters.
    ///
    /// # Errors
    ///
    /// Returns a config error when `path` cannot be joined onto the base URL.
    pub(crate) fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Request> {
        let mut url = self
            .config
            .base_url
            .join(path)
            .map_err(|e| GeoToolError::Config(format!("invalid request path '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", "1.0");
            pairs.append_pair("subscription-key", &self.config.api_key);
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(Request::get(url))
    }

    /// Execute a request and decode a successful JSON body.
    ///
    /// # Errors
    ///
    /// - `Transport` when the pipeline exhausts its retries.
    /// - `Api` for any delivered non-2xx response.
    /// - `Decode` when a 2xx body is not valid JSON.
    pub(crate) async fn fetch_json(&self, request: Request) -> Result<Value> {
        let response = self.pipeline.execute(request).await?;
        Self::decode_json(&response)
    }

    fn decode_json(response: &Response) -> Result<Value> {
        if !response.is_success() {
            tracing::warn!(status = response.status, "remote API returned an error");
            return Err(GeoToolError::Api {
                status: response.status,
                body: response.body_text(),
            });
        }
        response
            .json()
            .map_err(|e| GeoToolError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use waypoint_pipeline::Headers;

    #[test]
    fn get_appends_version_key_and_params() {
        let config = GeoApiConfig::new("https://atlas.microsoft.com", "k-123").expect("config");
        let api = GeoApi::new(
            config,
            Arc::new(Pipeline::standard(
                &waypoint_pipeline::PipelineConfig::default(),
                Arc::new(waypoint_pipeline::ReqwestTransport::new(None)),
                None,
            )),
        );
        let request = api
            .get("/search/address/json", &[("query", "seattle".to_string())])
            .expect("request");

        let query = request.url.query().expect("query");
        assert!(query.contains("api-version=1.0"));
        assert!(query.contains("subscription-key=k-123"));
        assert!(query.contains("query=seattle"));
    }

    #[test]
    fn non_success_response_becomes_api_error() {
        let response = Response {
            status: 403,
            headers: Headers::new(),
            body: b"denied".to_vec(),
            elapsed: Duration::from_millis(1),
        };
        let err = GeoApi::decode_json(&response).expect_err("403 is an API error");
        match err {
            GeoToolError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_body_becomes_decode_error() {
        let response = Response {
            status: 200,
            headers: Headers::new(),
            body: b"not json".to_vec(),
            elapsed: Duration::from_millis(1),
        };
        assert!(matches!(
            GeoApi::decode_json(&response),
            Err(GeoToolError::Decode(_))
        ));
    }
}
