//! Forward geocoding: free-text address or place name to coordinates.

use crate::api::GeoApi;
use crate::error::{GeoToolError, Result};
use crate::registry::{GeoTool, json_result, parse_args, read_only_annotations, schema_object};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct GeocodeAddress {
    api: Arc<GeoApi>,
}

impl GeocodeAddress {
    #[must_use]
    pub fn new(api: Arc<GeoApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    query: String,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    country_set: Option<Vec<String>>,
}

#[async_trait]
impl GeoTool for GeocodeAddress {
    fn name(&self) -> &'static str {
        "geocode_address"
    }

    fn definition(&self) -> Tool {
        let mut tool = Tool::new(
            self.name(),
            "Geocode a free-text address or place name to coordinates. \
             Returns the best-matching results with address, country and position.",
            schema_object(json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Address or place name to geocode"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 20,
                        "description": "Maximum number of results (default 5)"
                    },
                    "country_set": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "ISO 3166-1 alpha-2 country codes to restrict results to"
                    }
                },
                "required": ["query"]
            })),
        );
        tool.annotations = Some(read_only_annotations());
        tool
    }

    async fn call(&self, arguments: Value) -> Result<CallToolResult> {
        let args: Args = parse_args(arguments)?;
        if args.query.trim().is_empty() {
            return Err(GeoToolError::InvalidArguments(
                "query must not be empty".to_string(),
            ));
        }

        let mut query = vec![
            ("query", args.query.clone()),
            ("limit", args.limit.unwrap_or(5).clamp(1, 20).to_string()),
        ];
        if let Some(countries) = &args.country_set
            && !countries.is_empty()
        {
            query.push(("countrySet", countries.join(",")));
        }

        let request = self.api.get("/search/address/json", &query)?;
        let body = self.api.fetch_json(request).await?;
        Ok(json_result(&shape(&body)))
    }
}

/// Trim the upstream payload to the fields an agent acts on.
fn shape(body: &Value) -> Value {
    let results: Vec<Value> = body["results"]
        .as_array()
        .map(|results| results.iter().map(shape_result).collect())
        .unwrap_or_default();
    json!({ "results": results })
}

fn shape_result(result: &Value) -> Value {
    json!({
        "address": result["address"]["freeformAddress"],
        "country": result["address"]["countryCode"],
        "latitude": result["position"]["lat"],
        "longitude": result["position"]["lon"],
        "confidence": result["score"],
    })
}
