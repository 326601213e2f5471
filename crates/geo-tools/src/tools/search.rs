//! Nearby point-of-interest search around a coordinate.

use crate::api::GeoApi;
use crate::coords::Coordinate;
use crate::error::{GeoToolError, Result};
use crate::registry::{GeoTool, json_result, parse_args, read_only_annotations, schema_object};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const MAX_RADIUS_METERS: u32 = 50_000;

pub struct SearchNearby {
    api: Arc<GeoApi>,
}

impl SearchNearby {
    #[must_use]
    pub fn new(api: Arc<GeoApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    radius_meters: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

#[async_trait]
impl GeoTool for SearchNearby {
    fn name(&self) -> &'static str {
        "search_nearby"
    }

    fn definition(&self) -> Tool {
        let mut tool = Tool::new(
            self.name(),
            "Search for points of interest near a coordinate.",
            schema_object(json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "number", "minimum": -90, "maximum": 90 },
                    "longitude": { "type": "number", "minimum": -180, "maximum": 180 },
                    "radius_meters": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_RADIUS_METERS,
                        "description": "Search radius in meters (default 1000)"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 100,
                        "description": "Maximum number of results (default 10)"
                    }
                },
                "required": ["latitude", "longitude"]
            })),
        );
        tool.annotations = Some(read_only_annotations());
        tool
    }

    async fn call(&self, arguments: Value) -> Result<CallToolResult> {
        let args: Args = parse_args(arguments)?;
        let coordinate = Coordinate::new(args.latitude, args.longitude)?;

        let radius = args.radius_meters.unwrap_or(1000);
        if radius == 0 || radius > MAX_RADIUS_METERS {
            return Err(GeoToolError::InvalidArguments(format!(
                "radius_meters must be in [1, {MAX_RADIUS_METERS}], got {radius}"
            )));
        }

        let request = self.api.get(
            "/search/nearby/json",
            &[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("radius", radius.to_string()),
                ("limit", args.limit.unwrap_or(10).clamp(1, 100).to_string()),
            ],
        )?;
        let body = self.api.fetch_json(request).await?;
        Ok(json_result(&shape(&body)))
    }
}

fn shape(body: &Value) -> Value {
    let results: Vec<Value> = body["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .map(|result| {
                    json!({
                        "name": result["poi"]["name"],
                        "categories": result["poi"]["categories"],
                        "address": result["address"]["freeformAddress"],
                        "latitude": result["position"]["lat"],
                        "longitude": result["position"]["lon"],
                        "distance_meters": result["dist"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({ "results": results })
}
