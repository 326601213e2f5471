//! Route directions between two or more waypoints.

use crate::api::GeoApi;
use crate::coords::{self, Coordinate};
use crate::error::{GeoToolError, Result};
use crate::registry::{GeoTool, json_result, parse_args, read_only_annotations, schema_object};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const TRAVEL_MODES: &[&str] = &["car", "truck", "pedestrian", "bicycle"];
const ROUTE_TYPES: &[&str] = &["fastest", "shortest", "eco"];

pub struct RouteDirections {
    api: Arc<GeoApi>,
}

impl RouteDirections {
    #[must_use]
    pub fn new(api: Arc<GeoApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    waypoints: Vec<String>,
    #[serde(default)]
    travel_mode: Option<String>,
    #[serde(default)]
    route_type: Option<String>,
}

#[async_trait]
impl GeoTool for RouteDirections {
    fn name(&self) -> &'static str {
        "route_directions"
    }

    fn definition(&self) -> Tool {
        let mut tool = Tool::new(
            self.name(),
            "Compute a route through two or more waypoints. Returns distance, \
             travel time and per-leg summaries.",
            schema_object(json!({
                "type": "object",
                "properties": {
                    "waypoints": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 2,
                        "description": "Waypoints as 'lat,lon' strings, origin first, destination last"
                    },
                    "travel_mode": {
                        "type": "string",
                        "enum": TRAVEL_MODES,
                        "description": "Travel mode (default car)"
                    },
                    "route_type": {
                        "type": "string",
                        "enum": ROUTE_TYPES,
                        "description": "Optimization goal (default fastest)"
                    }
                },
                "required": ["waypoints"]
            })),
        );
        tool.annotations = Some(read_only_annotations());
        tool
    }

    async fn call(&self, arguments: Value) -> Result<CallToolResult> {
        let args: Args = parse_args(arguments)?;
        if args.waypoints.len() < 2 {
            return Err(GeoToolError::InvalidArguments(
                "at least two waypoints are required".to_string(),
            ));
        }
        let waypoints: Vec<Coordinate> = args
            .waypoints
            .iter()
            .map(|s| coords::parse_pair(s))
            .collect::<Result<_>>()?;

        let mut query = vec![("query", coords::route_query(&waypoints))];
        if let Some(mode) = &args.travel_mode {
            query.push(("travelMode", validate_choice("travel_mode", mode, TRAVEL_MODES)?));
        }
        if let Some(route_type) = &args.route_type {
            query.push(("routeType", validate_choice("route_type", route_type, ROUTE_TYPES)?));
        }

        let request = self.api.get("/route/directions/json", &query)?;
        let body = self.api.fetch_json(request).await?;
        Ok(json_result(&shape(&body)))
    }
}

fn validate_choice(field: &str, value: &str, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(GeoToolError::InvalidArguments(format!(
            "{field} must be one of {allowed:?}, got '{value}'"
        )))
    }
}

fn shape(body: &Value) -> Value {
    let routes: Vec<Value> = body["routes"]
        .as_array()
        .map(|routes| routes.iter().map(shape_route).collect())
        .unwrap_or_default();
    json!({ "routes": routes })
}

fn shape_route(route: &Value) -> Value {
    let legs: Vec<Value> = route["legs"]
        .as_array()
        .map(|legs| {
            legs.iter()
                .map(|leg| {
                    json!({
                        "distance_meters": leg["summary"]["lengthInMeters"],
                        "travel_time_seconds": leg["summary"]["travelTimeInSeconds"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "distance_meters": route["summary"]["lengthInMeters"],
        "travel_time_seconds": route["summary"]["travelTimeInSeconds"],
        "traffic_delay_seconds": route["summary"]["trafficDelayInSeconds"],
        "legs": legs,
    })
}
