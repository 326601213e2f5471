//! Timezone lookup by coordinate.

use crate::api::GeoApi;
use crate::coords::Coordinate;
use crate::error::Result;
use crate::registry::{GeoTool, json_result, parse_args, read_only_annotations, schema_object};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct TimezoneByCoordinates {
    api: Arc<GeoApi>,
}

impl TimezoneByCoordinates {
    #[must_use]
    pub fn new(api: Arc<GeoApi>) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    latitude: f64,
    longitude: f64,
}

#[async_trait]
impl GeoTool for TimezoneByCoordinates {
    fn name(&self) -> &'static str {
        "timezone_by_coordinates"
    }

    fn definition(&self) -> Tool {
        let mut tool = Tool::new(
            self.name(),
            "Look up the IANA timezone and current offsets for a coordinate.",
            schema_object(json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "number", "minimum": -90, "maximum": 90 },
                    "longitude": { "type": "number", "minimum": -180, "maximum": 180 }
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

        let request = self.api.get(
            "/timezone/byCoordinates/json",
            &[("query", coordinate.pair())],
        )?;
        let body = self.api.fetch_json(request).await?;
        Ok(json_result(&shape(&body)))
    }
}

fn shape(body: &Value) -> Value {
    let timezones: Vec<Value> = body["TimeZones"]
        .as_array()
        .map(|zones| {
            zones
                .iter()
                .map(|zone| {
                    json!({
                        "timezone_id": zone["Id"],
                        "standard_offset": zone["ReferenceTime"]["StandardOffset"],
                        "daylight_savings": zone["ReferenceTime"]["DaylightSavings"],
                        "wall_time": zone["ReferenceTime"]["WallTime"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({ "timezones": timezones })
}

#[cfg(test)]
mod tests {
    use super::shape;
    use serde_json::json;

    #[test]
    fn shape_extracts_timezone_fields() {
        let upstream = json!({
            "Version": "2025a",
            "TimeZones": [{
                "Id": "America/Los_Angeles",
                "ReferenceTime": {
                    "StandardOffset": "-08:00:00",
                    "DaylightSavings": "01:00:00",
                    "WallTime": "2026-08-23T10:00:00-07:00"
                }
            }]
        });
        let shaped = shape(&upstream);
        let zone = &shaped["timezones"][0];
        assert_eq!(zone["timezone_id"], "America/Los_Angeles");
        assert_eq!(zone["standard_offset"], "-08:00:00");
    }
}
