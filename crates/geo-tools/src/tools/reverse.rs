//! Reverse geocoding: coordinates to the nearest street address.

use crate::api::GeoApi;
use crate::coords::Coordinate;
use crate::error::Result;
use crate::registry::{GeoTool, json_result, parse_args, read_only_annotations, schema_object};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct ReverseGeocode {
    api: Arc<GeoApi>,
}

impl ReverseGeocode {
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
impl GeoTool for ReverseGeocode {
    fn name(&self) -> &'static str {
        "reverse_geocode"
    }

    fn definition(&self) -> Tool {
        let mut tool = Tool::new(
            self.name(),
            "Resolve coordinates to the nearest street address.",
            schema_object(json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "minimum": -90,
                        "maximum": 90
                    },
                    "longitude": {
                        "type": "number",
                        "minimum": -180,
                        "maximum": 180
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

        let request = self.api.get(
            "/search/address/reverse/json",
            &[("query", coordinate.pair())],
        )?;
        let body = self.api.fetch_json(request).await?;
        Ok(json_result(&shape(&body)))
    }
}

fn shape(body: &Value) -> Value {
    let addresses: Vec<Value> = body["addresses"]
        .as_array()
        .map(|addresses| {
            addresses
                .iter()
                .map(|entry| {
                    json!({
                        "address": entry["address"]["freeformAddress"],
                        "country": entry["address"]["countryCode"],
                        "position": entry["position"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({ "addresses": addresses })
}
