//! Coordinate parsing and formatting shared by the tools.

use crate::error::{GeoToolError, Result};

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// # Errors
    ///
    /// Returns `InvalidArguments` when either component is out of range
    /// (latitude ±90, longitude ±180) or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoToolError::InvalidArguments(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoToolError::InvalidArguments(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// `lat,lon` pair as the remote API expects it.
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Parse a `lat,lon` string.
///
/// # Errors
///
/// Returns `InvalidArguments` when the string is not two comma-separated
/// finite numbers in range.
pub fn parse_pair(s: &str) -> Result<Coordinate> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| GeoToolError::InvalidArguments(format!("expected 'lat,lon', got '{s}'")))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| GeoToolError::InvalidArguments(format!("bad latitude in '{s}'")))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| GeoToolError::InvalidArguments(format!("bad longitude in '{s}'")))?;
    Coordinate::new(latitude, longitude)
}

/// Join waypoints into the `lat0,lon0:lat1,lon1:...` route query format.
#[must_use]
pub fn route_query(waypoints: &[Coordinate]) -> String {
    waypoints
        .iter()
        .map(Coordinate::pair)
        .collect::<Vec<_>>()
        .join(":")
}
