//! Argument helpers for the `safe_route` binary.

use anyhow::{bail, Context, Result};
use saferoute_core::models::Coordinate;

/// Parse `LAT,LNG` into a coordinate.
///
/// Exactly two finite numbers within latitude/longitude range are required;
/// anything else is rejected before the planner runs.
pub fn parse_coordinate(raw: &str) -> Result<Coordinate> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        bail!("expected LAT,LNG but got {:?}", raw);
    }

    let lat: f64 = parts[0]
        .parse()
        .with_context(|| format!("invalid latitude {:?}", parts[0]))?;
    let lng: f64 = parts[1]
        .parse()
        .with_context(|| format!("invalid longitude {:?}", parts[1]))?;

    let coordinate = Coordinate::new(lat, lng);
    if !coordinate.is_finite() {
        bail!("coordinate {:?} is not finite", raw);
    }
    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude {lat} is outside -90..=90");
    }
    if !(-180.0..=180.0).contains(&lng) {
        bail!("longitude {lng} is outside -180..=180");
    }
    Ok(coordinate)
}
