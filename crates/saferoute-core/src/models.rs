//! Core data models for the routing engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound for a radius derived from intensity.
pub const MAX_DERIVED_RADIUS_M: f64 = 2_500.0;
/// Radius of a hotspot with zero intensity.
pub const BASE_RADIUS_M: f64 = 150.0;
/// Meters of radius added per unit of intensity.
pub const RADIUS_PER_INTENSITY_M: f64 = 0.8;

/// Scale used by [`GridCoordinate`] (six decimal digits).
pub const GRID_SCALE: f64 = 1e6;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Intensity bucket of a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity > 200.0 {
            Severity::Critical
        } else if intensity > 100.0 {
            Severity::High
        } else if intensity > 40.0 {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    /// Penalty added for a point inside a hotspot of this severity.
    pub fn penalty(self) -> f64 {
        match self {
            Severity::Critical => 30.0,
            Severity::High => 15.0,
            Severity::Moderate => 5.0,
            Severity::Low => 1.0,
        }
    }

    pub fn is_high_risk(self) -> bool {
        self >= Severity::High
    }
}

/// A normalized hotspot with its effective radius already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f64,
    pub radius_m: f64,
}

impl Hotspot {
    /// Build a hotspot, deriving the radius from intensity when none is given.
    pub fn new(lat: f64, lng: f64, intensity: f64, radius_m: Option<f64>) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.max(0.0)
        } else {
            0.0
        };
        let radius_m = radius_m
            .filter(|radius| radius.is_finite())
            .unwrap_or_else(|| derived_radius_m(intensity));
        Self {
            lat,
            lng,
            intensity,
            radius_m,
        }
    }

    /// Normalize one raw snapshot record.
    ///
    /// Accepts `lat`/`lng` at the top level or nested under `center`, and
    /// `intensity` or `count`. Numbers may be JSON numbers or numeric strings.
    /// Returns `None` when no usable coordinate is present.
    pub fn from_record(record: &Value) -> Option<Self> {
        let center = record.get("center");
        let lat = number_field(record, "lat")
            .or_else(|| center.and_then(|center| number_field(center, "lat")))?;
        let lng = number_field(record, "lng")
            .or_else(|| center.and_then(|center| number_field(center, "lng")))?;
        let intensity = number_field(record, "intensity")
            .or_else(|| number_field(record, "count"))
            .unwrap_or(0.0);
        let radius_m = number_field(record, "radius");
        Some(Self::new(lat, lng, intensity, radius_m))
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn severity(&self) -> Severity {
        Severity::from_intensity(self.intensity)
    }
}

fn derived_radius_m(intensity: f64) -> f64 {
    (BASE_RADIUS_M + intensity * RADIUS_PER_INTENSITY_M).min(MAX_DERIVED_RADIUS_M)
}

fn number_field(record: &Value, key: &str) -> Option<f64> {
    let value = match record.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Search-graph node identity: a coordinate in fixed-point micro-degrees.
///
/// Two coordinates that round to the same six decimal digits are the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCoordinate {
    lat_e6: i64,
    lng_e6: i64,
}

impl GridCoordinate {
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self {
            lat_e6: (lat * GRID_SCALE).round() as i64,
            lng_e6: (lng * GRID_SCALE).round() as i64,
        }
    }

    pub fn from_coordinate(coordinate: &Coordinate) -> Self {
        Self::from_degrees(coordinate.lat, coordinate.lng)
    }

    pub fn offset(self, dlat_e6: i64, dlng_e6: i64) -> Self {
        Self {
            lat_e6: self.lat_e6.saturating_add(dlat_e6),
            lng_e6: self.lng_e6.saturating_add(dlng_e6),
        }
    }

    /// The four axis-aligned neighbours at `step_e6` micro-degrees.
    pub fn neighbors(self, step_e6: i64) -> [GridCoordinate; 4] {
        [
            self.offset(step_e6, 0),
            self.offset(-step_e6, 0),
            self.offset(0, step_e6),
            self.offset(0, -step_e6),
        ]
    }

    pub fn lat(&self) -> f64 {
        self.lat_e6 as f64 / GRID_SCALE
    }

    pub fn lng(&self) -> f64 {
        self.lng_e6 as f64 / GRID_SCALE
    }

    pub fn to_coordinate(self) -> Coordinate {
        Coordinate::new(self.lat(), self.lng())
    }
}

/// Which planning stage produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Provider,
    GridSearch,
    StraightLine,
}

/// A scored route candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub points: Vec<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<u64>,
    pub encoded_polyline: String,
    pub risk_score: u32,
    pub avoided_hotspots: usize,
}

/// Final answer for one routing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub chosen: CandidateRoute,
    /// Runner-ups in ascending risk order.
    pub alternatives: Vec<CandidateRoute>,
    pub source: RouteSource,
}
