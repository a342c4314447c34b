//! Directions API HTTP client.

use reqwest::{Client, StatusCode};
use saferoute_core::models::Coordinate;
use saferoute_core::polyline::{decode_polyline, PolylineError};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::provider::{ProviderRoute, RouteProvider};

pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
pub const DEFAULT_TRAVEL_MODE: &str = "walking";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const STATUS_OK: &str = "OK";

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub travel_mode: String,
    /// Applied to every request, connect through body.
    pub timeout: Duration,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTIONS_URL.to_string(),
            api_key: None,
            travel_mode: DEFAULT_TRAVEL_MODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("directions API key is not configured")]
    MissingCredential,

    #[error("directions request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("directions service returned HTTP {0}")]
    HttpStatus(StatusCode),

    #[error("directions service returned status {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    ProviderStatus {
        status: String,
        message: Option<String>,
    },

    #[error("route {index} has an undecodable polyline: {source}")]
    Polyline {
        index: usize,
        #[source]
        source: PolylineError,
    },
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: OverviewPolyline,
    #[serde(default)]
    legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    #[serde(default)]
    distance: Option<LegValue>,
    #[serde(default)]
    duration: Option<LegValue>,
}

#[derive(Debug, Deserialize)]
struct LegValue {
    value: u64,
}

/// HTTP client for the directions service.
pub struct DirectionsClient {
    client: Client,
    config: DirectionsConfig,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, DirectionsError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    /// Request alternative routes between two points.
    pub async fn request_routes(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(DirectionsError::MissingCredential)?;

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("origin", format_point(&start)),
                ("destination", format_point(&end)),
                ("alternatives", "true".to_string()),
                ("mode", self.config.travel_mode.clone()),
                ("key", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectionsError::HttpStatus(status));
        }

        let body: DirectionsResponse = response.json().await?;
        routes_from_response(body)
    }
}

impl RouteProvider for DirectionsClient {
    fn fetch_routes(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> impl Future<Output = Vec<ProviderRoute>> + Send {
        async move {
            match self.request_routes(start, end).await {
                Ok(routes) => {
                    tracing::debug!(routes = routes.len(), "directions provider returned routes");
                    routes
                }
                Err(err) => {
                    tracing::warn!(error = %err, "directions provider unavailable");
                    Vec::new()
                }
            }
        }
    }
}

fn format_point(point: &Coordinate) -> String {
    format!("{},{}", point.lat, point.lng)
}

fn routes_from_response(body: DirectionsResponse) -> Result<Vec<ProviderRoute>, DirectionsError> {
    if body.status != STATUS_OK {
        return Err(DirectionsError::ProviderStatus {
            status: body.status,
            message: body.error_message,
        });
    }

    let mut routes = Vec::with_capacity(body.routes.len());
    for (index, route) in body.routes.into_iter().enumerate() {
        match decode_route(index, route) {
            Ok(Some(route)) => routes.push(route),
            Ok(None) => {
                tracing::debug!(route = index, "skipping route with fewer than two points");
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping provider route");
            }
        }
    }
    Ok(routes)
}

fn decode_route(
    index: usize,
    route: DirectionsRoute,
) -> Result<Option<ProviderRoute>, DirectionsError> {
    let points = decode_polyline(&route.overview_polyline.points)
        .map_err(|source| DirectionsError::Polyline { index, source })?;
    if points.len() < 2 {
        return Ok(None);
    }

    let distance_m = sum_legs(route.legs.iter().map(|leg| leg.distance.as_ref()));
    let duration_s = sum_legs(route.legs.iter().map(|leg| leg.duration.as_ref()));

    Ok(Some(ProviderRoute {
        points,
        encoded_polyline: route.overview_polyline.points,
        distance_m,
        duration_s,
    }))
}

fn sum_legs<'a>(values: impl Iterator<Item = Option<&'a LegValue>>) -> Option<u64> {
    values
        .flatten()
        .map(|value| value.value)
        .fold(None, |total, value| Some(total.unwrap_or(0) + value))
}
