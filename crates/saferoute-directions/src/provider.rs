//! Provider seam used by the route planner.

use saferoute_core::models::Coordinate;
use std::future::Future;

/// One alternative route as returned by a directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub points: Vec<Coordinate>,
    pub encoded_polyline: String,
    pub distance_m: Option<u64>,
    pub duration_s: Option<u64>,
}

/// Source of alternative routes between two points.
///
/// Implementations never fail: an unavailable provider yields an empty list.
pub trait RouteProvider: Send + Sync {
    fn fetch_routes(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> impl Future<Output = Vec<ProviderRoute>> + Send;
}
