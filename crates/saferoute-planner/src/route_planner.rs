//! Safe route orchestration.
//!
//! Planning walks a fixed sequence of stages: ask the directions provider for
//! alternatives, fall back to the local grid search, and finally degrade to a
//! straight line. Every stage failure is absorbed, so `plan` always answers.

use saferoute_core::models::{CandidateRoute, Coordinate, Hotspot, RouteResult, RouteSource};
use saferoute_core::polyline::encode_polyline;
use saferoute_core::route_engine::find_grid_path;
use saferoute_core::scoring::{rank_candidates, score_points, scored_candidate};
use saferoute_core::spatial::{densify, path_length};
use saferoute_directions::client::{DirectionsClient, DirectionsError};
use saferoute_directions::provider::RouteProvider;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;

#[derive(Debug)]
enum PlanStage {
    TryProvider,
    TryGridSearch,
    Fallback,
    Done(RouteResult),
}

pub struct SafeRoutePlanner<P> {
    config: PlannerConfig,
    provider: Option<P>,
}

impl SafeRoutePlanner<DirectionsClient> {
    /// Build a planner backed by the HTTP directions client.
    ///
    /// No client is created when the provider is disabled or has no API key.
    pub fn from_config(config: PlannerConfig) -> Result<Self, DirectionsError> {
        let provider = if config.provider_configured() {
            Some(DirectionsClient::new(config.directions.clone())?)
        } else {
            if config.provider_enabled {
                tracing::info!("no directions API key configured, skipping provider");
            }
            None
        };
        Ok(Self::new(config, provider))
    }
}

impl<P: RouteProvider> SafeRoutePlanner<P> {
    pub fn new(config: PlannerConfig, provider: Option<P>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Produce the lowest-risk route available from `start` to `end`.
    pub async fn plan(
        &self,
        start: Coordinate,
        end: Coordinate,
        hotspots: &[Hotspot],
    ) -> RouteResult {
        let mut stage = PlanStage::TryProvider;
        loop {
            stage = match stage {
                PlanStage::TryProvider => {
                    tracing::debug!("trying directions provider");
                    match self.try_provider(start, end, hotspots).await {
                        Some(result) => PlanStage::Done(result),
                        None => PlanStage::TryGridSearch,
                    }
                }
                PlanStage::TryGridSearch => {
                    tracing::debug!("trying grid search");
                    match self.try_grid_search(start, end, hotspots) {
                        Some(result) => PlanStage::Done(result),
                        None => PlanStage::Fallback,
                    }
                }
                PlanStage::Fallback => {
                    tracing::debug!("falling back to straight line");
                    PlanStage::Done(self.straight_line(start, end, hotspots))
                }
                PlanStage::Done(result) => {
                    tracing::info!(
                        source = ?result.source,
                        risk_score = result.chosen.risk_score,
                        alternatives = result.alternatives.len(),
                        "route planned"
                    );
                    return result;
                }
            };
        }
    }

    async fn try_provider(
        &self,
        start: Coordinate,
        end: Coordinate,
        hotspots: &[Hotspot],
    ) -> Option<RouteResult> {
        if !self.config.provider_enabled {
            return None;
        }
        let provider = self.provider.as_ref()?;

        let timeout = self.config.directions.timeout;
        let routes = match tokio::time::timeout(timeout, provider.fetch_routes(start, end)).await {
            Ok(routes) => routes,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "directions provider timed out"
                );
                return None;
            }
        };
        if routes.is_empty() {
            tracing::warn!("directions provider returned no routes");
            return None;
        }

        let candidates: Vec<CandidateRoute> = routes
            .into_iter()
            .filter(|route| route.points.len() >= 2)
            .map(|route| {
                scored_candidate(
                    route.points,
                    route.encoded_polyline,
                    route.distance_m,
                    route.duration_s,
                    hotspots,
                )
            })
            .collect();

        let ranked = rank_candidates(candidates)?;
        Some(RouteResult {
            chosen: ranked.best,
            alternatives: ranked.runner_ups,
            source: RouteSource::Provider,
        })
    }

    fn try_grid_search(
        &self,
        start: Coordinate,
        end: Coordinate,
        hotspots: &[Hotspot],
    ) -> Option<RouteResult> {
        let search = find_grid_path(start, end, hotspots, &self.config.grid);
        if !search.success {
            tracing::warn!(
                expansions = search.expansions,
                failure = ?search.failure,
                "grid search found no path"
            );
            return None;
        }
        tracing::debug!(
            expansions = search.expansions,
            points = search.path.len(),
            "grid search succeeded"
        );

        let encoded = encode_polyline(&search.path);
        let distance_m = Some(path_length(&search.path).round() as u64);
        Some(RouteResult {
            chosen: scored_candidate(search.path, encoded, distance_m, None, hotspots),
            alternatives: Vec::new(),
            source: RouteSource::GridSearch,
        })
    }

    fn straight_line(
        &self,
        start: Coordinate,
        end: Coordinate,
        hotspots: &[Hotspot],
    ) -> RouteResult {
        let points = vec![start, end];
        // Score the sampled segment; report only the endpoints.
        let samples = densify(&points, self.config.grid.step_length_m());
        let risk = score_points(&samples, hotspots);
        let chosen = CandidateRoute {
            encoded_polyline: encode_polyline(&points),
            distance_m: Some(path_length(&points).round() as u64),
            duration_s: None,
            risk_score: risk.risk_score,
            avoided_hotspots: risk.avoided_hotspots,
            points,
        };
        RouteResult {
            chosen,
            alternatives: Vec::new(),
            source: RouteSource::StraightLine,
        }
    }
}

/// Route fields shared by the chosen route and its alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub polyline: String,
    pub risk_score: u32,
    pub avoided_hotspots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl From<&CandidateRoute> for RouteSummary {
    fn from(route: &CandidateRoute) -> Self {
        Self {
            polyline: route.encoded_polyline.clone(),
            risk_score: route.risk_score,
            avoided_hotspots: route.avoided_hotspots,
            distance: route.distance_m,
            duration: route.duration_s,
        }
    }
}

/// Wire shape of a planning answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeRouteResponse {
    #[serde(flatten)]
    pub route: RouteSummary,
    pub points: Vec<Coordinate>,
    pub source: RouteSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<RouteSummary>,
}

impl From<RouteResult> for SafeRouteResponse {
    fn from(result: RouteResult) -> Self {
        Self {
            route: RouteSummary::from(&result.chosen),
            alternatives: result.alternatives.iter().map(RouteSummary::from).collect(),
            points: result.chosen.points,
            source: result.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saferoute_directions::provider::ProviderRoute;

    struct FixedProvider(Vec<ProviderRoute>);

    impl RouteProvider for FixedProvider {
        async fn fetch_routes(&self, _start: Coordinate, _end: Coordinate) -> Vec<ProviderRoute> {
            self.0.clone()
        }
    }

    fn planner(provider: Option<FixedProvider>) -> SafeRoutePlanner<FixedProvider> {
        SafeRoutePlanner::new(PlannerConfig::default(), provider)
    }

    #[tokio::test]
    async fn empty_provider_answer_falls_through_to_grid() {
        let start = Coordinate::new(12.0, 77.0);
        let end = Coordinate::new(12.0, 77.003);
        let result = planner(Some(FixedProvider(Vec::new())))
            .plan(start, end, &[])
            .await;

        assert_eq!(result.source, RouteSource::GridSearch);
        assert_eq!(result.chosen.points.last(), Some(&end));
        assert!(result.chosen.duration_s.is_none());
        assert!(result.chosen.distance_m.is_some());
    }

    #[tokio::test]
    async fn degenerate_provider_routes_are_ignored() {
        let provider = FixedProvider(vec![ProviderRoute {
            points: vec![Coordinate::new(1.0, 1.0)],
            encoded_polyline: encode_polyline(&[Coordinate::new(1.0, 1.0)]),
            distance_m: None,
            duration_s: None,
        }]);
        let result = planner(Some(provider))
            .plan(Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.002), &[])
            .await;
        assert_eq!(result.source, RouteSource::GridSearch);
    }

    #[test]
    fn straight_line_scores_interior_samples() {
        let hotspot = Hotspot::new(0.0, 0.0, 250.0, Some(100.0));
        let start = Coordinate::new(0.0, -0.005);
        let end = Coordinate::new(0.0, 0.005);

        let result = planner(None).straight_line(start, end, &[hotspot]);
        assert_eq!(result.chosen.points, vec![start, end]);
        assert!(result.chosen.risk_score > 0);
        assert!(result.chosen.avoided_hotspots > 0);
        assert_eq!(result.chosen.distance_m, Some(1112));
    }

    #[test]
    fn response_omits_empty_alternatives_and_unknown_summary_fields() {
        let result = planner(None).straight_line(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.001),
            &[],
        );
        let value = serde_json::to_value(SafeRouteResponse::from(result)).expect("json");

        assert_eq!(value["source"], "straight_line");
        assert_eq!(value["risk_score"], 0);
        assert_eq!(value["distance"], 111);
        assert!(value.get("duration").is_none());
        assert!(value.get("alternatives").is_none());
        assert_eq!(value["points"].as_array().map(Vec::len), Some(2));
        assert!(value["polyline"].is_string());
    }
}
