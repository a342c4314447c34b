//! Route risk scoring and candidate ranking.

use crate::models::{CandidateRoute, Coordinate, Hotspot};
use crate::risk::point_exposure;

/// Largest reported risk score.
pub const MAX_RISK_SCORE: u32 = 100;
/// Runner-up routes returned next to the winner.
pub const MAX_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteRisk {
    pub total_penalty: f64,
    pub risk_score: u32,
    /// Points that fell inside at least one high-risk hotspot.
    pub avoided_hotspots: usize,
}

/// Aggregate per-point penalties over a path and normalize to 0..=100.
pub fn score_points(points: &[Coordinate], hotspots: &[Hotspot]) -> RouteRisk {
    let mut risk = RouteRisk::default();
    for point in points {
        let exposure = point_exposure(point, hotspots);
        risk.total_penalty += exposure.penalty;
        if exposure.in_high_risk_zone {
            risk.avoided_hotspots += 1;
        }
    }
    let mean_penalty = risk.total_penalty / points.len().max(1) as f64;
    risk.risk_score = ((mean_penalty * 10.0).round() as u32).min(MAX_RISK_SCORE);
    risk
}

/// Build a candidate from a path and score it against `hotspots`.
pub fn scored_candidate(
    points: Vec<Coordinate>,
    encoded_polyline: String,
    distance_m: Option<u64>,
    duration_s: Option<u64>,
    hotspots: &[Hotspot],
) -> CandidateRoute {
    let risk = score_points(&points, hotspots);
    CandidateRoute {
        points,
        distance_m,
        duration_s,
        encoded_polyline,
        risk_score: risk.risk_score,
        avoided_hotspots: risk.avoided_hotspots,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRoutes {
    pub best: CandidateRoute,
    pub runner_ups: Vec<CandidateRoute>,
}

/// Order candidates by risk score, keeping input order among equal scores.
///
/// Returns `None` for an empty input.
pub fn rank_candidates(mut candidates: Vec<CandidateRoute>) -> Option<RankedRoutes> {
    candidates.sort_by_key(|candidate| candidate.risk_score);
    let mut ranked = candidates.into_iter();
    let best = ranked.next()?;
    let runner_ups = ranked.take(MAX_ALTERNATIVES).collect();
    Some(RankedRoutes { best, runner_ups })
}
