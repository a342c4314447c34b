//! Grid best-first planner used when no provider route is available.
//!
//! The search moves on an implicit grid of fixed degree steps. Edge cost is
//! the travelled distance plus a weighted hotspot penalty for the node being
//! entered; the heuristic is the straight-line distance to the goal and does
//! not account for risk. The result is therefore a weighted best-first search:
//! it prefers low-risk corridors but does not guarantee the globally
//! risk-optimal path.
//!
//! The step is constant in degrees, so cells shrink east-west away from the
//! equator (~111 m square only at latitude 0).

use crate::models::{Coordinate, GridCoordinate, Hotspot, GRID_SCALE};
use crate::risk::risk_penalty;
use crate::spatial::{distance, METERS_PER_DEGREE};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPlannerConfig {
    /// Grid step in degrees of latitude/longitude.
    pub step_deg: f64,
    /// A popped node this close to the goal ends the search.
    pub goal_threshold_m: f64,
    /// Node expansions allowed before the search gives up.
    pub max_expansions: usize,
    /// Meters of travel one unit of hotspot penalty is worth.
    pub risk_weight: f64,
}

impl Default for GridPlannerConfig {
    fn default() -> Self {
        Self {
            step_deg: 0.001,
            goal_threshold_m: 25.0,
            max_expansions: 20_000,
            risk_weight: 10.0,
        }
    }
}

impl GridPlannerConfig {
    fn step_e6(&self) -> i64 {
        let step = (self.step_deg.abs() * GRID_SCALE).round();
        if step.is_finite() {
            (step as i64).max(1)
        } else {
            1
        }
    }

    /// Approximate length of one grid step along a meridian.
    pub fn step_length_m(&self) -> f64 {
        self.step_e6() as f64 / GRID_SCALE * METERS_PER_DEGREE
    }

    /// Goal radius actually used by the search.
    ///
    /// Never smaller than half a cell diagonal, so some lattice node is always
    /// close enough to an off-lattice goal.
    pub fn effective_goal_threshold_m(&self) -> f64 {
        let half_diagonal = self.step_length_m() * std::f64::consts::FRAC_1_SQRT_2;
        if self.goal_threshold_m.is_finite() {
            self.goal_threshold_m.max(half_diagonal)
        } else {
            half_diagonal
        }
    }

    fn effective_risk_weight(&self) -> f64 {
        if self.risk_weight.is_finite() {
            self.risk_weight.max(0.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailure {
    #[error("expansion cap reached before the goal")]
    ExpansionCapReached,
    #[error("frontier exhausted before the goal")]
    FrontierExhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub success: bool,
    /// Start to exact goal; empty when the search failed.
    pub path: Vec<Coordinate>,
    pub expansions: usize,
    pub failure: Option<SearchFailure>,
}

impl GridSearchResult {
    fn failed(failure: SearchFailure, expansions: usize) -> Self {
        Self {
            success: false,
            path: Vec::new(),
            expansions,
            failure: Some(failure),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    key: GridCoordinate,
    g_score: FloatOrd,
    f_score: FloatOrd,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// Search for a low-risk path from `start` to `goal`.
///
/// The returned path begins at the snapped start node and always ends on the
/// exact `goal` coordinate. On failure the path is empty.
pub fn find_grid_path(
    start: Coordinate,
    goal: Coordinate,
    hotspots: &[Hotspot],
    config: &GridPlannerConfig,
) -> GridSearchResult {
    let step_e6 = config.step_e6();
    let risk_weight = config.effective_risk_weight();
    let goal_threshold_m = config.effective_goal_threshold_m();

    let start_key = GridCoordinate::from_coordinate(&start);
    let goal_point = GridCoordinate::from_coordinate(&goal).to_coordinate();

    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
    open_set.push(Reverse(OpenNode {
        key: start_key,
        g_score: FloatOrd(0.0),
        f_score: FloatOrd(distance(&start_key.to_coordinate(), &goal_point)),
    }));
    let mut closed_set: HashSet<GridCoordinate> = HashSet::new();
    let mut g_score: HashMap<GridCoordinate, f64> = HashMap::new();
    let mut came_from: HashMap<GridCoordinate, GridCoordinate> = HashMap::new();
    g_score.insert(start_key, 0.0);

    let mut expansions = 0usize;

    while let Some(Reverse(current)) = open_set.pop() {
        if closed_set.contains(&current.key) {
            continue;
        }
        if expansions >= config.max_expansions {
            return GridSearchResult::failed(SearchFailure::ExpansionCapReached, expansions);
        }
        expansions += 1;
        closed_set.insert(current.key);

        let here = current.key.to_coordinate();
        if distance(&here, &goal) <= goal_threshold_m {
            let mut path = reconstruct_path(&came_from, current.key);
            if path.last() != Some(&goal) {
                path.push(goal);
            }
            return GridSearchResult {
                success: true,
                path,
                expansions,
                failure: None,
            };
        }

        let best_g = g_score
            .get(&current.key)
            .copied()
            .unwrap_or(current.g_score.0);

        for next_key in current.key.neighbors(step_e6) {
            if closed_set.contains(&next_key) {
                continue;
            }
            let next_point = next_key.to_coordinate();
            let step_cost =
                distance(&here, &next_point) + risk_weight * risk_penalty(&next_point, hotspots);
            let tentative_g = best_g + step_cost;
            if tentative_g < g_score.get(&next_key).copied().unwrap_or(f64::INFINITY) {
                came_from.insert(next_key, current.key);
                g_score.insert(next_key, tentative_g);
                let h_score = distance(&next_point, &goal_point);
                open_set.push(Reverse(OpenNode {
                    key: next_key,
                    g_score: FloatOrd(tentative_g),
                    f_score: FloatOrd(tentative_g + h_score),
                }));
            }
        }
    }

    GridSearchResult::failed(SearchFailure::FrontierExhausted, expansions)
}

fn reconstruct_path(
    came_from: &HashMap<GridCoordinate, GridCoordinate>,
    end: GridCoordinate,
) -> Vec<Coordinate> {
    let mut keys = vec![end];
    let mut current = end;
    while let Some(parent) = came_from.get(&current) {
        keys.push(*parent);
        current = *parent;
    }
    keys.reverse();
    keys.into_iter().map(GridCoordinate::to_coordinate).collect()
}
