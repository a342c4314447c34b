pub mod models;
pub mod polyline;
pub mod risk;
pub mod route_engine;
pub mod scoring;
pub mod spatial;

pub use models::{
    CandidateRoute, Coordinate, GridCoordinate, Hotspot, RouteResult, RouteSource, Severity,
};
pub use polyline::{decode_polyline, encode_polyline, PolylineError};
pub use risk::{point_exposure, risk_penalty, PointExposure};
pub use route_engine::{find_grid_path, GridPlannerConfig, GridSearchResult, SearchFailure};
pub use scoring::{rank_candidates, score_points, scored_candidate, RankedRoutes, RouteRisk};
pub use spatial::{densify, distance, haversine_distance, path_length};
