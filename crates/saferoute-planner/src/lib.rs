//! Safe route planning on top of the core engine.

pub mod config;
pub mod route_planner;
pub mod snapshot;

pub use config::PlannerConfig;
pub use route_planner::{RouteSummary, SafeRoutePlanner, SafeRouteResponse};
pub use snapshot::{HotspotSnapshot, SnapshotError};
