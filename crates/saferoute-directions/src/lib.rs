//! SafeRoute Directions - third-party directions provider adapter
//!
//! Fetches alternative routes and decodes their overview polylines.

pub mod client;
pub mod provider;

pub use client::{DirectionsClient, DirectionsConfig, DirectionsError, DEFAULT_DIRECTIONS_URL};
pub use provider::{ProviderRoute, RouteProvider};
