//! Planner configuration from environment.

use saferoute_core::route_engine::GridPlannerConfig;
use saferoute_directions::client::{DirectionsConfig, DEFAULT_DIRECTIONS_URL, DEFAULT_TRAVEL_MODE};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOTSPOTS_PATH: &str = "data/hotspots.json";
const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub hotspots_path: PathBuf,
    pub provider_enabled: bool,
    pub directions: DirectionsConfig,
    pub grid: GridPlannerConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            hotspots_path: PathBuf::from(DEFAULT_HOTSPOTS_PATH),
            provider_enabled: true,
            directions: DirectionsConfig::default(),
            grid: GridPlannerConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        let grid_defaults = GridPlannerConfig::default();
        Self {
            hotspots_path: env::var("SAFEROUTE_HOTSPOTS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_HOTSPOTS_PATH)),
            provider_enabled: env_flag("SAFEROUTE_PROVIDER_ENABLED", true),
            directions: DirectionsConfig {
                base_url: env::var("SAFEROUTE_DIRECTIONS_URL")
                    .unwrap_or_else(|_| DEFAULT_DIRECTIONS_URL.to_string()),
                api_key: env::var("SAFEROUTE_DIRECTIONS_API_KEY")
                    .ok()
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty()),
                travel_mode: env::var("SAFEROUTE_TRAVEL_MODE")
                    .unwrap_or_else(|_| DEFAULT_TRAVEL_MODE.to_string()),
                timeout: Duration::from_millis(env_parse(
                    "SAFEROUTE_PROVIDER_TIMEOUT_MS",
                    DEFAULT_PROVIDER_TIMEOUT_MS,
                )),
            },
            grid: GridPlannerConfig {
                step_deg: env_parse("SAFEROUTE_GRID_STEP_DEG", grid_defaults.step_deg),
                goal_threshold_m: env_parse(
                    "SAFEROUTE_GOAL_THRESHOLD_M",
                    grid_defaults.goal_threshold_m,
                ),
                max_expansions: env_parse("SAFEROUTE_MAX_EXPANSIONS", grid_defaults.max_expansions),
                risk_weight: env_parse("SAFEROUTE_RISK_WEIGHT", grid_defaults.risk_weight),
            },
        }
    }

    /// True when provider routing is enabled and a credential is present.
    pub fn provider_configured(&self) -> bool {
        self.provider_enabled && self.directions.api_key.is_some()
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
