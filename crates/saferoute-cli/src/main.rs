//! Plan a single safe route and print it as JSON.
//!
//! Usage:
//!   safe_route --start 12.9716,77.5946 --end 12.9352,77.6245 --pretty

use anyhow::{Context, Result};
use clap::Parser;
use saferoute_cli::parse_coordinate;
use saferoute_core::models::Coordinate;
use saferoute_planner::{HotspotSnapshot, PlannerConfig, SafeRoutePlanner, SafeRouteResponse};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a route that avoids risk hotspots")]
struct Args {
    /// Start point as LAT,LNG
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    start: Coordinate,

    /// Destination as LAT,LNG
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    end: Coordinate,

    /// Hotspot snapshot (overrides SAFEROUTE_HOTSPOTS_PATH)
    #[arg(long)]
    hotspots: Option<PathBuf>,

    /// Grid search expansion cap (overrides SAFEROUTE_MAX_EXPANSIONS)
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Skip the directions provider
    #[arg(long, default_value_t = false)]
    no_provider: bool,

    /// Pretty-print the JSON response
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs)?;

    let mut config = PlannerConfig::from_env();
    if let Some(path) = args.hotspots {
        config.hotspots_path = path;
    }
    if let Some(cap) = args.max_expansions {
        config.grid.max_expansions = cap;
    }
    if args.no_provider {
        config.provider_enabled = false;
    }

    tracing::info!(
        start = ?args.start,
        end = ?args.end,
        hotspots_path = %config.hotspots_path.display(),
        provider = config.provider_configured(),
        "planning safe route"
    );
    let snapshot = HotspotSnapshot::load(&config.hotspots_path);
    let planner = SafeRoutePlanner::from_config(config)
        .context("failed to build directions client")?;

    let result = planner
        .plan(args.start, args.end, snapshot.hotspots())
        .await;
    tracing::debug!(
        source = ?result.source,
        points = result.chosen.points.len(),
        "writing response"
    );
    let response = SafeRouteResponse::from(result);

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{output}");
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("saferoute_planner=info".parse()?)
        .add_directive("saferoute_directions=info".parse()?)
        .add_directive("safe_route=info".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
    Ok(())
}
