//! `wayfinder replay`: feed a scenario through the engine and print the outcome.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use wayfinder::{replay, ReplayOptions, ReplayOutcome, Scenario};

pub struct ReplayArgs {
    pub scenario: PathBuf,
    pub json: bool,
    pub latency_ms: u64,
    pub timeout_secs: u64,
    pub config_path: Option<PathBuf>,
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let config = super::load_config(args.config_path.as_deref())?;
    let options = ReplayOptions {
        latency: Duration::from_millis(args.latency_ms),
        timeout: Duration::from_secs(args.timeout_secs),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build tokio runtime")?;
    let outcome = runtime
        .block_on(replay(&scenario, &config, options))
        .with_context(|| format!("Replay of {} failed", args.scenario.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&scenario, &outcome);
    }
    Ok(())
}

fn print_summary(scenario: &Scenario, outcome: &ReplayOutcome) {
    let snapshot = &outcome.snapshot;
    let name = if scenario.name.is_empty() {
        "(unnamed)"
    } else {
        scenario.name.as_str()
    };
    println!("Scenario: {}", name);
    println!(
        "Steps: {}  Requests: {}  Completions: {}  Turns: {}",
        outcome.stats.steps,
        outcome.stats.requests_issued,
        outcome.stats.completions,
        outcome.stats.turns
    );
    println!();

    println!("Profile: {}", snapshot.query.routing_profile.name);
    println!("Points:");
    for point in &snapshot.query.query_points {
        println!(
            "  {:<4} {:?} {} {}",
            point.id.value(),
            point.point_type,
            point.coordinate,
            if point.is_initialized { "" } else { "(not set)" }
        );
    }
    println!();

    if snapshot.route.has_route() {
        println!("Paths: {}", snapshot.route.routing_result.paths.len());
        for (i, path) in snapshot.route.routing_result.paths.iter().enumerate() {
            let marker = if *path == snapshot.route.selected_path { "*" } else { " " };
            println!(
                "  {} #{} {:.1} km, {} min",
                marker,
                i,
                path.distance / 1000.0,
                path.time / 60_000
            );
        }
    } else {
        println!("No route.");
    }

    if let Some(error) = &snapshot.error {
        println!();
        println!("Error ({}): {}", error.raised_at.to_rfc3339(), error.message);
    }
}
