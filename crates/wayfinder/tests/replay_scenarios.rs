//! Replay of the bundled scenarios against the simulated backend.

use std::path::PathBuf;
use std::time::Duration;
use wayfinder::{replay, ReplayOptions, Scenario};
use wayfinder_engine::{EngineConfig, QueryPointType};

fn scenario(name: &str) -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name);
    Scenario::load(&path).unwrap()
}

fn options() -> ReplayOptions {
    ReplayOptions {
        latency: Duration::from_millis(5),
        timeout: Duration::from_secs(10),
    }
}

#[tokio::test]
async fn test_berlin_potsdam_ends_on_via_route() {
    let scenario = scenario("berlin_potsdam.toml");
    let outcome = replay(&scenario, &EngineConfig::default(), options())
        .await
        .unwrap();

    let query = &outcome.snapshot.query;
    assert_eq!(query.routing_profile.name, "car");
    assert_eq!(query.query_points.len(), 3);
    assert_eq!(query.query_points[1].point_type, QueryPointType::Via);
    assert_eq!(query.query_points[1].query_text, "52.45,13.25");

    // Two requests for the first pair, one once the via point is added.
    assert_eq!(outcome.stats.requests_issued, 3);
    assert_eq!(outcome.stats.completions, 3);

    let route = &outcome.snapshot.route;
    assert_eq!(route.routing_result.paths.len(), 1);
    assert_eq!(route.selected_path.snapped_waypoints.coordinates.len(), 3);
    assert!(outcome.snapshot.error.is_none());
}

#[tokio::test]
async fn test_custom_model_refusal_surfaces_error() {
    let scenario = scenario("custom_model_too_far.json");
    let outcome = replay(&scenario, &EngineConfig::default(), options())
        .await
        .unwrap();

    assert_eq!(outcome.stats.requests_issued, 0);
    assert!(!outcome.snapshot.route.has_route());
    let error = outcome.snapshot.error.expect("refusal error");
    assert!(error.message.contains("500km"));
}

#[tokio::test]
async fn test_scenario_config_overrides_limit() {
    let mut scenario = scenario("custom_model_too_far.json");
    let mut config = EngineConfig::default();
    config.custom_model.max_leg_m = 1_000_000.0;
    scenario.config = Some(config);

    let outcome = replay(&scenario, &EngineConfig::default(), options())
        .await
        .unwrap();

    // Inside the widened limit but above the single-request band: primary only.
    assert_eq!(outcome.stats.requests_issued, 1);
    assert!(outcome.snapshot.route.has_route());
    assert!(outcome.snapshot.error.is_none());
}
