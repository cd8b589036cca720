//! Replay event loop.
//!
//! The engine is single-threaded and stays on the task driving this loop.
//! Routing requests leave it through a channel gateway, are served on tokio
//! tasks by the simulated backend, and come back over a completion channel.
//! Each completion is dispatched as its own turn.

use crate::backend::SimulatedBackend;
use crate::scenario::Scenario;
use serde::Serialize;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use wayfinder_engine::{
    Action, DispatchError, Engine, EngineConfig, EngineSnapshot, LogCueSink, RouteGateway,
    RoutingArgs,
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("replay did not settle within {0:?}")]
    Timeout(Duration),
}

/// Hands requests to the event loop over an unbounded tokio channel.
pub struct ChannelGateway {
    tx: mpsc::UnboundedSender<RoutingArgs>,
}

impl ChannelGateway {
    pub fn new(tx: mpsc::UnboundedSender<RoutingArgs>) -> Self {
        Self { tx }
    }
}

impl RouteGateway for ChannelGateway {
    fn issue_route(&self, args: &RoutingArgs) {
        if self.tx.send(args.clone()).is_err() {
            tracing::warn!(token = %args.token, "event loop gone, request dropped");
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub latency: Duration,
    /// Upper bound on the whole replay, including settling.
    pub timeout: Duration,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(50),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub steps: usize,
    pub requests_issued: usize,
    pub completions: usize,
    pub turns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub stats: ReplayStats,
    pub snapshot: EngineSnapshot,
}

/// Runs every step of `scenario`, then waits until no request is in flight.
pub async fn replay(
    scenario: &Scenario,
    base_config: &EngineConfig,
    options: ReplayOptions,
) -> Result<ReplayOutcome, ReplayError> {
    let config = scenario.config.clone().unwrap_or_else(|| base_config.clone());
    let backend = SimulatedBackend::new(options.latency);
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<RoutingArgs>();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Action>();
    let engine = Engine::new(
        &config,
        Rc::new(ChannelGateway::new(request_tx)),
        Rc::new(LogCueSink),
    );

    info!(
        scenario = %scenario.name,
        steps = scenario.steps.len(),
        latency_ms = options.latency.as_millis() as u64,
        "starting replay"
    );

    let deadline = sleep(options.timeout);
    tokio::pin!(deadline);

    let mut stats = ReplayStats::default();
    let mut in_flight = 0usize;
    let mut steps = scenario.steps.iter();
    let mut next_step = steps.next();
    let step_timer = sleep(step_delay(next_step));
    tokio::pin!(step_timer);

    while next_step.is_some() || in_flight > 0 {
        tokio::select! {
            _ = &mut deadline => {
                return Err(ReplayError::Timeout(options.timeout));
            }
            _ = &mut step_timer, if next_step.is_some() => {
                if let Some(step) = next_step.take() {
                    debug!(action = step.action.name(), "scenario step");
                    stats.steps += 1;
                    stats.turns += engine.dispatch(step.action.clone())?.turns;
                }
                next_step = steps.next();
                step_timer.as_mut().reset(Instant::now() + step_delay(next_step));
            }
            Some(completion) = done_rx.recv(), if in_flight > 0 => {
                in_flight -= 1;
                stats.completions += 1;
                stats.turns += engine.dispatch(completion)?.turns;
            }
        }

        // Requests issued during the turn above.
        while let Ok(args) = request_rx.try_recv() {
            in_flight += 1;
            stats.requests_issued += 1;
            let backend = backend.clone();
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let completion = backend.serve(args).await;
                // Receiver is only dropped once the replay has returned.
                let _ = done_tx.send(completion);
            });
        }
    }

    info!(
        requests = stats.requests_issued,
        completions = stats.completions,
        turns = stats.turns,
        "replay settled"
    );
    Ok(ReplayOutcome {
        stats,
        snapshot: engine.snapshot(),
    })
}

fn step_delay(step: Option<&crate::scenario::ScenarioStep>) -> Duration {
    step.map_or(Duration::ZERO, |s| Duration::from_millis(s.wait_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioStep;
    use wayfinder_engine::{Coordinate, PointId, QueryPoint, QueryPointType, RoutingProfile};

    fn point(lat: f64, lng: f64) -> QueryPoint {
        QueryPoint {
            id: PointId::new(0),
            coordinate: Coordinate::new(lat, lng),
            query_text: String::new(),
            is_initialized: true,
            color: String::new(),
            point_type: QueryPointType::Via,
        }
    }

    fn step(action: Action) -> ScenarioStep {
        ScenarioStep { wait_ms: 0, action }
    }

    fn options() -> ReplayOptions {
        ReplayOptions {
            latency: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_replay_settles_with_alternatives() {
        let scenario = Scenario {
            name: "two points".to_string(),
            config: None,
            steps: vec![step(Action::SetRoutingParametersAtOnce {
                points: vec![point(50.0, 10.0), point(50.1, 10.1)],
                profile: RoutingProfile::new("car"),
            })],
        };
        let outcome = replay(&scenario, &EngineConfig::default(), options()).await.unwrap();

        assert_eq!(outcome.stats.requests_issued, 2);
        assert_eq!(outcome.stats.completions, 2);
        assert_eq!(outcome.snapshot.route.routing_result.paths.len(), 3);
        assert_eq!(outcome.snapshot.query.current_request.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_replay_superseded_batch_not_shown() {
        let scenario = Scenario {
            name: "moved".to_string(),
            config: None,
            steps: vec![
                step(Action::SetRoutingParametersAtOnce {
                    points: vec![point(50.0, 10.0), point(50.1, 10.1)],
                    profile: RoutingProfile::new("car"),
                }),
                step(Action::SetRoutingParametersAtOnce {
                    points: vec![point(50.0, 10.0), point(50.0, 10.5)],
                    profile: RoutingProfile::new("car"),
                }),
            ],
        };
        let outcome = replay(&scenario, &EngineConfig::default(), options()).await.unwrap();

        assert_eq!(outcome.stats.requests_issued, 4);
        let selected = &outcome.snapshot.route.selected_path;
        let last = selected.points.coordinates.last().unwrap();
        assert!((last.lng - 10.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_replay_unknown_profile_keeps_route_empty() {
        let scenario = Scenario {
            name: "rejected".to_string(),
            config: None,
            steps: vec![step(Action::SetRoutingParametersAtOnce {
                points: vec![point(50.0, 10.0), point(50.1, 10.1)],
                profile: RoutingProfile::new("hovercraft"),
            })],
        };
        let outcome = replay(&scenario, &EngineConfig::default(), options()).await.unwrap();

        assert_eq!(outcome.stats.completions, 2);
        assert!(!outcome.snapshot.route.has_route());
        assert_eq!(outcome.snapshot.query.current_request.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_channel_gateway_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gateway = ChannelGateway::new(tx);
        gateway.issue_route(&RoutingArgs {
            token: wayfinder_engine::RequestToken {
                batch: wayfinder_engine::BatchSeq::new(1),
                slot: 0,
            },
            points: vec![],
            profile: "car".to_string(),
            max_alternative_routes: 1,
            custom_model: None,
            zoom: true,
        });
        assert_eq!(rx.recv().await.unwrap().profile, "car");
    }
}
