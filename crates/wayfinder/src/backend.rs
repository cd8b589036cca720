//! Simulated routing backend used by `wayfinder replay`.
//!
//! Paths are straight lines between the waypoints, densified so instructions
//! and detail intervals have geometry to point at. Alternatives bend the
//! interior of the line sideways. Requests asking for alternatives answer
//! later than primary ones, so results arrive out of order like they do
//! against a real server.

use std::collections::BTreeMap;
use std::time::Duration;
use wayfinder_engine::geo::calc_dist;
use wayfinder_engine::model::{DetailInterval, Instruction, LineString, ResultInfo};
use wayfinder_engine::{Action, Coordinate, GatewayError, Path, RoutingArgs, RoutingResult};

/// Intermediate points per leg.
const STEPS_PER_LEG: usize = 8;
/// Sideways offset of the k-th alternative, in degrees at mid-leg.
const ALTERNATIVE_OFFSET_DEG: f64 = 0.01;
/// Alternatives requests take this many times the base latency.
const ALTERNATIVES_SLOWDOWN: u32 = 3;

#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    latency: Duration,
    profiles: Vec<String>,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            profiles: ["car", "bike", "foot"].iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn latency_for(&self, args: &RoutingArgs) -> Duration {
        if args.max_alternative_routes > 1 {
            self.latency * ALTERNATIVES_SLOWDOWN
        } else {
            self.latency
        }
    }

    /// Wait out the simulated latency, then answer with the action to dispatch.
    pub async fn serve(&self, args: RoutingArgs) -> Action {
        tokio::time::sleep(self.latency_for(&args)).await;
        match self.route(&args) {
            Ok(result) => Action::RouteRequestSuccess {
                request: args,
                result,
            },
            Err(error) => Action::RouteRequestFailed {
                request: args,
                error,
            },
        }
    }

    pub fn route(&self, args: &RoutingArgs) -> Result<RoutingResult, GatewayError> {
        if !self.profiles.iter().any(|p| *p == args.profile) {
            return Err(GatewayError::Rejected {
                message: format!("profile '{}' not found", args.profile),
            });
        }
        if args.points.len() < 2 {
            return Err(GatewayError::Rejected {
                message: "at least two points are required".to_string(),
            });
        }
        let waypoints: Vec<Coordinate> = args.points.iter().map(|p| Coordinate::from_lng_lat(*p)).collect();
        let count = args.max_alternative_routes.max(1) as usize;
        let paths = (0..count)
            .map(|k| build_path(&waypoints, k, speed_mps(&args.profile)))
            .collect();
        Ok(RoutingResult {
            paths,
            info: ResultInfo {
                copyright: vec!["wayfinder simulation".to_string()],
                took: 0,
            },
        })
    }
}

fn speed_mps(profile: &str) -> f64 {
    match profile {
        "foot" => 1.4,
        "bike" => 4.5,
        _ => 13.9,
    }
}

/// Densified line through all waypoints, bent by `alternative` offsets.
fn build_path(waypoints: &[Coordinate], alternative: usize, speed: f64) -> Path {
    let mut coordinates = vec![waypoints[0]];
    let mut instructions = Vec::new();
    for (leg_index, leg) in waypoints.windows(2).enumerate() {
        let (start, end) = (leg[0], leg[1]);
        let perp = perpendicular_unit(start, end);
        let first = coordinates.len() - 1;
        for i in 1..=STEPS_PER_LEG {
            let t = i as f64 / STEPS_PER_LEG as f64;
            // Zero at both ends so the waypoints stay fixed.
            let bend = (t * std::f64::consts::PI).sin() * ALTERNATIVE_OFFSET_DEG * alternative as f64;
            coordinates.push(Coordinate::new(
                start.lat + (end.lat - start.lat) * t + perp.lat * bend,
                start.lng + (end.lng - start.lng) * t + perp.lng * bend,
            ));
        }
        let leg_points = coordinates[first..].to_vec();
        let distance = line_length(&leg_points);
        instructions.push(Instruction {
            text: if leg_index == 0 {
                "Continue".to_string()
            } else {
                format!("Continue after waypoint {}", leg_index)
            },
            distance,
            time: (distance / speed * 1000.0) as u64,
            sign: 0,
            points: leg_points,
        });
    }
    let last = coordinates[coordinates.len() - 1];
    instructions.push(Instruction {
        text: "Arrive at destination".to_string(),
        distance: 0.0,
        time: 0,
        sign: 4,
        points: vec![last],
    });

    let distance = line_length(&coordinates);
    let mut details = BTreeMap::new();
    details.insert(
        "road_class".to_string(),
        vec![DetailInterval {
            from: 0,
            to: coordinates.len() - 1,
            value: serde_json::json!(if alternative == 0 { "primary" } else { "secondary" }),
        }],
    );

    Path {
        distance,
        time: (distance / speed * 1000.0) as u64,
        ascend: 0.0,
        descend: 0.0,
        bbox: bbox_of(&coordinates),
        snapped_waypoints: LineString::new(waypoints.to_vec()),
        points: LineString::new(coordinates),
        instructions,
        details,
        points_order: (0..waypoints.len()).collect(),
    }
}

fn line_length(coordinates: &[Coordinate]) -> f64 {
    coordinates.windows(2).map(|w| calc_dist(w[0], w[1])).sum()
}

fn perpendicular_unit(start: Coordinate, end: Coordinate) -> Coordinate {
    let dx = end.lng - start.lng;
    let dy = end.lat - start.lat;
    let len = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
    Coordinate::new(dx / len, -dy / len)
}

fn bbox_of(coordinates: &[Coordinate]) -> [f64; 4] {
    coordinates.iter().fold(
        [f64::MAX, f64::MAX, f64::MIN, f64::MIN],
        |[min_lng, min_lat, max_lng, max_lat], c| {
            [min_lng.min(c.lng), min_lat.min(c.lat), max_lng.max(c.lng), max_lat.max(c.lat)]
        },
    )
}
