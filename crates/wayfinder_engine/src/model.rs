//! Data model shared by the stores: query points, requests and routing results.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use wayfinder_ids::{BatchSeq, PointId};

// ============================================================================
// Query points
// ============================================================================

/// Role of a point, derived purely from its position in the point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryPointType {
    From,
    To,
    Via,
}

impl QueryPointType {
    /// First is From, last is To, everything in between is Via.
    pub fn for_position(index: usize, count: usize) -> Self {
        if index == 0 {
            QueryPointType::From
        } else if index + 1 == count {
            QueryPointType::To
        } else {
            QueryPointType::Via
        }
    }

    pub fn marker_color(&self) -> &'static str {
        match self {
            QueryPointType::From => "#417900",
            QueryPointType::To => "#F97777",
            QueryPointType::Via => "#76D0F7",
        }
    }
}

/// A waypoint as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub id: PointId,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub query_text: String,
    pub is_initialized: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_point_type")]
    pub point_type: QueryPointType,
}

fn default_point_type() -> QueryPointType {
    QueryPointType::Via
}

impl QueryPoint {
    /// A placeholder with no usable coordinate yet.
    pub fn empty(id: PointId, point_type: QueryPointType) -> Self {
        Self {
            id,
            coordinate: Coordinate::default(),
            query_text: String::new(),
            is_initialized: false,
            color: point_type.marker_color().to_string(),
            point_type,
        }
    }

    /// Copy of this point with type and color recomputed for its list position.
    pub fn positioned(&self, index: usize, count: usize) -> Self {
        let point_type = QueryPointType::for_position(index, count);
        Self {
            point_type,
            color: point_type.marker_color().to_string(),
            ..self.clone()
        }
    }
}

/// Recompute type and color for every point after the list shape changed.
pub fn reposition_points(points: &[QueryPoint]) -> Vec<QueryPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, point)| point.positioned(i, points.len()))
        .collect()
}

// ============================================================================
// Profiles and custom models
// ============================================================================

/// Selected vehicle profile. An empty name disables routing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutingProfile {
    pub name: String,
}

impl RoutingProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_selected(&self) -> bool {
        !self.name.is_empty()
    }
}

/// User-authored edge weighting document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_influence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub areas: Option<Value>,
}

/// Server capabilities as reported by the info endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiInfo {
    pub profiles: Vec<RoutingProfile>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
}

// ============================================================================
// Requests
// ============================================================================

/// Correlation token: batch sequence number plus position inside the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken {
    pub batch: BatchSeq,
    pub slot: u32,
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.batch, self.slot)
    }
}

/// Everything the backend needs for one routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingArgs {
    pub token: RequestToken,
    /// `[lng, lat]` pairs in leg order.
    pub points: Vec<[f64; 2]>,
    pub profile: String,
    pub max_alternative_routes: u32,
    pub custom_model: Option<CustomModel>,
    pub zoom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Sent,
    Success,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Success | RequestState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRequest {
    pub args: RoutingArgs,
    pub state: RequestState,
}

/// The batch of sub-requests issued by the latest routing decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentRequest {
    pub sub_requests: Vec<SubRequest>,
}

impl CurrentRequest {
    pub fn position(&self, token: &RequestToken) -> Option<usize> {
        self.sub_requests.iter().position(|r| r.args.token == *token)
    }

    /// Index of the last sub-request that already succeeded.
    pub fn most_recent_success(&self) -> Option<usize> {
        self.sub_requests
            .iter()
            .rposition(|r| r.state == RequestState::Success)
    }

    /// A result is stale when its token is not part of this batch, or a later
    /// sub-request of the batch has already succeeded.
    pub fn is_stale(&self, token: &RequestToken) -> bool {
        match (self.position(token), self.most_recent_success()) {
            (None, _) => true,
            (Some(index), Some(latest)) => latest > index,
            (Some(_), None) => false,
        }
    }

    /// Copy with the matching sub-request moved to `state`. Unknown tokens leave it untouched.
    pub fn with_state(&self, token: &RequestToken, state: RequestState) -> Self {
        Self {
            sub_requests: self
                .sub_requests
                .iter()
                .map(|r| {
                    if r.args.token == *token {
                        SubRequest {
                            state,
                            ..r.clone()
                        }
                    } else {
                        r.clone()
                    }
                })
                .collect(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.sub_requests
            .iter()
            .filter(|r| !r.state.is_terminal())
            .count()
    }
}

// ============================================================================
// Results
// ============================================================================

/// Plain coordinate sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineString {
    pub coordinates: Vec<Coordinate>,
}

impl LineString {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self { coordinates }
    }
}

/// One turn instruction and the geometry it covers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    pub distance: f64,
    /// Milliseconds.
    pub time: u64,
    pub sign: i32,
    pub points: Vec<Coordinate>,
}

/// `[from, to]` index range into the path geometry carrying one detail value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailInterval {
    pub from: usize,
    pub to: usize,
    pub value: Value,
}

/// A computed route. Immutable once received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    pub distance: f64,
    /// Milliseconds.
    pub time: u64,
    pub ascend: f64,
    pub descend: f64,
    /// `[min_lng, min_lat, max_lng, max_lat]`
    pub bbox: [f64; 4],
    pub points: LineString,
    pub snapped_waypoints: LineString,
    pub instructions: Vec<Instruction>,
    /// Per-edge detail channels such as `max_speed`, `street_name`, `toll`.
    pub details: BTreeMap<String, Vec<DetailInterval>>,
    pub points_order: Vec<usize>,
}

impl Path {
    /// The placeholder selected before any route arrived.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultInfo {
    pub copyright: Vec<String>,
    /// Server side milliseconds.
    pub took: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutingResult {
    pub paths: Vec<Path>,
    pub info: ResultInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(batch: u64, slot: u32) -> RoutingArgs {
        RoutingArgs {
            token: RequestToken {
                batch: BatchSeq::new(batch),
                slot,
            },
            points: vec![],
            profile: "car".to_string(),
            max_alternative_routes: 1,
            custom_model: None,
            zoom: true,
        }
    }

    fn batch(states: &[RequestState]) -> CurrentRequest {
        CurrentRequest {
            sub_requests: states
                .iter()
                .enumerate()
                .map(|(i, state)| SubRequest {
                    args: args(7, i as u32),
                    state: *state,
                })
                .collect(),
        }
    }

    #[test]
    fn test_point_type_for_position() {
        assert_eq!(QueryPointType::for_position(0, 3), QueryPointType::From);
        assert_eq!(QueryPointType::for_position(1, 3), QueryPointType::Via);
        assert_eq!(QueryPointType::for_position(2, 3), QueryPointType::To);
        assert_eq!(QueryPointType::for_position(0, 1), QueryPointType::From);
    }

    #[test]
    fn test_reposition_points_colors_follow_type() {
        let points = vec![
            QueryPoint::empty(PointId::new(0), QueryPointType::Via),
            QueryPoint::empty(PointId::new(1), QueryPointType::From),
            QueryPoint::empty(PointId::new(2), QueryPointType::From),
        ];
        let points = reposition_points(&points);
        let types: Vec<_> = points.iter().map(|p| p.point_type).collect();
        assert_eq!(
            types,
            vec![QueryPointType::From, QueryPointType::Via, QueryPointType::To]
        );
        for p in &points {
            assert_eq!(p.color, p.point_type.marker_color());
        }
    }

    #[test]
    fn test_unknown_token_is_stale() {
        let current = batch(&[RequestState::Sent, RequestState::Sent]);
        assert!(current.is_stale(&args(6, 0).token));
        assert!(!current.is_stale(&args(7, 0).token));
    }

    #[test]
    fn test_earlier_slot_stale_after_later_success() {
        let current = batch(&[RequestState::Success, RequestState::Success]);
        assert!(current.is_stale(&args(7, 0).token));
        assert!(!current.is_stale(&args(7, 1).token));
    }

    #[test]
    fn test_later_slot_accepted_after_earlier_success() {
        let current = batch(&[RequestState::Success, RequestState::Sent]);
        assert!(!current.is_stale(&args(7, 1).token));
    }

    #[test]
    fn test_with_state_ignores_unknown_token() {
        let current = batch(&[RequestState::Sent]);
        assert_eq!(current.with_state(&args(1, 0).token, RequestState::Failed), current);
        let updated = current.with_state(&args(7, 0).token, RequestState::Failed);
        assert_eq!(updated.sub_requests[0].state, RequestState::Failed);
        assert_eq!(updated.in_flight(), 0);
    }

    #[test]
    fn test_in_flight_counts_unanswered_slots() {
        let current = batch(&[RequestState::Failed, RequestState::Sent, RequestState::Success]);
        assert_eq!(current.in_flight(), 1);
        assert!(!RequestState::Sent.is_terminal());
    }

    #[test]
    fn test_request_state_serde() {
        let encoded = serde_json::to_string(&RequestState::Success).unwrap();
        assert_eq!(encoded, "\"SUCCESS\"");
    }
}
