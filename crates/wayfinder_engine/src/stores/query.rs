//! Query store: waypoints, profile, custom model and the in-flight request batch.
//!
//! Decides whether a routing request should be sent and which ones. Requests
//! go to the gateway during the reduction; their outcome comes back as
//! `RouteRequestSuccess` / `RouteRequestFailed`, which only updates the
//! bookkeeping state of the matching sub-request.

use crate::actions::Action;
use crate::config::{CustomModelPolicy, EngineConfig};
use crate::dispatcher::{DispatchContext, Listeners, Store};
use crate::error::RoutingRefusal;
use crate::gateway::RouteGateway;
use crate::geo::{coordinate_to_text, max_leg_distance, Coordinate};
use crate::model::{
    reposition_points, CurrentRequest, CustomModel, QueryPoint, QueryPointType, RequestState,
    RequestToken, RoutingArgs, RoutingProfile, SubRequest,
};
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wayfinder_ids::{BatchSeq, ListenerId, PointId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStoreState {
    pub query_points: Vec<QueryPoint>,
    pub next_query_point_id: PointId,
    /// Sequence number the next request batch will carry.
    pub next_batch: BatchSeq,
    pub current_request: CurrentRequest,
    pub max_alternative_routes: u32,
    pub routing_profile: RoutingProfile,
    pub custom_model_enabled: bool,
    pub custom_model_valid: bool,
    pub custom_model: Option<CustomModel>,
    /// Whether the map should re-frame on the next successful result.
    pub zoom: bool,
}

impl QueryStoreState {
    /// From and To placeholders, nothing sent yet.
    pub fn initial(config: &EngineConfig) -> Self {
        Self {
            query_points: vec![
                QueryPoint::empty(PointId::new(0), QueryPointType::From),
                QueryPoint::empty(PointId::new(1), QueryPointType::To),
            ],
            next_query_point_id: PointId::new(2),
            next_batch: BatchSeq::new(0),
            current_request: CurrentRequest::default(),
            max_alternative_routes: config.max_alternative_routes,
            routing_profile: RoutingProfile::default(),
            custom_model_enabled: false,
            custom_model_valid: false,
            custom_model: None,
            zoom: config.initial_zoom,
        }
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.query_points.iter().map(|p| p.coordinate).collect()
    }

    /// All conditions for sending a request hold.
    pub fn is_ready_to_route(&self) -> bool {
        if self.custom_model_enabled && self.custom_model.is_none() {
            return false;
        }
        if self.custom_model_enabled && !self.custom_model_valid {
            return false;
        }
        if self.query_points.len() <= 1 {
            return false;
        }
        if !self.query_points.iter().all(|p| p.is_initialized) {
            return false;
        }
        self.routing_profile.is_selected()
    }
}

/// Which requests one routing decision sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestPlan {
    /// Single request without alternatives.
    PrimaryOnly,
    /// Fast primary request plus a slower one asking for alternatives.
    PrimaryWithAlternatives,
    /// One request carrying the custom model and the alternatives.
    Combined,
}

impl RequestPlan {
    /// `max_alternative_routes` of each request, in slot order.
    fn alternatives(&self, configured: u32) -> Vec<u32> {
        match self {
            RequestPlan::PrimaryOnly => vec![1],
            RequestPlan::PrimaryWithAlternatives => vec![1, configured],
            RequestPlan::Combined => vec![configured],
        }
    }
}

/// Outcome of applying the request policy.
#[derive(Debug, Clone, PartialEq)]
enum Decision {
    NotReady,
    Send(RequestPlan),
    Refuse(RoutingRefusal),
}

fn decide(state: &QueryStoreState, policy: &CustomModelPolicy) -> Decision {
    if !state.is_ready_to_route() {
        return Decision::NotReady;
    }

    let allow_alternatives = state.query_points.len() == 2 && state.max_alternative_routes > 1;
    if state.custom_model_enabled {
        // Custom model alternatives only travel inside one combined request.
        let max_leg_m = max_leg_distance(&state.coordinates());
        if allow_alternatives && max_leg_m < policy.single_request_max_leg_m {
            return Decision::Send(RequestPlan::Combined);
        }
        if max_leg_m > policy.max_leg_m {
            return Decision::Refuse(RoutingRefusal::PointsTooFarApart {
                max_leg_m,
                limit_m: policy.max_leg_m,
            });
        }
        return Decision::Send(RequestPlan::PrimaryOnly);
    }

    if allow_alternatives {
        Decision::Send(RequestPlan::PrimaryWithAlternatives)
    } else {
        Decision::Send(RequestPlan::PrimaryOnly)
    }
}

fn build_route_request(
    state: &QueryStoreState,
    token: RequestToken,
    max_alternative_routes: u32,
) -> RoutingArgs {
    RoutingArgs {
        token,
        points: state
            .query_points
            .iter()
            .map(|p| p.coordinate.to_lng_lat())
            .collect(),
        profile: state.routing_profile.name.clone(),
        max_alternative_routes,
        custom_model: if state.custom_model_enabled {
            state.custom_model.clone()
        } else {
            None
        },
        zoom: state.zoom,
    }
}

fn replace_point(points: &[QueryPoint], point: &QueryPoint) -> Vec<QueryPoint> {
    points
        .iter()
        .map(|p| if p.id == point.id { point.clone() } else { p.clone() })
        .collect()
}

pub struct QueryStore {
    state: QueryStoreState,
    gateway: Rc<dyn RouteGateway>,
    policy: CustomModelPolicy,
    listeners: Listeners<QueryStoreState>,
}

impl QueryStore {
    pub fn new(config: &EngineConfig, gateway: Rc<dyn RouteGateway>) -> Self {
        Self {
            state: QueryStoreState::initial(config),
            gateway,
            policy: config.custom_model.clone(),
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> &QueryStoreState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&QueryStoreState)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Maps `state` to its successor. Sub-requests are handed to the gateway
    /// as a side effect; a refusal is queued on `ctx` as an `ErrorAction`.
    pub fn reduce(
        &self,
        state: &QueryStoreState,
        action: &Action,
        ctx: &mut DispatchContext,
    ) -> QueryStoreState {
        match action {
            Action::InvalidatePoint { id } => QueryStoreState {
                query_points: state
                    .query_points
                    .iter()
                    .map(|p| {
                        if p.id == *id {
                            QueryPoint {
                                is_initialized: false,
                                ..p.clone()
                            }
                        } else {
                            p.clone()
                        }
                    })
                    .collect(),
                ..state.clone()
            },
            Action::ClearPoints => QueryStoreState {
                query_points: state
                    .query_points
                    .iter()
                    .map(|p| QueryPoint {
                        query_text: String::new(),
                        coordinate: Coordinate::default(),
                        is_initialized: false,
                        ..p.clone()
                    })
                    .collect(),
                ..state.clone()
            },
            Action::SetPoint { point, zoom } => self.route_if_ready(
                QueryStoreState {
                    query_points: reposition_points(&replace_point(&state.query_points, point)),
                    zoom: *zoom,
                    ..state.clone()
                },
                ctx,
            ),
            Action::AddPoint {
                at_index,
                coordinate,
                is_initialized,
            } => {
                let mut points = state.query_points.clone();
                let index = (*at_index).min(points.len());
                points.insert(
                    index,
                    QueryPoint {
                        id: state.next_query_point_id,
                        coordinate: *coordinate,
                        query_text: if *is_initialized {
                            coordinate_to_text(*coordinate)
                        } else {
                            String::new()
                        },
                        is_initialized: *is_initialized,
                        color: String::new(),
                        point_type: QueryPointType::Via,
                    },
                );
                self.route_if_ready(
                    QueryStoreState {
                        query_points: reposition_points(&points),
                        next_query_point_id: state.next_query_point_id.next(),
                        ..state.clone()
                    },
                    ctx,
                )
            }
            Action::RemovePoint { id } => {
                let remaining: Vec<QueryPoint> = state
                    .query_points
                    .iter()
                    .filter(|p| p.id != *id)
                    .cloned()
                    .collect();
                self.route_if_ready(
                    QueryStoreState {
                        query_points: reposition_points(&remaining),
                        ..state.clone()
                    },
                    ctx,
                )
            }
            Action::SetRoutingParametersAtOnce { points, profile } => {
                let count = points.len();
                let query_points = points
                    .iter()
                    .enumerate()
                    .map(|(i, point)| {
                        let query_text = if point.is_initialized && point.query_text.is_empty() {
                            coordinate_to_text(point.coordinate)
                        } else {
                            point.query_text.clone()
                        };
                        QueryPoint {
                            id: state.next_query_point_id.advance(i as u64),
                            query_text,
                            ..point.positioned(i, count)
                        }
                    })
                    .collect();
                self.route_if_ready(
                    QueryStoreState {
                        query_points,
                        next_query_point_id: state.next_query_point_id.advance(count as u64),
                        routing_profile: profile.clone(),
                        ..state.clone()
                    },
                    ctx,
                )
            }
            Action::InfoReceived { info } => {
                // A profile chosen earlier (e.g. from a link) is never overridden.
                if state.routing_profile.is_selected() {
                    return state.clone();
                }
                match info.profiles.first() {
                    Some(profile) => self.route_if_ready(
                        QueryStoreState {
                            routing_profile: profile.clone(),
                            ..state.clone()
                        },
                        ctx,
                    ),
                    None => state.clone(),
                }
            }
            Action::SetVehicleProfile { profile } => self.route_if_ready(
                QueryStoreState {
                    routing_profile: profile.clone(),
                    ..state.clone()
                },
                ctx,
            ),
            Action::SetCustomModel {
                model,
                valid,
                issue_request,
            } => {
                let next = QueryStoreState {
                    custom_model: model.clone(),
                    custom_model_valid: *valid,
                    ..state.clone()
                };
                if *issue_request {
                    self.route_if_ready(next, ctx)
                } else {
                    next
                }
            }
            Action::SetCustomModelBoxEnabled { enabled } => self.route_if_ready(
                QueryStoreState {
                    custom_model_enabled: *enabled,
                    ..state.clone()
                },
                ctx,
            ),
            Action::RouteRequestSuccess { request, .. } => {
                Self::finish_request(state, &request.token, RequestState::Success)
            }
            Action::RouteRequestFailed { request, error } => {
                debug!(token = %request.token, %error, "route request failed");
                Self::finish_request(state, &request.token, RequestState::Failed)
            }
            _ => state.clone(),
        }
    }

    fn finish_request(
        state: &QueryStoreState,
        token: &RequestToken,
        outcome: RequestState,
    ) -> QueryStoreState {
        if state.current_request.position(token).is_none() {
            debug!(%token, "result for a request outside the current batch");
            return state.clone();
        }
        QueryStoreState {
            current_request: state.current_request.with_state(token, outcome),
            ..state.clone()
        }
    }

    fn route_if_ready(&self, state: QueryStoreState, ctx: &mut DispatchContext) -> QueryStoreState {
        match decide(&state, &self.policy) {
            Decision::NotReady => state,
            Decision::Refuse(refusal) => {
                warn!(%refusal, "custom model routing refused");
                ctx.emit(Action::ErrorAction {
                    message: refusal.to_string(),
                });
                state
            }
            Decision::Send(plan) => self.send(state, plan),
        }
    }

    /// Replaces the current batch wholesale; older sub-requests are abandoned.
    fn send(&self, state: QueryStoreState, plan: RequestPlan) -> QueryStoreState {
        let batch = state.next_batch;
        let sub_requests: Vec<SubRequest> = plan
            .alternatives(state.max_alternative_routes)
            .into_iter()
            .enumerate()
            .map(|(slot, alternatives)| SubRequest {
                args: build_route_request(
                    &state,
                    RequestToken {
                        batch,
                        slot: slot as u32,
                    },
                    alternatives,
                ),
                state: RequestState::Sent,
            })
            .collect();

        info!(
            %batch,
            requests = sub_requests.len(),
            points = state.query_points.len(),
            profile = %state.routing_profile.name,
            ?plan,
            "issuing route requests"
        );
        for sub_request in &sub_requests {
            self.gateway.issue_route(&sub_request.args);
        }

        QueryStoreState {
            current_request: CurrentRequest { sub_requests },
            next_batch: batch.next(),
            ..state
        }
    }
}

impl Store for QueryStore {
    fn name(&self) -> &'static str {
        "query"
    }

    fn receive(&mut self, action: &Action, ctx: &mut DispatchContext) -> bool {
        let next = self.reduce(&self.state, action, ctx);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.listeners.notify(&self.state);
        true
    }
}
