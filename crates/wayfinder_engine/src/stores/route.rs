//! Route store: the last accepted routing result and the selected path.

use crate::actions::Action;
use crate::dispatcher::{DispatchContext, Listeners, Store};
use crate::model::{Path, RoutingResult};
use crate::navigation::{navigation_cue, CueSink};
use crate::stores::query::QueryStore;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wayfinder_ids::ListenerId;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RouteStoreState {
    pub routing_result: RoutingResult,
    /// Member of `routing_result.paths`, or the empty path when there are none.
    pub selected_path: Path,
}

impl RouteStoreState {
    pub fn has_route(&self) -> bool {
        !self.routing_result.paths.is_empty()
    }
}

pub struct RouteStore {
    state: RouteStoreState,
    /// Read during reduction to judge staleness; never written.
    query: Rc<RefCell<QueryStore>>,
    cues: Rc<dyn CueSink>,
    proximity_threshold_m: f64,
    listeners: Listeners<RouteStoreState>,
}

impl RouteStore {
    pub fn new(query: Rc<RefCell<QueryStore>>, cues: Rc<dyn CueSink>, proximity_threshold_m: f64) -> Self {
        Self {
            state: RouteStoreState::default(),
            query,
            cues,
            proximity_threshold_m,
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> &RouteStoreState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&RouteStoreState)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn reduce(&self, state: &RouteStoreState, action: &Action) -> RouteStoreState {
        match action {
            Action::RouteRequestSuccess { request, result } => {
                // The query store sees the success first and has already marked it.
                let stale = self
                    .query
                    .borrow()
                    .state()
                    .current_request
                    .is_stale(&request.token);
                if stale {
                    debug!(token = %request.token, "discarding stale route result");
                    return state.clone();
                }
                match result.paths.first() {
                    Some(first) => {
                        info!(
                            token = %request.token,
                            paths = result.paths.len(),
                            distance_m = first.distance,
                            "route result accepted"
                        );
                        RouteStoreState {
                            routing_result: result.clone(),
                            selected_path: first.clone(),
                        }
                    }
                    None => RouteStoreState::default(),
                }
            }
            Action::SetSelectedPath { path } => {
                if !state.routing_result.paths.contains(path) {
                    warn!("ignoring selection of a path outside the current result");
                    return state.clone();
                }
                RouteStoreState {
                    selected_path: path.clone(),
                    ..state.clone()
                }
            }
            Action::SetNavigationStart { coordinate } => {
                let cue = navigation_cue(&state.selected_path, *coordinate, self.proximity_threshold_m);
                self.cues.announce(&cue);
                state.clone()
            }
            action if action.invalidates_route() => RouteStoreState::default(),
            _ => state.clone(),
        }
    }
}

impl Store for RouteStore {
    fn name(&self) -> &'static str {
        "route"
    }

    fn receive(&mut self, action: &Action, _ctx: &mut DispatchContext) -> bool {
        let next = self.reduce(&self.state, action);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.listeners.notify(&self.state);
        true
    }
}
