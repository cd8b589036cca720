//! Hover point and highlighted segments for the path detail graph.

use crate::actions::{Action, PathDetailsPoint};
use crate::dispatcher::{DispatchContext, Listeners, Store};
use crate::geo::Coordinate;
use crate::model::Path;
use crate::path_details::{segments_for_detail, segments_in_bbox};
use crate::stores::route::RouteStore;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wayfinder_ids::ListenerId;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PathDetailsState {
    pub point: Option<PathDetailsPoint>,
    pub highlighted_segments: Vec<Vec<Coordinate>>,
}

pub struct PathDetailsStore {
    state: PathDetailsState,
    /// Must be registered before this store so the selected path is current.
    route: Rc<RefCell<RouteStore>>,
    /// Selected path the current highlights were computed against.
    shown_path: Path,
    listeners: Listeners<PathDetailsState>,
}

impl PathDetailsStore {
    pub fn new(route: Rc<RefCell<RouteStore>>) -> Self {
        Self {
            state: PathDetailsState::default(),
            route,
            shown_path: Path::default(),
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> &PathDetailsState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&PathDetailsState)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn reduce(&self, state: &PathDetailsState, action: &Action) -> PathDetailsState {
        match action {
            Action::PathDetailsHover { point } => PathDetailsState {
                point: point.clone(),
                ..state.clone()
            },
            Action::PathDetailsRangeSelected { bbox } => {
                let highlighted_segments = match bbox {
                    Some(bbox) => segments_in_bbox(&self.route.borrow().state().selected_path, bbox),
                    None => Vec::new(),
                };
                PathDetailsState {
                    highlighted_segments,
                    ..state.clone()
                }
            }
            Action::PathDetailsValueSelected { channel, value } => PathDetailsState {
                highlighted_segments: segments_for_detail(
                    &self.route.borrow().state().selected_path,
                    channel,
                    value,
                ),
                ..state.clone()
            },
            Action::RouteRequestSuccess { .. } | Action::SetSelectedPath { .. } => {
                // A stale result or a rejected selection leaves the route untouched.
                if self.route.borrow().state().selected_path == self.shown_path {
                    state.clone()
                } else {
                    PathDetailsState::default()
                }
            }
            action if action.invalidates_route() => PathDetailsState::default(),
            _ => state.clone(),
        }
    }
}

impl Store for PathDetailsStore {
    fn name(&self) -> &'static str {
        "path_details"
    }

    fn receive(&mut self, action: &Action, _ctx: &mut DispatchContext) -> bool {
        let next = self.reduce(&self.state, action);
        if matches!(
            action,
            Action::RouteRequestSuccess { .. } | Action::SetSelectedPath { .. }
        ) || action.invalidates_route()
        {
            let route = self.route.borrow();
            let selected = &route.state().selected_path;
            if *selected != self.shown_path {
                self.shown_path = selected.clone();
            }
        }
        if next == self.state {
            return false;
        }
        self.state = next;
        self.listeners.notify(&self.state);
        true
    }
}
