//! Wiring of the dispatcher and the stores.

use crate::actions::Action;
use crate::config::EngineConfig;
use crate::dispatcher::{DispatchReport, Dispatcher, StoreHandle};
use crate::error::DispatchError;
use crate::gateway::RouteGateway;
use crate::navigation::CueSink;
use crate::stores::{
    ErrorEntry, ErrorStore, PathDetailsState, PathDetailsStore, QueryStore, QueryStoreState,
    RouteStore, RouteStoreState,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Owned copy of every store's state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub query: QueryStoreState,
    pub route: RouteStoreState,
    pub path_details: PathDetailsState,
    pub error: Option<ErrorEntry>,
}

/// One independent engine instance. Stores receive in the order
/// query, route, path details, errors.
pub struct Engine {
    dispatcher: Dispatcher,
    query: Rc<RefCell<QueryStore>>,
    route: Rc<RefCell<RouteStore>>,
    path_details: Rc<RefCell<PathDetailsStore>>,
    errors: Rc<RefCell<ErrorStore>>,
}

impl Engine {
    pub fn new(config: &EngineConfig, gateway: Rc<dyn RouteGateway>, cues: Rc<dyn CueSink>) -> Self {
        let query = Rc::new(RefCell::new(QueryStore::new(config, gateway)));
        let route = Rc::new(RefCell::new(RouteStore::new(
            query.clone(),
            cues,
            config.navigation.proximity_threshold_m,
        )));
        let path_details = Rc::new(RefCell::new(PathDetailsStore::new(route.clone())));
        let errors = Rc::new(RefCell::new(ErrorStore::new()));

        let dispatcher = Dispatcher::new();
        dispatcher.register(query.clone() as StoreHandle);
        dispatcher.register(route.clone() as StoreHandle);
        dispatcher.register(path_details.clone() as StoreHandle);
        dispatcher.register(errors.clone() as StoreHandle);

        Self {
            dispatcher,
            query,
            route,
            path_details,
            errors,
        }
    }

    pub fn dispatch(&self, action: Action) -> Result<DispatchReport, DispatchError> {
        let name = action.name();
        let report = self.dispatcher.dispatch(action)?;
        debug!(action = name, turns = report.turns, changes = report.changes, "dispatched");
        Ok(report)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn query(&self) -> &Rc<RefCell<QueryStore>> {
        &self.query
    }

    pub fn route(&self) -> &Rc<RefCell<RouteStore>> {
        &self.route
    }

    pub fn path_details(&self) -> &Rc<RefCell<PathDetailsStore>> {
        &self.path_details
    }

    pub fn query_state(&self) -> QueryStoreState {
        self.query.borrow().state().clone()
    }

    pub fn route_state(&self) -> RouteStoreState {
        self.route.borrow().state().clone()
    }

    pub fn path_details_state(&self) -> PathDetailsState {
        self.path_details.borrow().state().clone()
    }

    pub fn current_error(&self) -> Option<ErrorEntry> {
        self.errors.borrow().current().cloned()
    }

    pub fn errors_raised(&self) -> usize {
        self.errors.borrow().raised()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            query: self.query_state(),
            route: self.route_state(),
            path_details: self.path_details_state(),
            error: self.current_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::navigation::RecordingCueSink;

    #[test]
    fn test_engine_registers_all_stores() {
        let engine = Engine::new(
            &EngineConfig::default(),
            Rc::new(RecordingGateway::new()),
            Rc::new(RecordingCueSink::new()),
        );
        assert_eq!(engine.dispatcher().store_count(), 4);
        assert!(!engine.route_state().has_route());
        assert!(engine.current_error().is_none());
    }

    #[test]
    fn test_engines_are_independent() {
        let a = Engine::new(
            &EngineConfig::default(),
            Rc::new(RecordingGateway::new()),
            Rc::new(RecordingCueSink::new()),
        );
        let b = Engine::new(
            &EngineConfig::default(),
            Rc::new(RecordingGateway::new()),
            Rc::new(RecordingCueSink::new()),
        );
        a.dispatch(Action::ErrorAction {
            message: "only a".to_string(),
        })
        .unwrap();
        assert!(a.current_error().is_some());
        assert!(b.current_error().is_none());
    }
}
