//! Synchronous, single-threaded broadcast of actions to registered stores.
//!
//! An action is delivered to every store in registration order before
//! `dispatch` returns. Dispatching from inside a dispatch (a store listener, a
//! gateway answering synchronously) fails with [`DispatchError::Reentrant`].
//! Stores that need to produce an action of their own queue it on the
//! [`DispatchContext`]; it is dispatched as a separate turn once the current
//! one has been delivered everywhere.

use crate::actions::Action;
use crate::error::DispatchError;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, warn};
use wayfinder_ids::ListenerId;

/// A receiver of dispatched actions.
pub trait Store {
    fn name(&self) -> &'static str;

    /// Apply one action. Returns true when the store's state changed.
    fn receive(&mut self, action: &Action, ctx: &mut DispatchContext) -> bool;
}

pub type StoreHandle = Rc<RefCell<dyn Store>>;

/// Per-turn scratch space handed to each store.
#[derive(Debug, Default)]
pub struct DispatchContext {
    follow_ups: Vec<Action>,
}

impl DispatchContext {
    /// Queue an action to be dispatched after the current turn completes.
    pub fn emit(&mut self, action: Action) {
        self.follow_ups.push(action);
    }

    pub fn pending(&self) -> &[Action] {
        &self.follow_ups
    }
}

/// Summary of one `dispatch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Turns run, including follow-ups.
    pub turns: usize,
    /// Store state changes across all turns.
    pub changes: usize,
}

pub struct Dispatcher {
    stores: RefCell<Vec<StoreHandle>>,
    in_progress: Cell<Option<&'static str>>,
}

/// Clears the in-progress flag even if a store panics.
struct TurnGuard<'a> {
    flag: &'a Cell<Option<&'static str>>,
}

impl<'a> TurnGuard<'a> {
    fn enter(flag: &'a Cell<Option<&'static str>>, name: &'static str) -> Self {
        flag.set(Some(name));
        Self { flag }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(None);
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            stores: RefCell::new(Vec::new()),
            in_progress: Cell::new(None),
        }
    }

    /// Stores receive actions in the order they were registered.
    pub fn register(&self, store: StoreHandle) {
        debug!(store = store.borrow().name(), "registered store");
        self.stores.borrow_mut().push(store);
    }

    pub fn store_count(&self) -> usize {
        self.stores.borrow().len()
    }

    pub fn is_dispatching(&self) -> bool {
        self.in_progress.get().is_some()
    }

    pub fn dispatch(&self, action: Action) -> Result<DispatchReport, DispatchError> {
        if let Some(in_progress) = self.in_progress.get() {
            warn!(in_progress, incoming = action.name(), "rejected nested dispatch");
            return Err(DispatchError::Reentrant {
                in_progress,
                incoming: action.name(),
            });
        }

        let mut report = DispatchReport::default();
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let mut ctx = DispatchContext::default();
            report.changes += self.deliver(&action, &mut ctx);
            report.turns += 1;
            queue.extend(ctx.follow_ups);
        }
        Ok(report)
    }

    fn deliver(&self, action: &Action, ctx: &mut DispatchContext) -> usize {
        let _guard = TurnGuard::enter(&self.in_progress, action.name());
        // Snapshot so a store may be registered from a listener without a borrow conflict.
        let stores: Vec<StoreHandle> = self.stores.borrow().clone();
        let mut changes = 0;
        for store in &stores {
            let mut store = store.borrow_mut();
            if store.receive(action, ctx) {
                debug!(action = action.name(), store = store.name(), "state changed");
                changes += 1;
            }
        }
        changes
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Change listeners of one store.
pub struct Listeners<S> {
    next_id: ListenerId,
    entries: Vec<(ListenerId, Box<dyn Fn(&S)>)>,
}

impl<S> Listeners<S> {
    pub fn new() -> Self {
        Self {
            next_id: ListenerId::new(0),
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&S)>) -> ListenerId {
        let id = self.next_id;
        self.next_id = id.next();
        self.entries.push((id, listener));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn notify(&self, state: &S) {
        for (_, listener) in &self.entries {
            listener(state);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for Listeners<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the names of the actions it sees into a shared log.
    struct LoggingStore {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        emit_on_clear: bool,
    }

    impl Store for LoggingStore {
        fn name(&self) -> &'static str {
            self.label
        }

        fn receive(&mut self, action: &Action, ctx: &mut DispatchContext) -> bool {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.label, action.name()));
            if self.emit_on_clear && *action == Action::ClearRoute {
                ctx.emit(Action::ErrorAction {
                    message: "follow-up".to_string(),
                });
            }
            true
        }
    }

    fn logging_store(label: &'static str, log: &Rc<RefCell<Vec<String>>>, emit: bool) -> StoreHandle {
        Rc::new(RefCell::new(LoggingStore {
            label,
            log: log.clone(),
            emit_on_clear: emit,
        }))
    }

    /// Dispatches from inside its own reduction.
    struct Nested {
        dispatcher: Rc<Dispatcher>,
        result: Rc<RefCell<Option<Result<DispatchReport, DispatchError>>>>,
    }

    impl Store for Nested {
        fn name(&self) -> &'static str {
            "nested"
        }

        fn receive(&mut self, _action: &Action, _ctx: &mut DispatchContext) -> bool {
            *self.result.borrow_mut() = Some(self.dispatcher.dispatch(Action::DismissError));
            false
        }
    }

    #[test]
    fn test_delivers_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dispatcher = Dispatcher::new();
        dispatcher.register(logging_store("first", &log, false));
        dispatcher.register(logging_store("second", &log, false));

        let report = dispatcher.dispatch(Action::ClearPoints).unwrap();
        assert_eq!(report, DispatchReport { turns: 1, changes: 2 });
        assert_eq!(
            *log.borrow(),
            vec!["first:ClearPoints".to_string(), "second:ClearPoints".to_string()]
        );
        assert!(!dispatcher.is_dispatching());
    }

    #[test]
    fn test_follow_up_runs_after_full_delivery() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dispatcher = Dispatcher::new();
        dispatcher.register(logging_store("a", &log, true));
        dispatcher.register(logging_store("b", &log, false));

        let report = dispatcher.dispatch(Action::ClearRoute).unwrap();
        assert_eq!(report.turns, 2);
        assert_eq!(
            *log.borrow(),
            vec![
                "a:ClearRoute".to_string(),
                "b:ClearRoute".to_string(),
                "a:ErrorAction".to_string(),
                "b:ErrorAction".to_string(),
            ]
        );
    }

    #[test]
    fn test_nested_dispatch_rejected() {
        let dispatcher = Rc::new(Dispatcher::new());
        let result = Rc::new(RefCell::new(None));
        dispatcher.register(Rc::new(RefCell::new(Nested {
            dispatcher: dispatcher.clone(),
            result: result.clone(),
        })));

        dispatcher.dispatch(Action::ClearRoute).unwrap();
        assert_eq!(
            *result.borrow(),
            Some(Err(DispatchError::Reentrant {
                in_progress: "ClearRoute",
                incoming: "DismissError",
            }))
        );
        // Flag is cleared afterwards, a fresh dispatch works again.
        assert!(dispatcher.dispatch(Action::ClearPoints).is_ok());
    }

    #[test]
    fn test_listeners_subscribe_unsubscribe() {
        let seen = Rc::new(Cell::new(0));
        let mut listeners: Listeners<u32> = Listeners::new();
        let seen_clone = seen.clone();
        let id = listeners.subscribe(Box::new(move |v| seen_clone.set(seen_clone.get() + v)));
        listeners.notify(&5);
        assert_eq!(seen.get(), 5);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(&5);
        assert_eq!(seen.get(), 5);
        assert!(listeners.is_empty());
    }
}
