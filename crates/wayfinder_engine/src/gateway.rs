//! Seam to the routing backend.
//!
//! The query store hands every sub-request to a [`RouteGateway`] during its
//! reduction. The gateway must not answer synchronously: the outcome comes back
//! later as `RouteRequestSuccess` / `RouteRequestFailed` dispatched on its own
//! turn, carrying the same `RoutingArgs`.

use crate::model::RoutingArgs;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

pub trait RouteGateway {
    /// Fire-and-forget. Implementations queue the request and return.
    fn issue_route(&self, args: &RoutingArgs);
}

impl<G: RouteGateway + ?Sized> RouteGateway for Rc<G> {
    fn issue_route(&self, args: &RoutingArgs) {
        (**self).issue_route(args)
    }
}

/// Forwards requests over a std channel to whatever drives the backend.
impl RouteGateway for mpsc::Sender<RoutingArgs> {
    fn issue_route(&self, args: &RoutingArgs) {
        if self.send(args.clone()).is_err() {
            tracing::warn!(token = %args.token, "route gateway receiver dropped, request lost");
        }
    }
}

/// Keeps every issued request for later inspection.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    issued: RefCell<Vec<RoutingArgs>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> Vec<RoutingArgs> {
        self.issued.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.issued.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.borrow().is_empty()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<RoutingArgs> {
        std::mem::take(&mut *self.issued.borrow_mut())
    }
}

impl RouteGateway for RecordingGateway {
    fn issue_route(&self, args: &RoutingArgs) {
        self.issued.borrow_mut().push(args.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RequestToken;
    use wayfinder_ids::BatchSeq;

    fn args(slot: u32) -> RoutingArgs {
        RoutingArgs {
            token: RequestToken {
                batch: BatchSeq::new(0),
                slot,
            },
            points: vec![[13.4, 52.5], [13.5, 52.6]],
            profile: "car".to_string(),
            max_alternative_routes: 1,
            custom_model: None,
            zoom: true,
        }
    }

    #[test]
    fn test_recording_gateway_take() {
        let gateway = RecordingGateway::new();
        gateway.issue_route(&args(0));
        gateway.issue_route(&args(1));
        assert_eq!(gateway.len(), 2);
        let taken = gateway.take();
        assert_eq!(taken[1].token.slot, 1);
        assert!(gateway.is_empty());
    }

    #[test]
    fn test_rc_gateway_shares_recording() {
        let gateway = Rc::new(RecordingGateway::new());
        let shared: Rc<dyn RouteGateway> = gateway.clone();
        shared.issue_route(&args(0));
        assert_eq!(gateway.len(), 1);
    }

    #[test]
    fn test_channel_gateway_forwards() {
        let (tx, rx) = mpsc::channel();
        tx.issue_route(&args(3));
        assert_eq!(rx.recv().unwrap().token.slot, 3);
    }
}
