//! Wayfinder engine.
//!
//! Turns waypoints and routing preferences into route requests, tracks the
//! in-flight batch and reconciles out-of-order results against the latest
//! input. Everything runs on one thread: actions go through the
//! [`Dispatcher`], the stores reduce them in registration order, and the
//! routing backend answers later through new actions.

pub mod actions;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod model;
pub mod navigation;
pub mod path_details;
pub mod stores;

pub use actions::{Action, PathDetailsPoint};
pub use config::EngineConfig;
pub use dispatcher::{DispatchContext, DispatchReport, Dispatcher, Store, StoreHandle};
pub use engine::{Engine, EngineSnapshot};
pub use error::{ConfigError, CoordinateParseError, DispatchError, GatewayError, RoutingRefusal};
pub use gateway::{RecordingGateway, RouteGateway};
pub use geo::{calc_dist, BBox, Coordinate};
pub use model::{
    CustomModel, Path, QueryPoint, QueryPointType, RequestState, RequestToken, RoutingArgs,
    RoutingProfile, RoutingResult,
};
pub use navigation::{CueSink, LogCueSink, NavigationCue, RecordingCueSink};
pub use stores::{PathDetailsState, QueryStoreState, RouteStoreState};

pub use wayfinder_ids::{BatchSeq, ListenerId, PointId};
