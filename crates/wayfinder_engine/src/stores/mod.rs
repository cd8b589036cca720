//! The stores reacting to dispatched actions.

pub mod errors;
pub mod path_details;
pub mod query;
pub mod route;

pub use errors::{ErrorEntry, ErrorStore};
pub use path_details::{PathDetailsState, PathDetailsStore};
pub use query::{QueryStore, QueryStoreState};
pub use route::{RouteStore, RouteStoreState};
