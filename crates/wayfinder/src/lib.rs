//! Wayfinder command line support: scenario files, the simulated routing
//! backend and the replay event loop.

pub mod backend;
pub mod runtime;
pub mod scenario;

pub use backend::SimulatedBackend;
pub use runtime::{replay, ChannelGateway, ReplayError, ReplayOptions, ReplayOutcome, ReplayStats};
pub use scenario::{Scenario, ScenarioError, ScenarioStep};

use std::path::PathBuf;

/// Default config location: ~/.wayfinder/config.toml
pub fn default_config_path() -> PathBuf {
    wayfinder_logging::wayfinder_home().join("config.toml")
}
