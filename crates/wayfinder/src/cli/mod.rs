//! Subcommand implementations.

pub mod config;
pub mod distance;
pub mod replay;

use anyhow::{Context, Result};
use std::path::Path;
use wayfinder_engine::EngineConfig;

/// Explicit `--config` must exist; the default location may be missing.
pub fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    match explicit {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let path = wayfinder::default_config_path();
            EngineConfig::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
    }
}
