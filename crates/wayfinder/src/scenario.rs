//! Scenario files: an ordered list of actions with optional delays.
//!
//! JSON or TOML, chosen by file extension:
//!
//! ```toml
//! [[steps]]
//! wait_ms = 0
//! [steps.action]
//! type = "set_vehicle_profile"
//! profile = { name = "car" }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wayfinder_engine::{Action, EngineConfig};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON scenario {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML scenario {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported scenario format '{extension}' (expected .json or .toml)")]
    UnsupportedFormat { extension: String },

    #[error("scenario has no steps")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Overrides the engine config for this run.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Delay before this step, measured from the previous one.
    #[serde(default)]
    pub wait_ms: u64,
    pub action: Action,
}

impl Scenario {
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text).map_err(|source| ScenarioError::Json {
            path: origin.to_path_buf(),
            source,
        })?;
        scenario.validated()
    }

    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(text).map_err(|source| ScenarioError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        scenario.validated()
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if extension != "json" && extension != "toml" {
            return Err(ScenarioError::UnsupportedFormat { extension });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if extension == "json" {
            Self::from_json_str(&text, path)
        } else {
            Self::from_toml_str(&text, path)
        }
    }

    fn validated(self) -> Result<Self, ScenarioError> {
        if self.steps.is_empty() {
            return Err(ScenarioError::Empty);
        }
        Ok(self)
    }
}
