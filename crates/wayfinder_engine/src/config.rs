//! Engine configuration, loaded from TOML.
//!
//! Every field has a default so an empty or missing file is valid.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_ALTERNATIVE_ROUTES: u32 = 3;
pub const DEFAULT_SINGLE_REQUEST_MAX_LEG_M: f64 = 200_000.0;
pub const DEFAULT_CUSTOM_MODEL_MAX_LEG_M: f64 = 500_000.0;
pub const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 500.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Alternatives requested when a route has no via points.
    pub max_alternative_routes: u32,
    /// Whether the map re-frames on the first result.
    pub initial_zoom: bool,
    pub custom_model: CustomModelPolicy,
    pub navigation: NavigationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_alternative_routes: DEFAULT_MAX_ALTERNATIVE_ROUTES,
            initial_zoom: true,
            custom_model: CustomModelPolicy::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

/// Distance bands applied while a custom model is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomModelPolicy {
    /// Below this leg length alternatives are folded into one request.
    pub single_request_max_leg_m: f64,
    /// Above this leg length routing is refused.
    pub max_leg_m: f64,
}

impl Default for CustomModelPolicy {
    fn default() -> Self {
        Self {
            single_request_max_leg_m: DEFAULT_SINGLE_REQUEST_MAX_LEG_M,
            max_leg_m: DEFAULT_CUSTOM_MODEL_MAX_LEG_M,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// A fix further than this from every instruction start is off route.
    pub proximity_threshold_m: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_m: DEFAULT_PROXIMITY_THRESHOLD_M,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Like [`EngineConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_alternative_routes == 0 {
            return Err(ConfigError::Invalid(
                "max_alternative_routes must be at least 1".to_string(),
            ));
        }
        let policy = &self.custom_model;
        if policy.single_request_max_leg_m < 0.0 || policy.max_leg_m < 0.0 {
            return Err(ConfigError::Invalid(
                "custom_model distances must not be negative".to_string(),
            ));
        }
        if policy.single_request_max_leg_m > policy.max_leg_m {
            return Err(ConfigError::Invalid(format!(
                "custom_model.single_request_max_leg_m ({}) exceeds custom_model.max_leg_m ({})",
                policy.single_request_max_leg_m, policy.max_leg_m
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("", &PathBuf::from("inline")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
max_alternative_routes = 2

[custom_model]
max_leg_m = 300000.0
"#;
        let config = EngineConfig::from_toml_str(text, &PathBuf::from("inline")).unwrap();
        assert_eq!(config.max_alternative_routes, 2);
        assert_eq!(config.custom_model.max_leg_m, 300_000.0);
        assert_eq!(
            config.custom_model.single_request_max_leg_m,
            DEFAULT_SINGLE_REQUEST_MAX_LEG_M
        );
        assert_eq!(config.navigation.proximity_threshold_m, 500.0);
    }

    #[test]
    fn test_inverted_bands_rejected() {
        let text = r#"
[custom_model]
single_request_max_leg_m = 600000.0
max_leg_m = 500000.0
"#;
        let result = EngineConfig::from_toml_str(text, &PathBuf::from("inline"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let result = EngineConfig::from_toml_str("max_alternative_routes = \"x\"", &PathBuf::from("cfg.toml"));
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, PathBuf::from("cfg.toml")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "initial_zoom = false\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert!(!config.initial_zoom);
    }
}
