//! Error types surfaced by the engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the dispatcher itself. Store reductions never fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("cannot dispatch {incoming} while {in_progress} is being dispatched")]
    Reentrant {
        in_progress: &'static str,
        incoming: &'static str,
    },
}

/// Policy refusals. The display text is shown to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoutingRefusal {
    #[error(
        "The request with the custom model feature is unfortunately not possible, as the request points are further than {}km apart.",
        .limit_m / 1000.0
    )]
    PointsTooFarApart { max_leg_m: f64, limit_m: f64 },
}

/// Failure reported by the routing backend gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayError {
    /// The backend answered but refused the request (e.g. points not found).
    #[error("routing backend rejected the request: {message}")]
    Rejected { message: String },

    /// The request never got a usable answer.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

/// Rejected `"<lat>,<lng>"` text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateParseError {
    #[error("expected '<lat>,<lng>', got '{input}'")]
    MissingSeparator { input: String },

    #[error("invalid latitude '{value}': {source}")]
    InvalidLatitude {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("invalid longitude '{value}': {source}")]
    InvalidLongitude {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("coordinate out of range: {lat},{lng}")]
    OutOfRange { lat: f64, lng: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
