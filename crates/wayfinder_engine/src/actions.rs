//! Intents delivered through the dispatcher.

use crate::error::GatewayError;
use crate::geo::{BBox, Coordinate};
use crate::model::{ApiInfo, CustomModel, Path, QueryPoint, RoutingArgs, RoutingProfile, RoutingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wayfinder_ids::PointId;

/// Point hovered on the elevation / detail graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDetailsPoint {
    pub point: Coordinate,
    pub elevation: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    // Waypoints
    InvalidatePoint {
        id: PointId,
    },
    ClearPoints,
    SetPoint {
        point: QueryPoint,
        #[serde(default = "default_true")]
        zoom: bool,
    },
    AddPoint {
        at_index: usize,
        coordinate: Coordinate,
        is_initialized: bool,
    },
    RemovePoint {
        id: PointId,
    },
    SetRoutingParametersAtOnce {
        points: Vec<QueryPoint>,
        profile: RoutingProfile,
    },

    // Profiles and custom models
    InfoReceived {
        info: ApiInfo,
    },
    SetVehicleProfile {
        profile: RoutingProfile,
    },
    SetCustomModel {
        model: Option<CustomModel>,
        valid: bool,
        issue_request: bool,
    },
    SetCustomModelBoxEnabled {
        enabled: bool,
    },

    // Backend feedback
    RouteRequestSuccess {
        request: RoutingArgs,
        result: RoutingResult,
    },
    RouteRequestFailed {
        request: RoutingArgs,
        error: GatewayError,
    },

    // Route view
    SetSelectedPath {
        path: Path,
    },
    SetNavigationStart {
        coordinate: Coordinate,
    },
    ClearRoute,

    // Errors
    ErrorAction {
        message: String,
    },
    DismissError,

    // Path details
    PathDetailsHover {
        point: Option<PathDetailsPoint>,
    },
    PathDetailsRangeSelected {
        bbox: Option<BBox>,
    },
    PathDetailsValueSelected {
        channel: String,
        value: Value,
    },
}

fn default_true() -> bool {
    true
}

impl Action {
    /// Stable name used in logs and dispatch errors.
    pub fn name(&self) -> &'static str {
        match self {
            Action::InvalidatePoint { .. } => "InvalidatePoint",
            Action::ClearPoints => "ClearPoints",
            Action::SetPoint { .. } => "SetPoint",
            Action::AddPoint { .. } => "AddPoint",
            Action::RemovePoint { .. } => "RemovePoint",
            Action::SetRoutingParametersAtOnce { .. } => "SetRoutingParametersAtOnce",
            Action::InfoReceived { .. } => "InfoReceived",
            Action::SetVehicleProfile { .. } => "SetVehicleProfile",
            Action::SetCustomModel { .. } => "SetCustomModel",
            Action::SetCustomModelBoxEnabled { .. } => "SetCustomModelBoxEnabled",
            Action::RouteRequestSuccess { .. } => "RouteRequestSuccess",
            Action::RouteRequestFailed { .. } => "RouteRequestFailed",
            Action::SetSelectedPath { .. } => "SetSelectedPath",
            Action::SetNavigationStart { .. } => "SetNavigationStart",
            Action::ClearRoute => "ClearRoute",
            Action::ErrorAction { .. } => "ErrorAction",
            Action::DismissError => "DismissError",
            Action::PathDetailsHover { .. } => "PathDetailsHover",
            Action::PathDetailsRangeSelected { .. } => "PathDetailsRangeSelected",
            Action::PathDetailsValueSelected { .. } => "PathDetailsValueSelected",
        }
    }

    /// Whether the displayed route no longer matches the input after this action.
    pub fn invalidates_route(&self) -> bool {
        matches!(
            self,
            Action::InvalidatePoint { .. }
                | Action::ClearPoints
                | Action::SetPoint { .. }
                | Action::AddPoint { .. }
                | Action::RemovePoint { .. }
                | Action::SetRoutingParametersAtOnce { .. }
                | Action::ClearRoute
        )
    }
}
