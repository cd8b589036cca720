//! Turn-by-turn entry: match a location fix to the nearest instruction.
//!
//! This is a nearest-neighbour search over instruction start points, not a
//! map matcher.

use crate::geo::{calc_dist, Coordinate};
use crate::model::{Instruction, Path};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

/// Instruction closest to a fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstructionMatch {
    pub index: usize,
    /// Fix to the instruction's first geometry point.
    pub distance_to_start_m: f64,
    /// Fix to the instruction's last geometry point ("distance to next maneuver").
    pub distance_to_end_m: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum NavigationCue {
    Maneuver { distance_m: u64, text: String },
    OffRoute,
}

impl fmt::Display for NavigationCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationCue::Maneuver { distance_m, text } => {
                write!(f, "In {} meters {}", distance_m, text)
            }
            NavigationCue::OffRoute => f.write_str("Off route."),
        }
    }
}

/// Linear scan; ties keep the first instruction. Instructions without geometry are skipped.
pub fn nearest_instruction(instructions: &[Instruction], fix: Coordinate) -> Option<InstructionMatch> {
    let mut best: Option<InstructionMatch> = None;
    for (index, instruction) in instructions.iter().enumerate() {
        let (Some(first), Some(last)) = (instruction.points.first(), instruction.points.last()) else {
            continue;
        };
        let distance_to_start_m = calc_dist(fix, *first);
        if best.map_or(true, |b| distance_to_start_m < b.distance_to_start_m) {
            best = Some(InstructionMatch {
                index,
                distance_to_start_m,
                distance_to_end_m: calc_dist(fix, *last),
            });
        }
    }
    best
}

pub fn navigation_cue(path: &Path, fix: Coordinate, proximity_threshold_m: f64) -> NavigationCue {
    match nearest_instruction(&path.instructions, fix) {
        Some(found) if found.distance_to_start_m < proximity_threshold_m => NavigationCue::Maneuver {
            distance_m: found.distance_to_end_m.round() as u64,
            text: path.instructions[found.index].text.clone(),
        },
        _ => NavigationCue::OffRoute,
    }
}

/// Where cues go. Audio and on-screen presentation live outside the engine.
pub trait CueSink {
    fn announce(&self, cue: &NavigationCue);
}

/// Writes cues to the log.
#[derive(Debug, Default)]
pub struct LogCueSink;

impl CueSink for LogCueSink {
    fn announce(&self, cue: &NavigationCue) {
        tracing::info!(%cue, "navigation cue");
    }
}

#[derive(Debug, Default)]
pub struct RecordingCueSink {
    cues: RefCell<Vec<NavigationCue>>,
}

impl RecordingCueSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<NavigationCue> {
        self.cues.borrow().clone()
    }
}

impl CueSink for RecordingCueSink {
    fn announce(&self, cue: &NavigationCue) {
        self.cues.borrow_mut().push(cue.clone());
    }
}
