//! Highlighted segments of the selected path.
//!
//! Every segment is a contiguous slice of the path geometry.

use crate::geo::{BBox, Coordinate};
use crate::model::Path;
use serde_json::Value;

/// Maximal runs of consecutive path coordinates inside `bbox`. Runs of a
/// single coordinate cannot be drawn as a line and are dropped.
pub fn segments_in_bbox(path: &Path, bbox: &BBox) -> Vec<Vec<Coordinate>> {
    let mut segments = Vec::new();
    let mut run: Vec<Coordinate> = Vec::new();
    for coordinate in &path.points.coordinates {
        if bbox.contains(*coordinate) {
            run.push(*coordinate);
        } else {
            flush(&mut run, &mut segments);
        }
    }
    flush(&mut run, &mut segments);
    segments
}

fn flush(run: &mut Vec<Coordinate>, segments: &mut Vec<Vec<Coordinate>>) {
    if run.len() >= 2 {
        segments.push(std::mem::take(run));
    } else {
        run.clear();
    }
}

/// Geometry of every interval of `channel` whose value equals `value`.
/// Intervals reaching past the geometry are clipped; empty ones are skipped.
pub fn segments_for_detail(path: &Path, channel: &str, value: &Value) -> Vec<Vec<Coordinate>> {
    let coordinates = &path.points.coordinates;
    let Some(intervals) = path.details.get(channel) else {
        return Vec::new();
    };
    intervals
        .iter()
        .filter(|interval| interval.value == *value)
        .filter_map(|interval| {
            if interval.from > interval.to || interval.from >= coordinates.len() {
                return None;
            }
            let to = interval.to.min(coordinates.len() - 1);
            Some(coordinates[interval.from..=to].to_vec())
        })
        .collect()
}
