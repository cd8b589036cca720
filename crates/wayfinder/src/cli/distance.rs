//! `wayfinder distance`: great-circle distance between two coordinates.

use anyhow::Result;
use wayfinder_engine::{calc_dist, Coordinate};

pub fn run(from: Coordinate, to: Coordinate, json: bool) -> Result<()> {
    let meters = calc_dist(from, to);
    if json {
        let output = serde_json::json!({
            "from": from,
            "to": to,
            "meters": meters,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{:.1} m ({:.3} km)", meters, meters / 1000.0);
    }
    Ok(())
}
