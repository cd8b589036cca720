//! Coordinates and the great-circle distance the request policy is based on.

use crate::error::CoordinateParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean earth radius in meters (WGS84).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from the backend's `[lng, lat]` ordering.
    pub const fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    pub const fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&coordinate_to_text(*self))
    }
}

impl std::str::FromStr for Coordinate {
    type Err = CoordinateParseError;

    /// Parses `"<lat>,<lng>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::MissingSeparator {
                input: s.to_string(),
            })?;
        let (lat, lng) = (lat.trim(), lng.trim());
        let lat: f64 = lat
            .parse()
            .map_err(|source| CoordinateParseError::InvalidLatitude {
                value: lat.to_string(),
                source,
            })?;
        let lng: f64 = lng
            .parse()
            .map_err(|source| CoordinateParseError::InvalidLongitude {
                value: lng.to_string(),
                source,
            })?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateParseError::OutOfRange { lat, lng });
        }
        Ok(Self::new(lat, lng))
    }
}

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BBox {
    pub const fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Inclusive on all edges.
    pub fn contains(&self, c: Coordinate) -> bool {
        c.lng >= self.min_lng && c.lng <= self.max_lng && c.lat >= self.min_lat && c.lat <= self.max_lat
    }
}

/// Great-circle (haversine) distance in meters.
pub fn calc_dist(a: Coordinate, b: Coordinate) -> f64 {
    let sin_dlat = ((b.lat - a.lat).to_radians() / 2.0).sin();
    let sin_dlng = ((b.lng - a.lng).to_radians() / 2.0).sin();
    let normed = sin_dlat * sin_dlat
        + sin_dlng * sin_dlng * a.lat.to_radians().cos() * b.lat.to_radians().cos();
    EARTH_RADIUS_M * 2.0 * normed.sqrt().atan2((1.0 - normed).sqrt())
}

/// Longest distance between consecutive coordinates, 0 for fewer than two.
pub fn max_leg_distance(coordinates: &[Coordinate]) -> f64 {
    coordinates
        .windows(2)
        .map(|leg| calc_dist(leg[0], leg[1]))
        .fold(0.0, f64::max)
}

/// Text shown for a point that was placed by coordinate: `"<lat>,<lng>"`, 6 decimals max.
pub fn coordinate_to_text(c: Coordinate) -> String {
    format!("{},{}", round6(c.lat), round6(c.lng))
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_dist_zero() {
        let p = Coordinate::new(52.5, 13.4);
        assert_eq!(calc_dist(p, p), 0.0);
    }

    #[test]
    fn test_calc_dist_one_degree_latitude() {
        let d = calc_dist(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_calc_dist_berlin_munich() {
        let berlin = Coordinate::new(52.52, 13.405);
        let munich = Coordinate::new(48.137, 11.575);
        let d = calc_dist(berlin, munich);
        assert!(d > 500_000.0 && d < 510_000.0, "got {}", d);
    }

    #[test]
    fn test_max_leg_distance() {
        let coords = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 1.5),
        ];
        let max = max_leg_distance(&coords);
        assert!((max - calc_dist(coords[0], coords[1])).abs() < 1e-6);
        assert_eq!(max_leg_distance(&coords[..1]), 0.0);
    }

    #[test]
    fn test_coordinate_to_text_rounds() {
        assert_eq!(
            coordinate_to_text(Coordinate::new(52.123456789, 13.0)),
            "52.123457,13"
        );
    }

    #[test]
    fn test_coordinate_parse() {
        let c: Coordinate = "52.5, 13.4".parse().unwrap();
        assert_eq!(c, Coordinate::new(52.5, 13.4));
        assert_eq!(
            "91,0".parse::<Coordinate>(),
            Err(CoordinateParseError::OutOfRange { lat: 91.0, lng: 0.0 })
        );
        assert_eq!(
            "52.5".parse::<Coordinate>(),
            Err(CoordinateParseError::MissingSeparator {
                input: "52.5".to_string()
            })
        );
    }

    #[test]
    fn test_coordinate_parse_names_bad_axis() {
        let err = "52.5, east".parse::<Coordinate>().unwrap_err();
        assert!(
            matches!(&err, CoordinateParseError::InvalidLongitude { value, .. } if value == "east"),
            "{:?}",
            err
        );
        assert_eq!(err.to_string(), "invalid longitude 'east': invalid float literal");

        let err = "north,13".parse::<Coordinate>().unwrap_err();
        assert!(matches!(err, CoordinateParseError::InvalidLatitude { .. }));
    }

    #[test]
    fn test_bbox_contains_edges() {
        let bbox = BBox::new(10.0, 50.0, 11.0, 51.0);
        assert!(bbox.contains(Coordinate::new(50.0, 10.0)));
        assert!(bbox.contains(Coordinate::new(50.5, 10.5)));
        assert!(!bbox.contains(Coordinate::new(51.5, 10.5)));
    }

    #[test]
    fn test_lng_lat_ordering() {
        let c = Coordinate::from_lng_lat([13.4, 52.5]);
        assert_eq!(c.lat, 52.5);
        assert_eq!(c.to_lng_lat(), [13.4, 52.5]);
    }
}
