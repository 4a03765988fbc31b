//! Real places along the Bengaluru - Chennai (NH 48) corridor.
//!
//! Coordinates are city centres / highway plazas from OpenStreetMap,
//! accurate to a few hundred meters.

use ev_trip_planner::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

pub const BENGALURU: Location = Location::new("Bengaluru", 12.9716, 77.5946);
pub const CHENNAI: Location = Location::new("Chennai", 13.0827, 80.2707);

/// Towns on the way, west to east.
pub const WAYPOINT_TOWNS: &[Location] = &[
    Location::new("Hosur", 12.7409, 77.8253),
    Location::new("Krishnagiri", 12.5186, 78.2137),
    Location::new("Ambur", 12.7916, 78.7166),
    Location::new("Vellore", 12.9165, 79.1325),
    Location::new("Kanchipuram", 12.8342, 79.7036),
];
