//! Test fixtures for ev-trip-planner.
//!
//! Provides:
//! - Real Bengaluru - Chennai corridor locations
//! - Station and verified-entry builders
//! - Fake collaborators (geocoder, recording station directory)
//! - A synthetic due-east route along the equator, where 1 km of route is
//!   easy to turn into a coordinate

#![allow(dead_code)]

pub mod corridor;

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use ev_trip_planner::haversine::{EARTH_RADIUS_KM, HaversineRouter};
use ev_trip_planner::model::{Connector, VerifiedRouteEntry};
use ev_trip_planner::traits::{Geocoder, RoadRoute, RoadRouter, StationDirectory};
use ev_trip_planner::{Coordinate, PlannerError, Result, Station};

pub use corridor::*;

// ============================================================================
// Equator route
// ============================================================================

pub fn km_per_degree() -> f64 {
    EARTH_RADIUS_KM * std::f64::consts::PI / 180.0
}

/// Point `km` east of (0, 0), optionally `offset_km` north of the equator.
pub fn equator_point(km: f64, offset_km: f64) -> Coordinate {
    Coordinate::new(offset_km / km_per_degree(), km / km_per_degree())
}

/// Due-east road route of `total_km`, one point per km.
pub fn equator_route(total_km: f64) -> RoadRoute {
    HaversineRouter::default()
        .route(equator_point(0.0, 0.0), equator_point(total_km, 0.0))
        .expect("straight-line routing never fails")
}

// ============================================================================
// Builders
// ============================================================================

/// Builder for test stations with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestStation {
    station: Station,
}

impl TestStation {
    pub fn new(id: &str, location: Coordinate) -> Self {
        Self {
            station: Station {
                id: id.to_string(),
                location,
                name: id.to_string(),
                address: format!("{} highway plaza", id),
                provider: "Test Power".to_string(),
                connectors: Vec::new(),
                amenities: BTreeSet::new(),
                access_policy: "24/7".to_string(),
                verified: true,
                data_provider: "test".to_string(),
            },
        }
    }

    /// Station `km` along the equator route, `offset_km` north of it.
    pub fn on_equator(id: &str, km: f64, offset_km: f64) -> Self {
        Self::new(id, equator_point(km, offset_km))
    }

    pub fn connector(mut self, power_kw: f64) -> Self {
        self.station.connectors.push(Connector {
            kind: "CCS2".to_string(),
            power_kw,
            count: 1,
            status: Some("Operational".to_string()),
        });
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.station.name.clear();
        self
    }

    pub fn build(self) -> Station {
        self.station
    }
}

pub fn verified_entry(station: Station, distance_from_start_km: f64) -> VerifiedRouteEntry {
    VerifiedRouteEntry {
        station,
        distance_from_start_km,
        is_required: false,
        recommended_charge_time_min: None,
    }
}

// ============================================================================
// Fake collaborators
// ============================================================================

/// Station directory over a fixed list that records every query.
pub struct RecordingDirectory {
    name: &'static str,
    stations: Vec<Station>,
    queries: Mutex<Vec<(Coordinate, f64)>>,
}

impl RecordingDirectory {
    pub fn new(name: &'static str, stations: Vec<Station>) -> Self {
        Self {
            name,
            stations,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty(name: &'static str) -> Self {
        Self::new(name, Vec::new())
    }

    /// Radii of all queries so far, in order.
    pub fn radii(&self) -> Vec<f64> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, radius)| *radius)
            .collect()
    }
}

impl StationDirectory for RecordingDirectory {
    fn nearby(&self, point: Coordinate, radius_km: f64) -> Result<Vec<Station>> {
        self.queries.lock().unwrap().push((point, radius_km));
        Ok(self
            .stations
            .iter()
            .filter(|station| {
                ev_trip_planner::haversine::distance_km(point, station.location) <= radius_km
            })
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Directory whose backend is down.
pub struct FailingDirectory;

impl StationDirectory for FailingDirectory {
    fn nearby(&self, _point: Coordinate, _radius_km: f64) -> Result<Vec<Station>> {
        Err(PlannerError::MalformedResponse {
            provider: "station-api".to_string(),
            message: "connection reset".to_string(),
        })
    }
}

/// Geocoder over a fixed name table.
pub struct FixedGeocoder {
    places: HashMap<String, Coordinate>,
}

impl FixedGeocoder {
    pub fn new(places: &[(&str, Coordinate)]) -> Self {
        Self {
            places: places
                .iter()
                .map(|(name, coords)| (name.to_lowercase(), *coords))
                .collect(),
        }
    }

    pub fn corridor() -> Self {
        let mut places = vec![(BENGALURU.name, BENGALURU.coords()), (CHENNAI.name, CHENNAI.coords())];
        places.extend(WAYPOINT_TOWNS.iter().map(|town| (town.name, town.coords())));
        Self::new(&places)
    }
}

impl Geocoder for FixedGeocoder {
    fn geocode(&self, place: &str) -> Result<Coordinate> {
        self.places
            .get(&place.to_lowercase())
            .copied()
            .ok_or_else(|| PlannerError::NotFound {
                place: place.to_string(),
            })
    }
}
