//! Great-circle geometry and a straight-line road router.
//!
//! The free functions are the planner's geometry engine: pure, and safe to
//! call from any thread. [`HaversineRouter`] stands in for a road network
//! when none is available (ignores roads, but always answers).

use crate::error::Result;
use crate::model::Coordinate;
use crate::polyline::RoutePolyline;
use crate::traits::{RoadRoute, RoadRouter};

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default spacing between generated polyline points.
const DEFAULT_STEP_KM: f64 = 1.0;

/// Great-circle distance between two points in kilometers.
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from `from` to `to`, in `[0, 360)`.
pub fn bearing_degrees(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Extra distance incurred by going `from -> via -> to` instead of `from -> to`.
pub fn detour_cost_km(from: Coordinate, via: Coordinate, to: Coordinate) -> f64 {
    let direct = distance_km(from, to);
    let through = distance_km(from, via) + distance_km(via, to);
    // Never negative in exact arithmetic; clamp away rounding noise.
    (through - direct).max(0.0)
}

/// Smallest angle between two bearings, in `[0, 180]`.
pub fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs().rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Point at `fraction` of the way along the great circle from `from` to `to`.
pub fn interpolate(from: Coordinate, to: Coordinate, fraction: f64) -> Coordinate {
    let delta = distance_km(from, to) / EARTH_RADIUS_KM;
    if delta < 1e-12 {
        return from;
    }

    let lat1 = from.lat.to_radians();
    let lng1 = from.lng.to_radians();
    let lat2 = to.lat.to_radians();
    let lng2 = to.lng.to_radians();

    let a = ((1.0 - fraction) * delta).sin() / delta.sin();
    let b = (fraction * delta).sin() / delta.sin();

    let x = a * lat1.cos() * lng1.cos() + b * lat2.cos() * lng2.cos();
    let y = a * lat1.cos() * lng1.sin() + b * lat2.cos() * lng2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    Coordinate::new(
        z.atan2((x * x + y * y).sqrt()).to_degrees(),
        y.atan2(x).to_degrees(),
    )
}

/// Straight-line road router.
///
/// Routes follow the great circle between consecutive points and are
/// sampled every `step_km`. Distances are scaled by `road_factor` to
/// approximate how much longer real roads are than the geodesic.
#[derive(Debug, Clone)]
pub struct HaversineRouter {
    pub step_km: f64,
    pub road_factor: f64,
}

impl Default for HaversineRouter {
    fn default() -> Self {
        Self {
            step_km: DEFAULT_STEP_KM,
            road_factor: 1.0,
        }
    }
}

impl HaversineRouter {
    /// Router sampling every `step_km` and stretching distances by `road_factor`.
    pub fn new(step_km: f64, road_factor: f64) -> Self {
        Self {
            step_km,
            road_factor,
        }
    }

    fn leg_points(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        let km = distance_km(from, to);
        let steps = if self.step_km > 0.0 {
            (km / self.step_km).ceil().max(1.0) as usize
        } else {
            1
        };

        // Endpoints are pushed as given so consecutive legs join exactly.
        let mut points = Vec::with_capacity(steps + 1);
        points.push(from);
        points.extend((1..steps).map(|i| interpolate(from, to, i as f64 / steps as f64)));
        points.push(to);
        points
    }

    fn route_through(&self, stops: &[Coordinate]) -> RoadRoute {
        let mut points: Vec<Coordinate> = Vec::new();
        let mut km = 0.0;

        for pair in stops.windows(2) {
            let leg = self.leg_points(pair[0], pair[1]);
            // Each leg starts where the previous one ended.
            let skip = usize::from(!points.is_empty());
            points.extend(leg.into_iter().skip(skip));
            km += distance_km(pair[0], pair[1]);
        }

        if points.is_empty() {
            points.extend(stops.first().copied());
        }

        RoadRoute {
            polyline: RoutePolyline::new(points),
            distance_km: km * self.road_factor,
        }
    }
}

impl RoadRouter for HaversineRouter {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<RoadRoute> {
        Ok(self.route_through(&[from, to]))
    }

    fn route_with_waypoints(
        &self,
        from: Coordinate,
        to: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<RoadRoute> {
        let mut stops = Vec::with_capacity(waypoints.len() + 2);
        stops.push(from);
        stops.extend_from_slice(waypoints);
        stops.push(to);
        Ok(self.route_through(&stops))
    }
}
