//! Route geometries as decoded coordinate sequences.
//!
//! Wire formats (GeoJSON from OSRM, etc.) are decoded by the adapters; the
//! planner only ever sees [`RoutePolyline`].

use serde::{Deserialize, Serialize};

use crate::haversine::{bearing_degrees, distance_km};
use crate::model::Coordinate;

/// Windows shorter than this cannot give a meaningful bearing.
const MIN_DIRECTION_SPAN_KM: f64 = 1.0;

/// A route geometry, ordered from trip start to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePolyline {
    points: Vec<Coordinate>,
}

/// Where the route is heading around a given point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalDirection {
    pub target: Coordinate,
    pub prev: Coordinate,
    pub next: Coordinate,
    /// Bearing from `prev` to `next`; `None` when the route is too short to have one.
    pub bearing: Option<f64>,
}

impl RoutePolyline {
    /// Creates a polyline from decoded points, start first.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns the points as a slice.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns its points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the polyline has no points at all.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of great-circle distances between consecutive points.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| distance_km(pair[0], pair[1]))
            .sum()
    }

    fn points_per_km(&self, total_km: f64) -> f64 {
        if total_km > 0.0 && total_km.is_finite() {
            self.points.len() as f64 / total_km
        } else {
            0.0
        }
    }

    /// Index of the point `distance_km` into a route of `total_km`.
    ///
    /// Points are assumed evenly spread over the route; the result is
    /// clamped to the polyline bounds.
    pub fn index_at_distance(&self, distance_km: f64, total_km: f64) -> usize {
        let last = self.points.len().saturating_sub(1);
        if total_km <= 0.0 || !total_km.is_finite() {
            return last;
        }
        let raw = (distance_km * self.points_per_km(total_km)).floor();
        if raw.is_nan() || raw <= 0.0 {
            0
        } else {
            (raw as usize).min(last)
        }
    }

    /// Target point at `target_km` plus the points `window_km` before and after it.
    ///
    /// If the window collapses (very short or sparse routes) it widens to the
    /// whole polyline; if even that has no length, `bearing` is `None`.
    pub fn local_direction(
        &self,
        target_km: f64,
        total_km: f64,
        window_km: f64,
    ) -> Option<LocalDirection> {
        let last = self.points.len().checked_sub(1)?;
        let target_idx = self.index_at_distance(target_km, total_km);
        let offset = (window_km * self.points_per_km(total_km)).floor().max(0.0) as usize;

        let prev_idx = target_idx.saturating_sub(offset);
        let next_idx = target_idx.saturating_add(offset).min(last);

        let mut prev = self.points[prev_idx];
        let mut next = self.points[next_idx];
        if distance_km(prev, next) < MIN_DIRECTION_SPAN_KM {
            prev = self.points[0];
            next = self.points[last];
        }

        let bearing = (distance_km(prev, next) >= MIN_DIRECTION_SPAN_KM)
            .then(|| bearing_degrees(prev, next));

        Some(LocalDirection {
            target: self.points[target_idx],
            prev,
            next,
            bearing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Due-east line along the equator, one point per ~1.11 km.
    fn equator_line(points: usize) -> RoutePolyline {
        RoutePolyline::new(
            (0..points)
                .map(|i| Coordinate::new(0.0, i as f64 * 0.01))
                .collect(),
        )
    }

    #[test]
    fn test_new_and_points() {
        let points = vec![Coordinate::new(38.5, -120.2), Coordinate::new(40.7, -120.95)];
        let polyline = RoutePolyline::new(points.clone());
        assert_eq!(polyline.points(), &points[..]);
        assert_eq!(polyline.into_points(), points);
    }

    #[test]
    fn test_empty_polyline() {
        let polyline = RoutePolyline::new(vec![]);
        assert!(polyline.is_empty());
        assert_eq!(polyline.index_at_distance(10.0, 100.0), 0);
        assert!(polyline.local_direction(10.0, 100.0, 20.0).is_none());
    }

    #[test]
    fn test_index_proportional_to_distance() {
        let polyline = equator_line(100);
        assert_eq!(polyline.index_at_distance(0.0, 100.0), 0);
        assert_eq!(polyline.index_at_distance(50.0, 100.0), 50);
        assert_eq!(polyline.index_at_distance(250.0, 100.0), 99);
        assert_eq!(polyline.index_at_distance(-5.0, 100.0), 0);
    }

    #[test]
    fn test_local_direction_mid_route() {
        let polyline = equator_line(201);
        let direction = polyline.local_direction(100.0, 201.0, 20.0).unwrap();
        assert_eq!(direction.target, polyline.points()[100]);
        assert_eq!(direction.prev, polyline.points()[80]);
        assert_eq!(direction.next, polyline.points()[120]);
        assert!((direction.bearing.unwrap() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_direction_clamps_at_start() {
        let polyline = equator_line(201);
        let direction = polyline.local_direction(0.0, 201.0, 20.0).unwrap();
        assert_eq!(direction.prev, polyline.points()[0]);
        assert_eq!(direction.next, polyline.points()[20]);
        assert!((direction.bearing.unwrap() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_direction_widens_sparse_window() {
        // Two points over 100 km: the 20 km window rounds to zero points.
        let polyline = RoutePolyline::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.9)]);
        let direction = polyline.local_direction(10.0, 100.0, 20.0).unwrap();
        assert_eq!(direction.prev, polyline.points()[0]);
        assert_eq!(direction.next, polyline.points()[1]);
        assert!((direction.bearing.unwrap() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_direction_clamps_at_end() {
        let polyline = equator_line(201);
        let direction = polyline.local_direction(195.0, 201.0, 20.0).unwrap();
        assert_eq!(direction.prev, polyline.points()[175]);
        assert_eq!(direction.next, polyline.points()[200]);
        assert!((direction.bearing.unwrap() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_local_direction_two_close_points_has_no_bearing() {
        // ~0.5 km apart: even the whole polyline is too short for a heading.
        let polyline = RoutePolyline::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0045)]);
        let direction = polyline.local_direction(10.0, 100.0, 20.0).unwrap();
        assert_eq!(direction.prev, polyline.points()[0]);
        assert_eq!(direction.next, polyline.points()[1]);
        assert!(direction.bearing.is_none());
    }

    #[test]
    fn test_local_direction_degenerate_route() {
        let polyline = RoutePolyline::new(vec![Coordinate::new(1.0, 1.0)]);
        let direction = polyline.local_direction(0.0, 0.0, 20.0).unwrap();
        assert_eq!(direction.target, Coordinate::new(1.0, 1.0));
        assert!(direction.bearing.is_none());
    }

    #[test]
    fn test_length_km() {
        let polyline = equator_line(11);
        assert!((polyline.length_km() - 11.12).abs() < 0.05);
    }
}
