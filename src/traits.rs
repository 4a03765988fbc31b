//! Collaborator capabilities the planner depends on.
//!
//! Geocoding, road routing, the route catalog and station lookup all live
//! outside the planner. Concrete providers (HTTP adapters, in-memory
//! catalogs, test fakes) implement these traits.

use crate::error::Result;
use crate::model::{Coordinate, Station, VerifiedRouteEntry};
use crate::polyline::RoutePolyline;

/// A road route as returned by a router.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadRoute {
    pub polyline: RoutePolyline,
    pub distance_km: f64,
}

/// Resolves place names to coordinates.
pub trait Geocoder: Send + Sync {
    /// Fails with `PlannerError::NotFound` when nothing matches.
    fn geocode(&self, place: &str) -> Result<Coordinate>;
}

/// Computes drivable routes.
pub trait RoadRouter: Send + Sync {
    /// Fails with `PlannerError::NoRoute` when the provider has none.
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<RoadRoute>;

    /// Route visiting `waypoints` in the given order.
    fn route_with_waypoints(
        &self,
        from: Coordinate,
        to: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<RoadRoute>;
}

/// Known-good trip templates.
pub trait RouteCatalog: Send + Sync {
    /// Verified stations for a trip between two place labels, ordered by
    /// distance from `start`. Label normalization is the catalog's job.
    fn match_popular_route(
        &self,
        start: &str,
        destination: &str,
    ) -> Result<Option<Vec<VerifiedRouteEntry>>>;
}

/// Looks up charging stations around a point.
pub trait StationDirectory: Send + Sync {
    fn nearby(&self, point: Coordinate, radius_km: f64) -> Result<Vec<Station>>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "station-directory"
    }
}
