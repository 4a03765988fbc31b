//! Trip planning entry point.
//!
//! Resolves the endpoints, picks a stop selector (verified route when the
//! catalog knows the trip, live discovery otherwise), and renders the final
//! route and per-leg segments.

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::model::{Coordinate, Segment, StopCandidate, TripPlan};
use crate::segments::compose_segments;
use crate::selector::{
    DiscoverySelector, SelectionContext, StationSources, StopSelector, VerifiedRouteSelector,
};
use crate::traits::{Geocoder, RoadRoute, RoadRouter, RouteCatalog};

/// A trip as typed by the driver: two place labels and the battery state.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub start: String,
    pub destination: String,
    pub current_range_km: f64,
    pub max_range_km: f64,
}

impl TripRequest {
    /// Build a request; nothing is checked until planning.
    pub fn new(
        start: impl Into<String>,
        destination: impl Into<String>,
        current_range_km: f64,
        max_range_km: f64,
    ) -> Self {
        Self {
            start: start.into(),
            destination: destination.into(),
            current_range_km,
            max_range_km,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.start.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(PlannerError::InvalidRequest {
                message: "start and destination are required".to_string(),
            });
        }
        if !self.current_range_km.is_finite() || !self.max_range_km.is_finite() {
            return Err(PlannerError::InvalidRequest {
                message: format!(
                    "ranges must be finite numbers (current {}, max {})",
                    self.current_range_km, self.max_range_km
                ),
            });
        }
        Ok(())
    }
}

/// Which selector produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanSource {
    VerifiedRoute,
    Discovery,
}

/// Everything a caller needs to show a planned trip.
#[derive(Debug, Clone)]
pub struct TripItinerary {
    pub start: Coordinate,
    pub destination: Coordinate,
    pub plan: TripPlan,
    /// Direct route, or the route through every stop when there are any.
    pub route: RoadRoute,
    pub segments: Vec<Segment>,
    pub source: PlanSource,
}

/// Plans trips against a set of collaborators.
pub struct TripPlanner<'a> {
    geocoder: &'a dyn Geocoder,
    router: &'a dyn RoadRouter,
    catalog: Option<&'a dyn RouteCatalog>,
    stations: StationSources<'a>,
    config: PlannerConfig,
}

impl<'a> TripPlanner<'a> {
    /// Planner with default config and no route catalog.
    pub fn new(
        geocoder: &'a dyn Geocoder,
        router: &'a dyn RoadRouter,
        stations: StationSources<'a>,
    ) -> Self {
        Self {
            geocoder,
            router,
            catalog: None,
            stations,
            config: PlannerConfig::default(),
        }
    }

    /// Consult `catalog` for verified routes before live discovery.
    pub fn with_catalog(mut self, catalog: &'a dyn RouteCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replace the default tunables.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Tunables in effect for this planner.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a trip between two place names.
    ///
    /// An infeasible trip is still `Ok`: check `plan.is_possible`. `Err`
    /// means a collaborator failed and nothing was planned.
    #[instrument(skip(self, request), fields(start = %request.start, destination = %request.destination))]
    pub fn plan_trip(&self, request: &TripRequest) -> Result<TripItinerary> {
        request.validate()?;

        let verified = match self.catalog {
            Some(catalog) => catalog.match_popular_route(&request.start, &request.destination)?,
            None => None,
        };

        let start = self.geocoder.geocode(&request.start)?;
        let destination = self.geocoder.geocode(&request.destination)?;
        let direct = self.router.route(start, destination)?;

        let ctx = SelectionContext {
            total_distance_km: direct.distance_km,
            current_range_km: request.current_range_km,
            max_range_km: request.max_range_km,
            config: &self.config,
        };

        let (selector, source) = match verified.as_deref() {
            Some(entries) if !entries.is_empty() => (
                StopSelector::VerifiedRoute(VerifiedRouteSelector::new(entries)),
                PlanSource::VerifiedRoute,
            ),
            _ => (
                StopSelector::Discovery(DiscoverySelector::new(&direct.polyline, self.stations)),
                PlanSource::Discovery,
            ),
        };

        info!(
            mode = selector.mode(),
            distance_km = direct.distance_km,
            current_range_km = request.current_range_km,
            max_range_km = request.max_range_km,
            "selecting charging stops"
        );
        let plan = selector.select_stops(&ctx)?;

        if !plan.is_possible || plan.stops.is_empty() {
            return Ok(TripItinerary {
                start,
                destination,
                plan,
                route: direct,
                segments: Vec::new(),
                source,
            });
        }

        let (route, segments) = self.render(start, destination, &plan.stops)?;
        Ok(TripItinerary {
            start,
            destination,
            plan,
            route,
            segments,
            source,
        })
    }

    /// Per-leg segments for an already chosen stop list.
    pub fn compose_segments(
        &self,
        start: Coordinate,
        destination: Coordinate,
        stops: &[StopCandidate],
    ) -> Result<Vec<Segment>> {
        compose_segments(self.router, start, destination, stops)
    }

    fn render(
        &self,
        start: Coordinate,
        destination: Coordinate,
        stops: &[StopCandidate],
    ) -> Result<(RoadRoute, Vec<Segment>)> {
        let waypoints: Vec<Coordinate> = stops.iter().map(|stop| stop.station.location).collect();
        let route = self
            .router
            .route_with_waypoints(start, destination, &waypoints)?;
        let segments = self.compose_segments(start, destination, stops)?;
        Ok((route, segments))
    }
}
