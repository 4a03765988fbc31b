//! OSRM HTTP adapter for road routes.

use serde::Deserialize;
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::model::Coordinate;
use crate::polyline::RoutePolyline;
use crate::traits::{RoadRoute, RoadRouter};

const PROVIDER: &str = "OSRM";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn fetch_route(&self, points: &[Coordinate]) -> Result<RoadRoute> {
        // OSRM takes lng,lat pairs.
        let coords = points
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lng, point.lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/route/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        );
        debug!(%url, "requesting OSRM route");

        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()?;
        // OSRM reports NoRoute and friends as 400 with a JSON body.
        let response = if response.status().is_client_error() {
            response
        } else {
            response.error_for_status()?
        };
        let body = response.json::<OsrmRouteResponse>()?;

        let no_route = || match (points.first(), points.last()) {
            (Some(from), Some(to)) => PlannerError::NoRoute {
                from: *from,
                to: *to,
            },
            _ => PlannerError::malformed(PROVIDER, "route requested without points"),
        };

        match body.code.as_str() {
            "Ok" => {}
            "NoRoute" => return Err(no_route()),
            code => {
                return Err(PlannerError::malformed(
                    PROVIDER,
                    format!("{}: {}", code, body.message.unwrap_or_default()),
                ));
            }
        }

        let route = body.routes.into_iter().next().ok_or_else(no_route)?;
        let points = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Coordinate::new(lat, lng))
            .collect();

        Ok(RoadRoute {
            polyline: RoutePolyline::new(points),
            distance_km: route.distance / 1000.0,
        })
    }
}

impl RoadRouter for OsrmClient {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<RoadRoute> {
        self.fetch_route(&[from, to])
    }

    fn route_with_waypoints(
        &self,
        from: Coordinate,
        to: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<RoadRoute> {
        let mut points = Vec::with_capacity(waypoints.len() + 2);
        points.push(from);
        points.extend_from_slice(waypoints);
        points.push(to);
        self.fetch_route(&points)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}
