//! Stop selection by live station discovery along a road route.
//!
//! Each iteration aims for the farthest point the remaining range allows,
//! fetches stations around it, keeps the ones ahead of the driver and picks
//! the best-scoring one. Iterations are inherently sequential: the next
//! target depends on where the previous stop landed.
//!
//! The fetch step is the only effectful part. Filtering, scoring and the
//! emergency pick are plain functions over a candidate slice.

use tracing::{debug, info, warn};

use super::SelectionContext;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::haversine::{angle_between, bearing_degrees, detour_cost_km, distance_km};
use crate::model::{Coordinate, Infeasibility, Station, StopCandidate, TripPlan};
use crate::polyline::{LocalDirection, RoutePolyline};
use crate::traits::StationDirectory;

/// Station directories in fallback order.
#[derive(Clone, Copy)]
pub struct StationSources<'a> {
    pub primary: &'a dyn StationDirectory,
    pub secondary: Option<&'a dyn StationDirectory>,
}

impl<'a> StationSources<'a> {
    /// Sources with only a primary directory.
    pub fn new(primary: &'a dyn StationDirectory) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Directory tried at widening radii when the primary finds nothing.
    pub fn with_secondary(mut self, secondary: &'a dyn StationDirectory) -> Self {
        self.secondary = Some(secondary);
        self
    }
}

/// A candidate that passed the direction filter and the distance cap.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'s> {
    pub station: &'s Station,
    pub distance_km: f64,
    pub detour_km: f64,
    pub score: f64,
}

/// Selects stops by querying station directories along a road polyline.
pub struct DiscoverySelector<'a> {
    polyline: &'a RoutePolyline,
    sources: StationSources<'a>,
}

impl<'a> DiscoverySelector<'a> {
    /// Selector over `polyline`, querying `sources` in fallback order.
    pub fn new(polyline: &'a RoutePolyline, sources: StationSources<'a>) -> Self {
        Self { polyline, sources }
    }

    /// Run the discovery loop. `Err` only when a directory query fails.
    pub fn select(&self, ctx: &SelectionContext<'_>) -> Result<TripPlan> {
        let config = ctx.config;
        let total = ctx.total_distance_km;
        let buffer = config.safety_buffer_km;

        let mut stops: Vec<StopCandidate> = Vec::new();
        let mut covered = 0.0;
        let mut available = ctx.current_range_km - buffer;

        loop {
            if covered + available >= total {
                info!(stops = stops.len(), total_distance_km = total, "discovery route planned");
                return Ok(TripPlan::feasible(stops, total));
            }

            if available <= 0.0 {
                let range_km = if stops.is_empty() {
                    ctx.current_range_km
                } else {
                    ctx.max_range_km
                };
                return Ok(abort(
                    total,
                    stops.len(),
                    Infeasibility::InsufficientUsableRange {
                        range_km,
                        buffer_km: buffer,
                    },
                ));
            }

            if stops.len() >= config.max_stops {
                return Ok(abort(
                    total,
                    stops.len(),
                    Infeasibility::StopLimitReached {
                        limit: config.max_stops,
                        remaining_km: total - covered,
                    },
                ));
            }

            let target_distance = covered + available;
            let direction = self
                .polyline
                .local_direction(target_distance, total, config.direction_window_km)
                .ok_or_else(|| PlannerError::InvalidRequest {
                    message: "route polyline is empty".to_string(),
                })?;
            debug!(
                target_km = target_distance,
                lat = direction.target.lat,
                lng = direction.target.lng,
                "looking for a charging stop"
            );

            let fetched = self.fetch_candidates(direction.target, config)?;

            let chosen = pick_best(&fetched, &direction, config).map(|best| {
                info!(
                    station = %best.station.name,
                    data_provider = %best.station.data_provider,
                    distance_km = best.distance_km,
                    score = best.score,
                    "stop selected"
                );
                StopCandidate {
                    station: best.station.clone(),
                    distance_from_start_km: target_distance,
                    distance_from_route_km: best.distance_km,
                    range_needed_km: target_distance - covered,
                    recommended_charge_time_min: config.charge.estimate_minutes(
                        available,
                        ctx.max_range_km,
                        best.station.max_power_kw(),
                    ),
                    detour_distance_km: best.detour_km,
                    is_emergency_option: false,
                }
            });

            let stop = match chosen {
                Some(stop) => stop,
                None => {
                    warn!(
                        fetched = fetched.len(),
                        "no charging station along the route direction"
                    );
                    let pool = if fetched.is_empty() {
                        self.fetch_emergency_pool(direction.target, config)?
                    } else {
                        fetched
                    };

                    let Some((station, distance)) = pick_emergency(&pool, direction.target, config)
                    else {
                        return Ok(abort(
                            total,
                            stops.len(),
                            Infeasibility::NoStationFound {
                                target_distance_km: target_distance,
                                search_radius_km: config.emergency_max_distance_km,
                            },
                        ));
                    };

                    info!(station = %station.name, distance_km = distance, "emergency stop selected");
                    StopCandidate {
                        station: station.clone(),
                        distance_from_start_km: target_distance,
                        distance_from_route_km: distance,
                        range_needed_km: target_distance - covered,
                        recommended_charge_time_min: config.charge.estimate_minutes(
                            available,
                            ctx.max_range_km,
                            station.max_power_kw(),
                        ),
                        detour_distance_km: detour_cost_km(direction.prev, station.location, direction.next),
                        is_emergency_option: true,
                    }
                }
            };

            stops.push(stop);
            covered = target_distance;
            available = ctx.max_range_km - buffer;
        }
    }

    /// Primary directory first, then the secondary at each fallback radius
    /// until something comes back.
    fn fetch_candidates(&self, point: Coordinate, config: &PlannerConfig) -> Result<Vec<Station>> {
        let primary = self.sources.primary;
        let stations = primary.nearby(point, config.primary_search_radius_km)?;
        debug!(
            directory = primary.name(),
            radius_km = config.primary_search_radius_km,
            found = stations.len(),
            "station query"
        );
        if !stations.is_empty() {
            return Ok(stations);
        }

        let Some(secondary) = self.sources.secondary else {
            return Ok(stations);
        };
        for &radius in &config.secondary_search_radii_km {
            let stations = secondary.nearby(point, radius)?;
            debug!(
                directory = secondary.name(),
                radius_km = radius,
                found = stations.len(),
                "fallback station query"
            );
            if !stations.is_empty() {
                return Ok(stations);
            }
        }

        Ok(Vec::new())
    }

    fn fetch_emergency_pool(&self, point: Coordinate, config: &PlannerConfig) -> Result<Vec<Station>> {
        let directory = self.sources.secondary.unwrap_or(self.sources.primary);
        let stations = directory.nearby(point, config.emergency_search_radius_km)?;
        debug!(
            directory = directory.name(),
            radius_km = config.emergency_search_radius_km,
            found = stations.len(),
            "emergency station query"
        );
        Ok(stations)
    }
}

fn abort(total: f64, planned: usize, reason: Infeasibility) -> TripPlan {
    warn!(planned, %reason, "discovery aborted, discarding partial plan");
    TripPlan::infeasible(total, reason)
}

/// Whether `station` lies ahead of the driver around `direction.target`.
///
/// Fast chargers get a wider cone. Without a route bearing every station
/// passes.
pub fn heads_forward(station: &Station, direction: &LocalDirection, config: &PlannerConfig) -> bool {
    let Some(route_bearing) = direction.bearing else {
        return true;
    };

    let station_bearing = bearing_degrees(direction.target, station.location);
    let angle = angle_between(station_bearing, route_bearing);
    let threshold = if station.has_connector_at_least(config.fast_charger_kw) {
        config.fast_angle_threshold_deg
    } else {
        config.standard_angle_threshold_deg
    };

    let ahead = distance_km(direction.next, station.location)
        < distance_km(direction.prev, station.location);

    angle < threshold && ahead
}

/// Score multiplier rewarding faster chargers.
pub fn speed_bonus(station: &Station, config: &PlannerConfig) -> f64 {
    let max_power = station.max_power_kw().unwrap_or(0.0);
    if max_power >= config.ultra_fast_charger_kw {
        config.ultra_fast_charger_bonus
    } else if max_power >= config.fast_charger_kw {
        config.fast_charger_bonus
    } else {
        1.0
    }
}

/// Score a station (lower is better), or `None` if it is too far from the target.
pub fn score_candidate<'s>(
    station: &'s Station,
    direction: &LocalDirection,
    config: &PlannerConfig,
) -> Option<ScoredCandidate<'s>> {
    let distance = distance_km(direction.target, station.location);
    if !(distance < config.max_candidate_distance_km) {
        return None;
    }

    let detour = detour_cost_km(direction.prev, station.location, direction.next);
    let score = (distance + config.detour_weight * detour) * speed_bonus(station, config);

    Some(ScoredCandidate {
        station,
        distance_km: distance,
        detour_km: detour,
        score,
    })
}

/// Best forward-facing candidate; ties keep the earlier station.
pub fn pick_best<'s>(
    stations: &'s [Station],
    direction: &LocalDirection,
    config: &PlannerConfig,
) -> Option<ScoredCandidate<'s>> {
    let mut best: Option<ScoredCandidate<'s>> = None;
    for station in stations {
        if !heads_forward(station, direction, config) {
            continue;
        }
        let Some(candidate) = score_candidate(station, direction, config) else {
            continue;
        };
        if best.is_none_or(|current| candidate.score < current.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Nearest station to `target` regardless of direction, if close enough.
pub fn pick_emergency<'s>(
    stations: &'s [Station],
    target: Coordinate,
    config: &PlannerConfig,
) -> Option<(&'s Station, f64)> {
    stations
        .iter()
        .map(|station| (station, distance_km(target, station.location)))
        .filter(|(_, distance)| distance.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, distance)| *distance < config.emergency_max_distance_km)
}
