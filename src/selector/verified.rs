//! Stop selection over a verified route's station list.

use tracing::{debug, info};

use super::SelectionContext;
use crate::model::{Infeasibility, StopCandidate, TripPlan, VerifiedRouteEntry};

/// Greedy farthest-reachable selection over known station positions.
///
/// The first leg trusts the driver's live range reading exactly. Every later
/// leg runs on rated range and keeps the safety buffer in reserve.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedRouteSelector<'a> {
    entries: &'a [VerifiedRouteEntry],
}

impl<'a> VerifiedRouteSelector<'a> {
    /// Selector over catalog entries in any order.
    pub fn new(entries: &'a [VerifiedRouteEntry]) -> Self {
        Self { entries }
    }

    /// Walk the entries, always charging at the farthest reachable one.
    pub fn select(&self, ctx: &SelectionContext<'_>) -> TripPlan {
        let total = ctx.total_distance_km;
        let buffer = ctx.config.safety_buffer_km;

        let mut sorted: Vec<&VerifiedRouteEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.distance_from_start_km.is_finite())
            .collect();
        sorted.sort_by(|a, b| a.distance_from_start_km.total_cmp(&b.distance_from_start_km));

        let mut stops: Vec<StopCandidate> = Vec::new();
        let mut position = 0.0;
        let mut available = ctx.current_range_km;
        let mut first_leg = true;

        while position < total {
            if position + available >= total {
                break;
            }

            // Sorted ascending, so the last reachable entry is the farthest.
            let farthest = sorted
                .iter()
                .filter(|entry| {
                    let leg = entry.distance_from_start_km - position;
                    if leg <= 0.0 {
                        false
                    } else if first_leg {
                        leg <= available
                    } else {
                        leg + buffer <= available
                    }
                })
                .last();

            let Some(entry) = farthest else {
                let reason = out_of_reach(&sorted, position, available, total);
                info!(%reason, "verified route infeasible");
                return TripPlan::infeasible(total, reason);
            };

            let leg = entry.distance_from_start_km - position;
            let stop = to_stop(entry, leg, available, ctx);
            debug!(
                station = %stop.station.name,
                distance_from_start_km = entry.distance_from_start_km,
                charge_min = stop.recommended_charge_time_min,
                "verified stop selected"
            );
            stops.push(stop);

            position = entry.distance_from_start_km;
            available = ctx.max_range_km;
            first_leg = false;
        }

        let last_position = stops
            .last()
            .map(|stop| stop.distance_from_start_km)
            .unwrap_or(0.0);
        let final_leg = total - last_position;
        let final_range = if first_leg {
            ctx.current_range_km
        } else {
            ctx.max_range_km
        };

        if final_leg > final_range {
            let reason = Infeasibility::FinalLegTooLong {
                final_leg_km: final_leg,
                available_range_km: final_range,
            };
            info!(%reason, "verified route infeasible");
            return TripPlan::infeasible(total, reason);
        }

        info!(stops = stops.len(), total_distance_km = total, "verified route planned");
        TripPlan::feasible(stops, total)
    }
}

fn out_of_reach(
    sorted: &[&VerifiedRouteEntry],
    position: f64,
    available: f64,
    total: f64,
) -> Infeasibility {
    match sorted
        .iter()
        .find(|entry| entry.distance_from_start_km > position)
    {
        Some(next) => Infeasibility::StationOutOfReach {
            station_name: next.station.display_name(|| next.station.id.clone()),
            station_distance_km: next.distance_from_start_km,
            gap_km: next.distance_from_start_km - position,
            available_range_km: available,
        },
        None => Infeasibility::DestinationOutOfReach {
            gap_km: total - position,
            available_range_km: available,
        },
    }
}

fn to_stop(
    entry: &VerifiedRouteEntry,
    leg_km: f64,
    available_km: f64,
    ctx: &SelectionContext<'_>,
) -> StopCandidate {
    let charge_time = entry.recommended_charge_time_min.unwrap_or_else(|| {
        let on_arrival = (available_km - leg_km).max(0.0);
        ctx.config
            .charge
            .estimate_minutes(on_arrival, ctx.max_range_km, entry.station.max_power_kw())
    });

    StopCandidate {
        station: entry.station.clone(),
        distance_from_start_km: entry.distance_from_start_km,
        distance_from_route_km: 0.0,
        range_needed_km: leg_km,
        recommended_charge_time_min: charge_time,
        detour_distance_km: 0.0,
        is_emergency_option: false,
    }
}
