//! Per-leg itinerary for a chosen stop sequence.
//!
//! Legs are routed over roads, not great circles. They are independent of
//! each other, so the routing calls fan out across the rayon pool. Nothing
//! here re-validates feasibility.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::model::{Coordinate, Segment, StopCandidate};
use crate::traits::RoadRouter;

const START_LABEL: &str = "Start";
const DESTINATION_LABEL: &str = "Destination";

/// One segment per leg: start to the first stop, stop to stop, last stop to destination.
pub fn compose_segments<R>(
    router: &R,
    start: Coordinate,
    destination: Coordinate,
    stops: &[StopCandidate],
) -> Result<Vec<Segment>>
where
    R: RoadRouter + ?Sized,
{
    let mut waypoints = Vec::with_capacity(stops.len() + 2);
    waypoints.push((start, START_LABEL.to_string(), None));
    for (i, stop) in stops.iter().enumerate() {
        let label = stop
            .station
            .display_name(|| format!("Charging Stop {}", i + 1));
        waypoints.push((stop.station.location, label, Some(stop.range_needed_km)));
    }
    waypoints.push((destination, DESTINATION_LABEL.to_string(), None));

    let segments = waypoints
        .par_windows(2)
        .map(|pair| -> Result<Segment> {
            let (from, from_label, _) = &pair[0];
            let (to, to_label, range_needed) = &pair[1];
            let leg = router.route(*from, *to)?;
            debug!(from = %from_label, to = %to_label, distance_km = leg.distance_km, "leg routed");

            Ok(Segment {
                from_label: from_label.clone(),
                to_label: to_label.clone(),
                distance_km: leg.distance_km,
                range_at_arrival_label: range_needed
                    .filter(|needed| *needed > 0.0)
                    .map(|needed| range_label(needed - leg.distance_km)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(segments)
}

fn range_label(remaining_km: f64) -> String {
    format!("~{:.0}km remaining", remaining_km.max(0.0))
}
