//! Trip-planning data model.
//!
//! Stations and verified route entries are read-only snapshots handed to us
//! by collaborators. The selectors only ever decorate clones of them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Plug standard, e.g. "CCS2".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub power_kw: f64,
    #[serde(default = "default_connector_count")]
    pub count: u32,
    #[serde(default)]
    pub status: Option<String>,
}

fn default_connector_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub location: Coordinate,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default = "default_access_policy")]
    pub access_policy: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub data_provider: String,
}

fn default_access_policy() -> String {
    "24/7".to_string()
}

impl Station {
    /// Highest connector power, or `None` when the station lists no connectors.
    pub fn max_power_kw(&self) -> Option<f64> {
        self.connectors
            .iter()
            .map(|connector| connector.power_kw)
            .filter(|power| power.is_finite())
            .reduce(f64::max)
    }

    /// True if any connector delivers at least `threshold_kw`.
    pub fn has_connector_at_least(&self, threshold_kw: f64) -> bool {
        self.connectors
            .iter()
            .any(|connector| connector.power_kw >= threshold_kw)
    }

    /// Name for display, falling back to `fallback` when the catalog left it blank.
    pub fn display_name(&self, fallback: impl FnOnce() -> String) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            fallback()
        } else {
            name.to_string()
        }
    }
}

/// A station chosen as a charging stop, with the metrics the selector derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopCandidate {
    pub station: Station,
    /// Position of the stop along the route, measured from the trip start.
    pub distance_from_start_km: f64,
    pub distance_from_route_km: f64,
    /// Distance driven since the trip start or the previous stop.
    pub range_needed_km: f64,
    pub recommended_charge_time_min: u32,
    pub detour_distance_km: f64,
    pub is_emergency_option: bool,
}

/// A pre-vetted station on a known route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedRouteEntry {
    pub station: Station,
    pub distance_from_start_km: f64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub recommended_charge_time_min: Option<u32>,
}

/// Why a trip cannot be completed with the given ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Infeasibility {
    NoCurrentRange,
    StationOutOfReach {
        station_name: String,
        station_distance_km: f64,
        gap_km: f64,
        available_range_km: f64,
    },
    DestinationOutOfReach {
        gap_km: f64,
        available_range_km: f64,
    },
    FinalLegTooLong {
        final_leg_km: f64,
        available_range_km: f64,
    },
    InsufficientUsableRange {
        range_km: f64,
        buffer_km: f64,
    },
    StopLimitReached {
        limit: usize,
        remaining_km: f64,
    },
    NoStationFound {
        target_distance_km: f64,
        search_radius_km: f64,
    },
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::NoCurrentRange => {
                write!(f, "Current battery range is zero or negative.")
            }
            Infeasibility::StationOutOfReach {
                station_name,
                station_distance_km,
                gap_km,
                available_range_km,
            } => write!(
                f,
                "Cannot reach the next station ({} at {:.0}km). Need to cover {:.0}km but only have {:.0}km range.",
                station_name, station_distance_km, gap_km, available_range_km
            ),
            Infeasibility::DestinationOutOfReach {
                gap_km,
                available_range_km,
            } => write!(
                f,
                "Cannot reach the destination. Need to cover {:.0}km but only have {:.0}km range.",
                gap_km, available_range_km
            ),
            Infeasibility::FinalLegTooLong {
                final_leg_km,
                available_range_km,
            } => write!(
                f,
                "Cannot reach destination from the last point. Final stretch is {:.0}km but available range is only {:.0}km.",
                final_leg_km, available_range_km
            ),
            Infeasibility::InsufficientUsableRange {
                range_km,
                buffer_km,
            } => write!(
                f,
                "Range of {:.0}km leaves nothing usable after the {:.0}km safety buffer.",
                range_km, buffer_km
            ),
            Infeasibility::StopLimitReached {
                limit,
                remaining_km,
            } => write!(
                f,
                "Trip needs more than {} charging stops; {:.0}km still uncovered.",
                limit, remaining_km
            ),
            Infeasibility::NoStationFound {
                target_distance_km,
                search_radius_km,
            } => write!(
                f,
                "No charging station found within {:.0}km of the {:.0}km mark.",
                search_radius_km, target_distance_km
            ),
        }
    }
}

/// Outcome of a stop selection run.
///
/// Build it through [`TripPlan::feasible`] or [`TripPlan::infeasible`]; an
/// infeasible plan never carries stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub stops: Vec<StopCandidate>,
    pub total_distance_km: f64,
    pub is_possible: bool,
    pub infeasibility: Option<Infeasibility>,
}

impl TripPlan {
    /// A plan that reaches the destination with `stops`.
    pub fn feasible(stops: Vec<StopCandidate>, total_distance_km: f64) -> Self {
        Self {
            stops,
            total_distance_km,
            is_possible: true,
            infeasibility: None,
        }
    }

    /// A plan with no stops and the reason it cannot work.
    pub fn infeasible(total_distance_km: f64, reason: Infeasibility) -> Self {
        Self {
            stops: Vec::new(),
            total_distance_km,
            is_possible: false,
            infeasibility: Some(reason),
        }
    }

    /// Human-readable reason, if the plan is infeasible.
    pub fn infeasibility_reason(&self) -> Option<String> {
        self.infeasibility.as_ref().map(ToString::to_string)
    }
}

/// One displayed leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub from_label: String,
    pub to_label: String,
    pub distance_km: f64,
    pub range_at_arrival_label: Option<String>,
}
