//! Charging-stop selection.
//!
//! Two greedy, forward-only strategies share one contract:
//!
//! - [`VerifiedRouteSelector`] walks a pre-vetted, ordered station list.
//! - [`DiscoverySelector`] queries station directories along a road route.
//!
//! Both end in a [`TripPlan`]: either a stop list or a typed infeasibility.
//! Only collaborator failures come back as `Err`.

pub mod discovery;
pub mod verified;

use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::model::{Infeasibility, TripPlan};

pub use discovery::{DiscoverySelector, ScoredCandidate, StationSources};
pub use verified::VerifiedRouteSelector;

/// Trip parameters shared by both selection modes.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub total_distance_km: f64,
    pub current_range_km: f64,
    pub max_range_km: f64,
    pub config: &'a PlannerConfig,
}

/// One of the two selection strategies behind a single contract.
pub enum StopSelector<'a> {
    VerifiedRoute(VerifiedRouteSelector<'a>),
    Discovery(DiscoverySelector<'a>),
}

impl StopSelector<'_> {
    /// Short name for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            StopSelector::VerifiedRoute(_) => "verified-route",
            StopSelector::Discovery(_) => "discovery",
        }
    }

    /// Choose charging stops for the trip in `ctx`.
    ///
    /// Trips the current range already covers come back feasible with no stops;
    /// an empty battery comes back as `NoCurrentRange`.
    pub fn select_stops(&self, ctx: &SelectionContext<'_>) -> Result<TripPlan> {
        if ctx.current_range_km <= 0.0 {
            warn!(current_range_km = ctx.current_range_km, "no usable battery range");
            return Ok(TripPlan::infeasible(
                ctx.total_distance_km,
                Infeasibility::NoCurrentRange,
            ));
        }

        if ctx.current_range_km >= ctx.total_distance_km {
            debug!(
                mode = self.mode(),
                total_distance_km = ctx.total_distance_km,
                "destination within current range"
            );
            return Ok(TripPlan::feasible(Vec::new(), ctx.total_distance_km));
        }

        match self {
            StopSelector::VerifiedRoute(selector) => Ok(selector.select(ctx)),
            StopSelector::Discovery(selector) => selector.select(ctx),
        }
    }
}
