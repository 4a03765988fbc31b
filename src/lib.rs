//! Electric-vehicle road trip planner.
//!
//! Decides whether a trip is feasible on the vehicle's range and, if so,
//! which charging stops keep it moving.

pub mod catalog;
pub mod charge;
pub mod config;
pub mod error;
pub mod haversine;
pub mod model;
pub mod nominatim;
pub mod openchargemap;
pub mod osrm;
pub mod planner;
pub mod polyline;
pub mod segments;
pub mod selector;
pub mod traits;

pub use error::{PlannerError, Result};
pub use model::{Coordinate, Infeasibility, Segment, Station, StopCandidate, TripPlan};
pub use planner::{PlanSource, TripItinerary, TripPlanner, TripRequest};
