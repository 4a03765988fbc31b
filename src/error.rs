//! Error type shared by the planner and its collaborator adapters.
//!
//! Infeasible trips are not errors: they come back as a [`TripPlan`] with
//! `is_possible == false`. Everything here aborts the planning request.
//!
//! [`TripPlan`]: crate::model::TripPlan

use thiserror::Error;

use crate::model::Coordinate;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Error, Debug)]
pub enum PlannerError {
    /// The geocoder had no match for a place name.
    #[error("location not found: {place}")]
    NotFound { place: String },

    /// The road router returned no route between two points.
    #[error("no route found between {from} and {to}")]
    NoRoute { from: Coordinate, to: Coordinate },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A provider answered, but not with anything we could read.
    #[error("malformed response from {provider}: {message}")]
    MalformedResponse { provider: String, message: String },

    #[error("invalid trip request: {message}")]
    InvalidRequest { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("catalog could not be parsed: {0}")]
    CatalogParse(#[from] serde_json::Error),
}

impl PlannerError {
    pub(crate) fn malformed(provider: &str, message: impl Into<String>) -> Self {
        PlannerError::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
