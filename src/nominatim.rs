//! Nominatim HTTP adapter for geocoding place names.
//!
//! The public Nominatim instance allows one request per second and wants an
//! identifying User-Agent; both are configurable for self-hosted instances.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::model::Coordinate;
use crate::traits::Geocoder;

const PROVIDER: &str = "Nominatim";

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Minimum spacing between consecutive requests.
    pub min_interval_ms: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("ev-trip-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            min_interval_ms: 1000,
        }
    }
}

#[derive(Debug)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            config,
            client,
            last_request: Mutex::new(None),
        })
    }

    /// Sleep until the configured interval since the previous request has passed.
    fn throttle(&self) {
        let interval = Duration::from_millis(self.config.min_interval_ms);
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, place: &str) -> Result<Coordinate> {
        self.throttle();

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        debug!(%place, "geocoding");

        let results = self
            .client
            .get(url)
            .query(&[("format", "json"), ("q", place), ("limit", "1")])
            .send()?
            .error_for_status()?
            .json::<Vec<NominatimPlace>>()?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::NotFound {
                place: place.to_string(),
            })?;

        let parse = |value: &str, field: &str| {
            value.trim().parse::<f64>().map_err(|_| {
                PlannerError::malformed(PROVIDER, format!("unparsable {} '{}'", field, value))
            })
        };

        Ok(Coordinate::new(
            parse(&first.lat, "latitude")?,
            parse(&first.lon, "longitude")?,
        ))
    }
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}
