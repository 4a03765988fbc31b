//! OpenChargeMap HTTP adapter for station lookup.
//!
//! Maps the POI format onto [`Station`]. Connectors without a power rating
//! are dropped; everything else missing gets a default.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{Connector, Coordinate, Station};
use crate::traits::StationDirectory;

pub const DATA_PROVIDER: &str = "OpenChargeMap";

#[derive(Debug, Clone)]
pub struct OpenChargeMapConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// ISO country filter, e.g. "IN".
    pub country_code: Option<String>,
    pub max_results: u32,
    /// Operational status ids to include.
    pub status_type_ids: String,
    /// Charging level ids to include (2 = AC level 2, 3 = DC fast).
    pub level_ids: String,
    pub timeout_secs: u64,
}

impl Default for OpenChargeMapConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openchargemap.io/v3/poi".to_string(),
            api_key: None,
            country_code: Some("IN".to_string()),
            max_results: 50,
            status_type_ids: "50,75".to_string(),
            level_ids: "2,3".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OpenChargeMapConfig {
    /// Defaults, with the API key taken from `OCM_API_KEY` when set.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OCM_API_KEY").ok().filter(|key| !key.is_empty()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenChargeMapClient {
    config: OpenChargeMapConfig,
    client: reqwest::blocking::Client,
}

impl OpenChargeMapClient {
    pub fn new(config: OpenChargeMapConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn query_params(&self, point: Coordinate, radius_km: f64) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", point.lat.to_string()),
            ("longitude", point.lng.to_string()),
            ("distance", radius_km.to_string()),
            ("distanceunit", "KM".to_string()),
            ("maxresults", self.config.max_results.to_string()),
            ("compact", "true".to_string()),
            ("verbose", "false".to_string()),
            ("output", "json".to_string()),
            ("statustypeid", self.config.status_type_ids.clone()),
            ("levelid", self.config.level_ids.clone()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        if let Some(country) = &self.config.country_code {
            params.push(("countrycode", country.clone()));
        }
        params
    }
}

impl StationDirectory for OpenChargeMapClient {
    fn nearby(&self, point: Coordinate, radius_km: f64) -> Result<Vec<Station>> {
        debug!(lat = point.lat, lng = point.lng, radius_km, "querying OpenChargeMap");

        let pois = self
            .client
            .get(&self.config.base_url)
            .query(&self.query_params(point, radius_km))
            .send()?
            .error_for_status()?
            .json::<Vec<OcmPoi>>()?;

        Ok(pois.into_iter().filter_map(OcmPoi::into_station).collect())
    }

    fn name(&self) -> &str {
        DATA_PROVIDER
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcmPoi {
    #[serde(rename = "ID")]
    id: u64,
    address_info: Option<OcmAddressInfo>,
    operator_info: Option<OcmTitled>,
    usage_type: Option<OcmTitled>,
    #[serde(default)]
    connections: Option<Vec<OcmConnection>>,
    #[serde(default)]
    is_recently_verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcmAddressInfo {
    title: Option<String>,
    address_line1: Option<String>,
    address_line2: Option<String>,
    town: Option<String>,
    state_or_province: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    access_comments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcmTitled {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcmConnection {
    connection_type: Option<OcmTitled>,
    #[serde(rename = "PowerKW")]
    power_kw: Option<f64>,
    quantity: Option<u32>,
    status_type: Option<OcmTitled>,
}

fn title_of(titled: Option<OcmTitled>) -> Option<String> {
    titled
        .and_then(|titled| titled.title)
        .filter(|title| !title.trim().is_empty())
}

impl OcmPoi {
    /// `None` for POIs without a usable position.
    fn into_station(self) -> Option<Station> {
        let address = self.address_info.unwrap_or_default();
        let location = Coordinate::new(address.latitude?, address.longitude?);
        if !location.is_finite() {
            return None;
        }

        let connectors = self
            .connections
            .unwrap_or_default()
            .into_iter()
            .map(|connection| Connector {
                kind: title_of(connection.connection_type).unwrap_or_else(|| "Unknown".to_string()),
                power_kw: connection.power_kw.unwrap_or(0.0),
                count: connection.quantity.filter(|count| *count > 0).unwrap_or(1),
                status: Some(title_of(connection.status_type).unwrap_or_else(|| "Unknown".to_string())),
            })
            .filter(|connector| connector.power_kw > 0.0)
            .collect();

        Some(Station {
            id: format!("ocm_{}", self.id),
            location,
            name: address
                .title
                .clone()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| format!("Charging Station {}", self.id)),
            address: format_address(&address),
            provider: title_of(self.operator_info).unwrap_or_else(|| "Unknown".to_string()),
            connectors,
            amenities: amenities_from(address.access_comments.as_deref()),
            access_policy: title_of(self.usage_type).unwrap_or_else(|| "24/7".to_string()),
            verified: self.is_recently_verified.unwrap_or(false),
            data_provider: DATA_PROVIDER.to_string(),
        })
    }
}

fn format_address(address: &OcmAddressInfo) -> String {
    [
        &address.address_line1,
        &address.address_line2,
        &address.town,
        &address.state_or_province,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref())
    .filter(|part| !part.trim().is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

fn amenities_from(access_comments: Option<&str>) -> BTreeSet<String> {
    let comments = access_comments.unwrap_or_default().to_lowercase();
    let mut amenities: BTreeSet<String> = [
        ("restaurant", "Restaurant"),
        ("restroom", "Restroom"),
        ("wifi", "WiFi"),
    ]
    .into_iter()
    .filter(|(keyword, _)| comments.contains(keyword))
    .map(|(_, amenity)| amenity.to_string())
    .collect();
    amenities.insert("Parking".to_string());
    amenities
}
