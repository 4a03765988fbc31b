//! In-memory route catalog and station directory.
//!
//! Holds the known-good popular routes with their vetted stations, and the
//! station list behind `nearby` lookups. Usually seeded from a JSON file.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::haversine::distance_km;
use crate::model::{Coordinate, Station, VerifiedRouteEntry};
use crate::traits::{RouteCatalog, StationDirectory};

/// Default cap on `nearby` results.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Words that do not help tell one city from another.
static NOISE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(city|railway station|airport|cantt|cantonment)\b")
        .expect("noise word pattern is valid")
});

/// Alternate spellings folded onto the name used in keywords.
static ALIASES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [(r"\bbengaluru\b", "bangalore")]
        .into_iter()
        .map(|(pattern, canonical)| {
            (Regex::new(pattern).expect("alias pattern is valid"), canonical)
        })
        .collect()
});

/// A known-good trip template with its vetted stations.
#[derive(Debug, Clone, Deserialize)]
pub struct PopularRoute {
    pub route_id: String,
    pub name: String,
    pub start_city: String,
    pub end_city: String,
    /// Every label that may name either end of the route.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Extra names for `start_city` (e.g. "bengaluru").
    #[serde(default)]
    pub start_keywords: Vec<String>,
    /// Extra names for `end_city` (e.g. "madras").
    #[serde(default)]
    pub end_keywords: Vec<String>,
    pub distance_km: f64,
    /// Ordered by distance from `start_city`.
    #[serde(default)]
    pub stations: Vec<VerifiedRouteEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteEnd {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

impl PopularRoute {
    fn matches(&self, keyword: &str) -> bool {
        self.keywords
            .iter()
            .any(|candidate| normalize_place(candidate) == keyword)
    }

    /// Which end of the route a normalized label names, if it names exactly one.
    fn end_of(&self, place: &str) -> Option<RouteEnd> {
        let names = |city: &str, extra: &[String]| {
            normalize_place(city) == place
                || extra.iter().any(|keyword| normalize_place(keyword) == place)
        };
        match (
            names(&self.start_city, &self.start_keywords),
            names(&self.end_city, &self.end_keywords),
        ) {
            (true, false) => Some(RouteEnd::Start),
            (false, true) => Some(RouteEnd::End),
            _ => None,
        }
    }

    /// Travel direction for a trip between two normalized labels.
    ///
    /// `None` when neither label pins an end, or the two contradict each other.
    fn direction(&self, start: &str, destination: &str) -> Option<Direction> {
        use RouteEnd::{End, Start};
        match (self.end_of(start), self.end_of(destination)) {
            (Some(Start), Some(End)) | (Some(Start), None) | (None, Some(End)) => {
                Some(Direction::Forward)
            }
            (Some(End), Some(Start)) | (Some(End), None) | (None, Some(Start)) => {
                Some(Direction::Reverse)
            }
            _ => None,
        }
    }

    /// Entries as seen when driving from `end_city` back to `start_city`.
    fn reversed_entries(&self) -> Vec<VerifiedRouteEntry> {
        self.stations
            .iter()
            .rev()
            .map(|entry| VerifiedRouteEntry {
                distance_from_start_km: (self.distance_km - entry.distance_from_start_km).max(0.0),
                ..entry.clone()
            })
            .collect()
    }
}

/// Route catalog and station directory held in memory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InMemoryCatalog {
    pub routes: Vec<PopularRoute>,
    pub stations: Vec<Station>,
    /// Most stations a single `nearby` call returns, nearest first.
    pub max_results: usize,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            stations: Vec::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl InMemoryCatalog {
    /// Catalog over `routes` and `stations`, capped at [`DEFAULT_MAX_RESULTS`].
    pub fn new(routes: Vec<PopularRoute>, stations: Vec<Station>) -> Self {
        Self {
            routes,
            stations,
            ..Self::default()
        }
    }

    /// Change how many stations `nearby` returns.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Parse a JSON seed with `routes` and `stations` arrays.
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

impl RouteCatalog for InMemoryCatalog {
    fn match_popular_route(
        &self,
        start: &str,
        destination: &str,
    ) -> Result<Option<Vec<VerifiedRouteEntry>>> {
        let start = normalize_place(start);
        let destination = normalize_place(destination);

        let matched = self
            .routes
            .iter()
            .filter(|route| route.matches(&start) && route.matches(&destination))
            .find_map(|route| match route.direction(&start, &destination) {
                Some(direction) => Some((route, direction)),
                None => {
                    debug!(route = %route.name, %start, %destination, "travel direction unknown, skipping route");
                    None
                }
            });

        let Some((route, direction)) = matched else {
            debug!(%start, %destination, "no popular route");
            return Ok(None);
        };
        debug!(route = %route.name, ?direction, "matched popular route");

        let entries = match direction {
            Direction::Forward => route.stations.clone(),
            Direction::Reverse => route.reversed_entries(),
        };
        Ok(Some(entries))
    }
}

impl StationDirectory for InMemoryCatalog {
    fn nearby(&self, point: Coordinate, radius_km: f64) -> Result<Vec<Station>> {
        let mut found: Vec<(f64, &Station)> = self
            .stations
            .iter()
            .map(|station| (distance_km(point, station.location), station))
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(found
            .into_iter()
            .take(self.max_results)
            .map(|(_, station)| station.clone())
            .collect())
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

/// Lowercase, alias-folded place name with noise words and extra spaces removed.
pub fn normalize_place(place: &str) -> String {
    let mut normalized = place
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    for (alias, canonical) in ALIASES.iter() {
        normalized = alias.replace_all(&normalized, *canonical).into_owned();
    }
    let stripped = NOISE_WORDS.replace_all(&normalized, "");

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
