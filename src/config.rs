//! Planner tunables.
//!
//! Every distance, cap and weight the stop selectors use lives here.
//! `Default` holds the production values.

use serde::Deserialize;

use crate::charge::ChargeModel;
use crate::error::{PlannerError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Safety margin kept in reserve on every leg that relies on rated range.
    pub safety_buffer_km: f64,
    /// Most charging stops a discovered plan may contain.
    pub max_stops: usize,
    /// Radius for the primary station directory query.
    pub primary_search_radius_km: f64,
    /// Radii tried in order against the secondary directory when the primary comes back empty.
    pub secondary_search_radii_km: Vec<f64>,
    /// Radius used to refill an empty candidate set before an emergency pick.
    pub emergency_search_radius_km: f64,
    /// An emergency station must be closer than this to the target point.
    pub emergency_max_distance_km: f64,
    /// Scored candidates must be closer than this to the target point.
    pub max_candidate_distance_km: f64,
    /// Lookback/lookahead along the route used to estimate local direction.
    pub direction_window_km: f64,
    pub fast_charger_kw: f64,
    pub ultra_fast_charger_kw: f64,
    /// Direction cone (degrees) for stations with a fast connector.
    pub fast_angle_threshold_deg: f64,
    /// Direction cone (degrees) for everything else.
    pub standard_angle_threshold_deg: f64,
    pub detour_weight: f64,
    pub fast_charger_bonus: f64,
    pub ultra_fast_charger_bonus: f64,
    pub charge: ChargeModel,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            safety_buffer_km: 30.0,
            max_stops: 15,
            primary_search_radius_km: 30.0,
            secondary_search_radii_km: vec![30.0, 50.0],
            emergency_search_radius_km: 100.0,
            emergency_max_distance_km: 100.0,
            max_candidate_distance_km: 40.0,
            direction_window_km: 20.0,
            fast_charger_kw: 50.0,
            ultra_fast_charger_kw: 100.0,
            fast_angle_threshold_deg: 120.0,
            standard_angle_threshold_deg: 90.0,
            detour_weight: 0.5,
            fast_charger_bonus: 0.85,
            ultra_fast_charger_bonus: 0.7,
            charge: ChargeModel::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(input).map_err(|err| PlannerError::Config {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the selectors cannot work with.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("safety_buffer_km", self.safety_buffer_km),
            ("direction_window_km", self.direction_window_km),
            ("detour_weight", self.detour_weight),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(config_error(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        let positive = [
            ("primary_search_radius_km", self.primary_search_radius_km),
            ("emergency_search_radius_km", self.emergency_search_radius_km),
            ("emergency_max_distance_km", self.emergency_max_distance_km),
            ("max_candidate_distance_km", self.max_candidate_distance_km),
            ("fast_charger_kw", self.fast_charger_kw),
            ("ultra_fast_charger_kw", self.ultra_fast_charger_kw),
            ("fast_charger_bonus", self.fast_charger_bonus),
            ("ultra_fast_charger_bonus", self.ultra_fast_charger_bonus),
            ("charge.km_per_kwh", self.charge.km_per_kwh),
            ("charge.default_power_kw", self.charge.default_power_kw),
            ("charge.derating", self.charge.derating),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(config_error(format!("{} must be a positive number, got {}", name, value)));
            }
        }

        if let Some(radius) = self
            .secondary_search_radii_km
            .iter()
            .find(|radius| !(radius.is_finite() && **radius > 0.0))
        {
            return Err(config_error(format!(
                "secondary_search_radii_km entries must be positive, got {}",
                radius
            )));
        }

        for (name, value) in [
            ("fast_angle_threshold_deg", self.fast_angle_threshold_deg),
            ("standard_angle_threshold_deg", self.standard_angle_threshold_deg),
        ] {
            if !(0.0..=180.0).contains(&value) {
                return Err(config_error(format!("{} must be within [0, 180], got {}", name, value)));
            }
        }

        if self.max_stops == 0 {
            return Err(config_error("max_stops must be at least 1".to_string()));
        }
        if self.charge.min_minutes > self.charge.max_minutes {
            return Err(config_error(format!(
                "charge.min_minutes ({}) exceeds charge.max_minutes ({})",
                self.charge.min_minutes, self.charge.max_minutes
            )));
        }
        if self.ultra_fast_charger_kw < self.fast_charger_kw {
            return Err(config_error(format!(
                "ultra_fast_charger_kw ({}) is below fast_charger_kw ({})",
                self.ultra_fast_charger_kw, self.fast_charger_kw
            )));
        }

        Ok(())
    }
}

fn config_error(message: String) -> PlannerError {
    PlannerError::Config { message }
}
