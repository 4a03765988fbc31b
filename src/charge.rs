//! Charging-time estimate from a range deficit and charger power.
//!
//! Flat average-power model: no charging curve, just a derating factor.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChargeModel {
    /// Range gained per kWh delivered.
    pub km_per_kwh: f64,
    /// Assumed charger power when the station reports none.
    pub default_power_kw: f64,
    /// Fraction of rated power actually delivered on average.
    pub derating: f64,
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl Default for ChargeModel {
    fn default() -> Self {
        Self {
            km_per_kwh: 5.0,
            default_power_kw: 50.0,
            derating: 0.8,
            min_minutes: 15,
            max_minutes: 90,
        }
    }
}

impl ChargeModel {
    /// Minutes to charge from `current_range_km` to `target_range_km`.
    ///
    /// Always within `[min_minutes, max_minutes]`. Unknown, zero or negative
    /// power falls back to `default_power_kw`.
    pub fn estimate_minutes(
        &self,
        current_range_km: f64,
        target_range_km: f64,
        charger_power_kw: Option<f64>,
    ) -> u32 {
        let power = charger_power_kw
            .filter(|power| power.is_finite() && *power > 0.0)
            .unwrap_or(self.default_power_kw);

        let range_needed = target_range_km - current_range_km;
        let kwh_needed = range_needed / self.km_per_kwh;
        let hours = kwh_needed / (power * self.derating);
        let minutes = (hours * 60.0).ceil();

        let min = f64::from(self.min_minutes);
        let max = f64::from(self.max_minutes.max(self.min_minutes));
        if minutes.is_nan() {
            return self.min_minutes;
        }
        minutes.clamp(min, max) as u32
    }
}

/// [`ChargeModel::estimate_minutes`] with the default model.
pub fn estimate_charge_minutes(
    current_range_km: f64,
    target_range_km: f64,
    charger_power_kw: Option<f64>,
) -> u32 {
    ChargeModel::default().estimate_minutes(current_range_km, target_range_km, charger_power_kw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_fast_charge() {
        // 250 km = 50 kWh at 60 kW * 0.8 = 48 kW -> 62.5 min -> 63
        assert_eq!(estimate_charge_minutes(50.0, 300.0, Some(60.0)), 63);
    }

    #[test]
    fn test_clamped_to_minimum() {
        assert_eq!(estimate_charge_minutes(290.0, 300.0, Some(150.0)), 15);
        // Already above target.
        assert_eq!(estimate_charge_minutes(350.0, 300.0, Some(50.0)), 15);
    }

    #[test]
    fn test_clamped_to_maximum() {
        assert_eq!(estimate_charge_minutes(0.0, 500.0, Some(7.4)), 90);
    }

    #[test]
    fn test_unknown_power_uses_default() {
        // 200 km = 40 kWh at 50 kW * 0.8 = 40 kW -> 60 min
        assert_eq!(estimate_charge_minutes(100.0, 300.0, None), 60);
        assert_eq!(estimate_charge_minutes(100.0, 300.0, Some(0.0)), 60);
        assert_eq!(estimate_charge_minutes(100.0, 300.0, Some(-5.0)), 60);
    }

    #[test]
    fn test_always_within_bounds() {
        let powers = [None, Some(0.0), Some(3.3), Some(22.0), Some(50.0), Some(350.0)];
        for current in [0.0, 10.0, 150.0, 400.0] {
            for target in [0.0, 100.0, 300.0, 1000.0] {
                for power in powers {
                    let minutes = estimate_charge_minutes(current, target, power);
                    assert!((15..=90).contains(&minutes), "{} {} {:?} -> {}", current, target, power, minutes);
                }
            }
        }
    }

    #[test]
    fn test_nan_input_falls_to_minimum() {
        assert_eq!(estimate_charge_minutes(f64::NAN, 300.0, Some(50.0)), 15);
    }
}
