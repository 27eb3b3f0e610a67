//! # Environmental Physics
//!
//! Converts ambient weather into the multipliers the energy model consumes.
//!
//! - Air density from temperature (ideal gas law, dry air)
//! - Rolling-resistance multiplier from rain intensity
//! - Usable battery capacity factor from temperature
//! - Battery energy (internal loss) multiplier from temperature
//!
//! All functions are total: any finite input yields a value in the documented range.

use serde::{Deserialize, Serialize};

/// Standard sea-level pressure (Pa)
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;

/// Specific gas constant for dry air (J/kg·K)
const R_SPECIFIC_AIR: f64 = 287.05;

/// Dry-air density (kg/m³) at the given ambient temperature and pressure.
///
/// Kelvin temperature is clamped to at least 1 K so the division never blows up.
pub fn air_density(temp_c: f64, pressure_pa: f64) -> f64 {
    let t_k = (273.15 + temp_c).max(1.0);
    pressure_pa / (R_SPECIFIC_AIR * t_k)
}

/// Crr multiplier versus rain intensity (mm/h):
/// dry 1.00, light (≤1) 1.05, moderate (≤4) 1.12, heavy (>4) 1.20
pub fn rain_rolling_resistance_factor(precip_mm_per_h: f64) -> f64 {
    let p = precip_mm_per_h.max(0.0);
    if p <= 0.0 {
        1.00
    } else if p <= 1.0 {
        1.05
    } else if p <= 4.0 {
        1.12
    } else {
        1.20
    }
}

/// Usable battery capacity factor in [0.75, 1.00].
pub fn battery_capacity_factor(temp_c: f64) -> f64 {
    let cold_drop = 0.003 * (20.0 - temp_c).max(0.0);
    let heat_drop = 0.001 * (temp_c - 30.0).max(0.0);
    let f = 1.0 - cold_drop - heat_drop;
    f.min(1.0).max(0.75)
}

/// Extra energy drawn from the pack at non-ideal temperatures, in [1.00, 1.35].
pub fn battery_energy_multiplier(temp_c: f64) -> f64 {
    let cold_penalty = 0.01 * (10.0 - temp_c).max(0.0);
    let heat_penalty = 0.003 * (temp_c - 35.0).max(0.0);
    let m = 1.0 + cold_penalty + heat_penalty;
    m.min(1.35).max(1.0)
}

/// Ambient conditions and everything derived from them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentParams {
    /// Ambient temperature (°C)
    pub temperature_c: f64,
    /// Rain intensity (mm/h)
    pub precipitation_mm_per_h: f64,
    /// Dry-air density (kg/m³)
    pub air_density: f64,
    /// Crr multiplier from rain
    pub rolling_resistance_factor: f64,
    /// Usable capacity factor (1.0 when battery temperature is not modelled)
    pub battery_capacity_factor: f64,
    /// Energy multiplier (1.0 when battery temperature is not modelled)
    pub battery_energy_multiplier: f64,
}

impl EnvironmentParams {
    pub fn from_weather(temperature_c: f64, precipitation_mm_per_h: f64, model_battery_temp: bool) -> Self {
        let (capacity, multiplier) = if model_battery_temp {
            (
                battery_capacity_factor(temperature_c),
                battery_energy_multiplier(temperature_c),
            )
        } else {
            (1.0, 1.0)
        };

        Self {
            temperature_c,
            precipitation_mm_per_h: precipitation_mm_per_h.max(0.0),
            air_density: air_density(temperature_c, STANDARD_PRESSURE_PA),
            rolling_resistance_factor: rain_rolling_resistance_factor(precipitation_mm_per_h),
            battery_capacity_factor: capacity,
            battery_energy_multiplier: multiplier,
        }
    }

    pub fn is_raining(&self) -> bool {
        self.precipitation_mm_per_h > 0.0
    }
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self::from_weather(15.0, 0.0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_air_density_sea_level() {
        // 15°C at standard pressure ≈ 1.225 kg/m³
        let rho = air_density(15.0, STANDARD_PRESSURE_PA);
        assert!((rho - 1.225).abs() < 0.001);

        // Colder air is denser
        assert!(air_density(-20.0, STANDARD_PRESSURE_PA) > rho);
    }

    #[test]
    fn test_air_density_clamps_kelvin() {
        let rho = air_density(-500.0, STANDARD_PRESSURE_PA);
        assert_eq!(rho, STANDARD_PRESSURE_PA / R_SPECIFIC_AIR);
    }

    #[rstest]
    #[case(-3.0, 1.00)]
    #[case(0.0, 1.00)]
    #[case(0.5, 1.05)]
    #[case(1.0, 1.05)]
    #[case(2.5, 1.12)]
    #[case(4.0, 1.12)]
    #[case(4.1, 1.20)]
    #[case(20.0, 1.20)]
    fn test_rain_factor_steps(#[case] precip: f64, #[case] expected: f64) {
        assert_eq!(rain_rolling_resistance_factor(precip), expected);
    }

    #[rstest]
    #[case(25.0, 1.0)]
    #[case(10.0, 0.97)]
    #[case(-20.0, 0.88)]
    #[case(-100.0, 0.75)]
    #[case(40.0, 0.99)]
    fn test_capacity_factor(#[case] temp: f64, #[case] expected: f64) {
        assert!((battery_capacity_factor(temp) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(20.0, 1.0)]
    #[case(0.0, 1.10)]
    #[case(-20.0, 1.30)]
    #[case(-40.0, 1.35)]
    #[case(45.0, 1.03)]
    fn test_energy_multiplier(#[case] temp: f64, #[case] expected: f64) {
        assert!((battery_energy_multiplier(temp) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_environment_without_battery_model() {
        let env = EnvironmentParams::from_weather(-15.0, 2.0, false);
        assert_eq!(env.battery_capacity_factor, 1.0);
        assert_eq!(env.battery_energy_multiplier, 1.0);
        assert_eq!(env.rolling_resistance_factor, 1.12);
        assert!(env.is_raining());
    }

    proptest! {
        #[test]
        fn prop_capacity_factor_in_range(t in -80.0f64..80.0) {
            let f = battery_capacity_factor(t);
            prop_assert!((0.75..=1.0).contains(&f));
        }

        #[test]
        fn prop_capacity_factor_non_increasing_away_from_band(t in -60.0f64..60.0, d in 0.0f64..30.0) {
            if t <= 20.0 {
                prop_assert!(battery_capacity_factor(t - d) <= battery_capacity_factor(t));
            }
            if t >= 30.0 {
                prop_assert!(battery_capacity_factor(t + d) <= battery_capacity_factor(t));
            }
        }

        #[test]
        fn prop_energy_multiplier_in_range(t in -80.0f64..80.0) {
            let m = battery_energy_multiplier(t);
            prop_assert!((1.0..=1.35).contains(&m));
        }

        #[test]
        fn prop_rain_factor_monotonic(p1 in -5.0f64..30.0, p2 in -5.0f64..30.0) {
            let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
            prop_assert!(rain_rolling_resistance_factor(lo) <= rain_rolling_resistance_factor(hi));
        }
    }
}
