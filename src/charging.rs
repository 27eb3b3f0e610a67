//! Charging stop planning from trip energy and battery state of charge.

use serde::{Deserialize, Serialize};

/// Stop count reported when the usable battery is non-positive
pub const INFEASIBLE_STOPS: u32 = 999;

/// Share of capacity never used (safety margin)
const SAFETY_MARGIN_SHARE: f64 = 0.10;

/// Average duration of one charging stop (minutes)
pub const CHARGING_STOP_DURATION_MIN: f64 = 20.0;

/// Departure and arrival state of charge (%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocWindow {
    pub start_pct: f64,
    pub end_pct: f64,
}

impl Default for SocWindow {
    fn default() -> Self {
        Self {
            start_pct: 100.0,
            end_pct: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargingPlan {
    /// Required stops, `INFEASIBLE_STOPS` when the battery has no usable capacity
    pub num_stops: u32,
    /// Capacity minus the safety margin (kWh)
    pub usable_battery_kwh: f64,
    /// Energy driven between stops (kWh)
    pub energy_per_leg_kwh: f64,
}

impl ChargingPlan {
    pub fn is_feasible(&self) -> bool {
        self.usable_battery_kwh > 0.0
    }

    pub fn charging_time_min(&self) -> f64 {
        self.num_stops as f64 * CHARGING_STOP_DURATION_MIN
    }
}

/// Number of charging stops needed to cover `energy_needed_kwh`.
pub fn plan_charging(battery_kwh: f64, energy_needed_kwh: f64, soc: &SocWindow) -> ChargingPlan {
    let start_kwh = battery_kwh * (soc.start_pct / 100.0);
    let target_end_kwh = battery_kwh * (soc.end_pct / 100.0);
    let safety_margin = battery_kwh * SAFETY_MARGIN_SHARE;
    let usable = battery_kwh - safety_margin;

    if usable <= 0.0 {
        return ChargingPlan {
            num_stops: INFEASIBLE_STOPS,
            usable_battery_kwh: 0.0,
            energy_per_leg_kwh: usable,
        };
    }

    let available = start_kwh - safety_margin.max(target_end_kwh);
    if energy_needed_kwh <= available {
        return ChargingPlan {
            num_stops: 0,
            usable_battery_kwh: usable,
            energy_per_leg_kwh: usable,
        };
    }

    let remaining = energy_needed_kwh - available;
    let stops = (remaining / usable).ceil().max(0.0);

    ChargingPlan {
        num_stops: stops as u32,
        usable_battery_kwh: usable,
        energy_per_leg_kwh: usable,
    }
}
