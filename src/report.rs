//! # Trip Report
//!
//! Derived display metrics for a finished optimization.
//!
//! - **Costs**: trip cost from the electricity price, CO₂ from the grid intensity
//! - **Battery outlook**: charge at departure and on arrival
//! - **Comparison**: one row per candidate speed, sorted by speed
//! - **Advisories**: charging and battery warnings for the chosen speed

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::optimizer::{CandidateResult, Objective, OptimizationOutcome, SkippedCandidate};
use crate::routing::IntersectionReport;
use crate::simulation::RouteRelief;

/// Stop count from which a trip is flagged as challenging
const CHALLENGING_TRIP_STOPS: u32 = 10;

const VERY_LOW_ARRIVAL_PCT: f64 = 20.0;
const MODERATE_ARRIVAL_PCT: f64 = 50.0;

/// Share of the battery above which consumption is flagged as high
const HIGH_CONSUMPTION_SHARE: f64 = 0.8;

/// Electricity grid carbon intensity presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GridPreset {
    /// Low-carbon mix, ~50 g/kWh
    France,
    /// ~250 g/kWh
    EuAverage,
    /// ~475 g/kWh
    WorldAverage,
    /// ~800 g/kWh
    CoalHeavy,
    /// User supplied value
    Custom,
}

impl GridPreset {
    pub fn g_per_kwh(&self) -> Option<f64> {
        match self {
            GridPreset::France => Some(50.0),
            GridPreset::EuAverage => Some(250.0),
            GridPreset::WorldAverage => Some(475.0),
            GridPreset::CoalHeavy => Some(800.0),
            GridPreset::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSettings {
    /// Electricity price (€/kWh)
    pub price_per_kwh: f64,
    pub grid_preset: GridPreset,
    /// Used when the preset is `Custom` (gCO₂/kWh)
    pub custom_grid_g_per_kwh: f64,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            price_per_kwh: 0.20,
            grid_preset: GridPreset::EuAverage,
            custom_grid_g_per_kwh: 250.0,
        }
    }
}

impl CostSettings {
    pub fn grid_g_per_kwh(&self) -> f64 {
        self.grid_preset.g_per_kwh().unwrap_or(self.custom_grid_g_per_kwh)
    }

    pub fn cost(&self, energy_kwh: f64) -> f64 {
        energy_kwh * self.price_per_kwh
    }

    /// Trip CO₂ in kg
    pub fn co2_kg(&self, energy_kwh: f64) -> f64 {
        energy_kwh * self.grid_g_per_kwh() / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Charging and battery warnings attached to the chosen speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    NoChargingNeeded,
    ChargesRecommended { stops: u32 },
    ChallengingTrip { stops: u32 },
    VeryLowBattery { arrival_pct: f64 },
    ModerateBattery { arrival_pct: f64 },
    ExceedsBattery,
    HighConsumption,
}

impl Advisory {
    pub fn severity(&self) -> Severity {
        match self {
            Advisory::NoChargingNeeded => Severity::Info,
            Advisory::ChargesRecommended { .. }
            | Advisory::ModerateBattery { .. }
            | Advisory::HighConsumption => Severity::Warning,
            Advisory::ChallengingTrip { .. }
            | Advisory::VeryLowBattery { .. }
            | Advisory::ExceedsBattery => Severity::Critical,
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NoChargingNeeded => write!(f, "No charging needed, the battery covers this trip"),
            Advisory::ChargesRecommended { stops } => {
                write!(f, "{stops} charge(s) recommended for this trip")
            }
            Advisory::ChallengingTrip { stops } => {
                write!(f, "Challenging trip: consumption is very high ({stops} estimated charges)")
            }
            Advisory::VeryLowBattery { arrival_pct } => write!(
                f,
                "Very low battery on arrival ({arrival_pct:.1}%), consider charging before departure"
            ),
            Advisory::ModerateBattery { arrival_pct } => write!(
                f,
                "Moderate battery level on arrival ({arrival_pct:.1}%), monitor your consumption"
            ),
            Advisory::ExceedsBattery => {
                write!(f, "Consumption exceeds battery capacity, trip is not feasible")
            }
            Advisory::HighConsumption => write!(f, "High consumption, trip is possible but risky"),
        }
    }
}

/// Advisories for a trip needing `energy_kwh` out of `battery_kwh`.
pub fn advisories(stops: u32, arrival_pct: f64, energy_kwh: f64, battery_kwh: f64) -> Vec<Advisory> {
    let mut out = Vec::new();

    out.push(match stops {
        0 => Advisory::NoChargingNeeded,
        s if s < CHALLENGING_TRIP_STOPS => Advisory::ChargesRecommended { stops: s },
        s => Advisory::ChallengingTrip { stops: s },
    });

    if arrival_pct < VERY_LOW_ARRIVAL_PCT {
        out.push(Advisory::VeryLowBattery { arrival_pct });
    } else if arrival_pct < MODERATE_ARRIVAL_PCT {
        out.push(Advisory::ModerateBattery { arrival_pct });
    }

    if energy_kwh > battery_kwh {
        out.push(Advisory::ExceedsBattery);
    } else if energy_kwh > battery_kwh * HIGH_CONSUMPTION_SHARE {
        out.push(Advisory::HighConsumption);
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryOutlook {
    pub start_pct: f64,
    pub start_kwh: f64,
    /// May be negative when the trip needs charging stops
    pub after_trip_kwh: f64,
    pub after_trip_pct: f64,
}

impl BatteryOutlook {
    pub fn new(battery_kwh: f64, start_pct: f64, energy_kwh: f64) -> Self {
        let start_kwh = battery_kwh * start_pct / 100.0;
        let after_trip_kwh = start_kwh - energy_kwh;
        let after_trip_pct = if battery_kwh > 0.0 {
            after_trip_kwh / battery_kwh * 100.0
        } else {
            0.0
        };
        Self {
            start_pct,
            start_kwh,
            after_trip_kwh,
            after_trip_pct,
        }
    }
}

/// Chosen speed against the fastest candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FastestComparison {
    /// Negative when energy is saved
    pub energy_delta_kwh: f64,
    pub time_delta_min: f64,
    pub co2_delta_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub speed_kmh: f64,
    pub energy_kwh: f64,
    pub cost: f64,
    pub co2_kg: f64,
    pub driving_time_min: f64,
    pub charging_time_min: f64,
    pub total_time_min: f64,
    pub charges: u32,
    /// Inside the time window
    pub feasible: bool,
}

/// Context the optimizer outcome alone does not carry
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInputs {
    /// Effective battery capacity (kWh)
    pub battery_kwh: f64,
    pub start_soc_pct: f64,
    pub costs: CostSettings,
    pub hvac_kw: f64,
    pub rain_factor: f64,
    pub relief: RouteRelief,
    pub intersections: usize,
    pub slowdown_points: usize,
}

impl ReportInputs {
    pub fn with_intersections(mut self, report: &IntersectionReport) -> Self {
        self.intersections = report.intersections.len();
        self.slowdown_points = report.slowdown_points.len();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripReport {
    pub objective: Objective,
    pub best: CandidateResult,
    pub fastest: CandidateResult,
    pub time_window_min: Option<f64>,
    pub cost: f64,
    pub co2_kg: f64,
    pub grid_g_per_kwh: f64,
    pub battery: BatteryOutlook,
    pub consumption_kwh_per_km: f64,
    pub vs_fastest: FastestComparison,
    pub intersections: usize,
    pub slowdown_points: usize,
    pub hvac_kw: f64,
    pub rain_factor: f64,
    pub relief: RouteRelief,
    pub comparison: Vec<ComparisonRow>,
    pub skipped: Vec<SkippedCandidate>,
    pub advisories: Vec<Advisory>,
}

impl TripReport {
    pub fn build(outcome: &OptimizationOutcome, inputs: &ReportInputs) -> Self {
        let best = outcome.best().clone();
        let fastest = outcome.fastest().clone();
        let costs = &inputs.costs;

        let battery = BatteryOutlook::new(inputs.battery_kwh, inputs.start_soc_pct, best.energy_kwh);
        let consumption_kwh_per_km = if best.distance_km > 0.0 {
            best.energy_kwh / best.distance_km
        } else {
            0.0
        };

        let vs_fastest = FastestComparison {
            energy_delta_kwh: (best.energy_wh - fastest.energy_wh) / 1000.0,
            time_delta_min: best.total_time_min - fastest.total_time_min,
            co2_delta_kg: costs.co2_kg(best.energy_kwh) - costs.co2_kg(fastest.energy_kwh),
        };

        let mut comparison: Vec<ComparisonRow> = outcome
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| ComparisonRow {
                speed_kmh: r.speed_kmh,
                energy_kwh: r.energy_kwh,
                cost: costs.cost(r.energy_kwh),
                co2_kg: costs.co2_kg(r.energy_kwh),
                driving_time_min: r.driving_time_min(),
                charging_time_min: r.charging_time_min,
                total_time_min: r.total_time_min,
                charges: r.charging.num_stops,
                feasible: outcome.feasible.contains(&i),
            })
            .collect();
        comparison.sort_by_key(|row| OrderedFloat(row.speed_kmh));

        let advisories = advisories(
            best.charging.num_stops,
            battery.after_trip_pct,
            best.energy_kwh,
            inputs.battery_kwh,
        );

        Self {
            objective: outcome.objective,
            cost: costs.cost(best.energy_kwh),
            co2_kg: costs.co2_kg(best.energy_kwh),
            grid_g_per_kwh: costs.grid_g_per_kwh(),
            time_window_min: outcome.time_window_min,
            battery,
            consumption_kwh_per_km,
            vs_fastest,
            intersections: inputs.intersections,
            slowdown_points: inputs.slowdown_points,
            hvac_kw: inputs.hvac_kw,
            rain_factor: inputs.rain_factor,
            relief: inputs.relief,
            comparison,
            skipped: outcome.skipped.clone(),
            advisories,
            best,
            fastest,
        }
    }
}
