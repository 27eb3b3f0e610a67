use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::charging::SocWindow;
use crate::domain::{VehicleParams, VehicleProfile};
use crate::error::PlannerError;
use crate::optimizer::{default_candidate_speeds, parse_candidate_speeds, Objective, OptimizerSettings};
use crate::physics::{HeatingType, HvacParams};
use crate::report::CostSettings;

pub const CONFIG_FILE: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "EVSPEED__";
pub const ORS_KEY_ENV: &str = "OPENROUTESERVICE_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub trip: TripConfig,
    pub vehicle: VehicleConfig,
    pub hvac: HvacConfig,
    pub weather: WeatherConfig,
    pub optimizer: OptimizerConfig,
    pub costs: CostSettings,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct TripConfig {
    pub origin: String,
    pub destination: String,
    /// Driver included
    #[validate(range(max = 7))]
    pub passengers: u32,
    #[validate(range(min = 0.0))]
    pub avg_passenger_weight_kg: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub start_soc_pct: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub end_soc_pct: f64,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            origin: "Paris, France".to_string(),
            destination: "Lyon, France".to_string(),
            passengers: 1,
            avg_passenger_weight_kg: 75.0,
            start_soc_pct: 100.0,
            end_soc_pct: 20.0,
        }
    }
}

/// Preset plus optional per-field overrides
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub profile: VehicleProfile,
    pub mass_kg: Option<f64>,
    pub cda_m2: Option<f64>,
    pub crr: Option<f64>,
    pub drivetrain_efficiency: Option<f64>,
    pub regen_efficiency: Option<f64>,
    pub aux_power_kw: Option<f64>,
    pub battery_kwh: Option<f64>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            profile: VehicleProfile::Custom,
            mass_kg: None,
            cda_m2: None,
            crr: None,
            drivetrain_efficiency: None,
            regen_efficiency: None,
            aux_power_kw: None,
            battery_kwh: None,
        }
    }
}

impl VehicleConfig {
    pub fn params(&self) -> VehicleParams {
        let base = self.profile.params();
        VehicleParams {
            mass_kg: self.mass_kg.unwrap_or(base.mass_kg),
            cda_m2: self.cda_m2.unwrap_or(base.cda_m2),
            crr: self.crr.unwrap_or(base.crr),
            drivetrain_efficiency: self.drivetrain_efficiency.unwrap_or(base.drivetrain_efficiency),
            regen_efficiency: self.regen_efficiency.unwrap_or(base.regen_efficiency),
            aux_power_kw: self.aux_power_kw.unwrap_or(base.aux_power_kw),
            battery_kwh: self.battery_kwh.unwrap_or(base.battery_kwh),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct HvacConfig {
    pub enabled: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub intensity_pct: f64,
    pub target_cabin_c: Option<f64>,
    pub deadband_c: Option<f64>,
    pub max_heat_kw: Option<f64>,
    pub max_cool_kw: Option<f64>,
    pub cabin_factor: Option<f64>,
    pub heating_type: Option<HeatingType>,
    pub cop_heat: Option<f64>,
    pub cop_cool: Option<f64>,
}

impl Default for HvacConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            intensity_pct: 50.0,
            target_cabin_c: None,
            deadband_c: None,
            max_heat_kw: None,
            max_cool_kw: None,
            cabin_factor: None,
            heating_type: None,
            cop_heat: None,
            cop_cool: None,
        }
    }
}

impl HvacConfig {
    /// Preset HVAC parameters of `profile` with the configured overrides applied.
    pub fn params(&self, profile: VehicleProfile) -> HvacParams {
        let base = profile.hvac();
        HvacParams {
            target_cabin_c: self.target_cabin_c.unwrap_or(base.target_cabin_c),
            deadband_c: self.deadband_c.unwrap_or(base.deadband_c),
            max_heat_kw: self.max_heat_kw.unwrap_or(base.max_heat_kw),
            max_cool_kw: self.max_cool_kw.unwrap_or(base.max_cool_kw),
            cabin_factor: self.cabin_factor.unwrap_or(base.cabin_factor),
            heating_type: self.heating_type.unwrap_or(base.heating_type),
            cop_heat: self.cop_heat.unwrap_or(base.cop_heat),
            cop_cool: self.cop_cool.unwrap_or(base.cop_cool),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Fetch live weather at the route midpoint, manual values are the fallback
    pub use_live: bool,
    pub temperature_c: f64,
    pub precipitation_mm_per_h: f64,
    pub model_battery_temp: bool,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            use_live: false,
            temperature_c: 15.0,
            precipitation_mm_per_h: 0.0,
            model_battery_temp: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Comma-separated candidate speeds (km/h), the 50..130 grid when unset
    pub candidate_speeds: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub user_max_kmh: f64,
    #[validate(range(min = 0.0))]
    pub max_time_penalty_pct: f64,
    pub objective: Objective,
    #[validate(range(min = 0.0))]
    pub lambda: f64,
    pub segmented_speeds: bool,
    #[validate(range(min = 0.0))]
    pub min_speed_delta_kmh: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let defaults = OptimizerSettings::default();
        Self {
            candidate_speeds: None,
            user_max_kmh: defaults.user_max_kmh,
            max_time_penalty_pct: defaults.max_time_penalty_pct,
            objective: defaults.objective,
            lambda: defaults.lambda,
            segmented_speeds: defaults.segmented_speeds,
            min_speed_delta_kmh: defaults.min_speed_delta_kmh,
        }
    }
}

impl OptimizerConfig {
    pub fn settings(&self) -> OptimizerSettings {
        let candidate_speeds_kmh = match self.candidate_speeds.as_deref() {
            Some(list) => parse_candidate_speeds(list),
            None => default_candidate_speeds(),
        };
        OptimizerSettings {
            candidate_speeds_kmh,
            user_max_kmh: self.user_max_kmh,
            max_time_penalty_pct: self.max_time_penalty_pct,
            objective: self.objective,
            lambda: self.lambda,
            segmented_speeds: self.segmented_speeds,
            min_speed_delta_kmh: self.min_speed_delta_kmh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// OpenRouteService key, also read from `OPENROUTESERVICE_API_KEY`
    #[serde(skip_serializing)]
    pub ors_api_key: Option<String>,
    pub ors_base_url: String,
    pub osrm_base_url: String,
    pub open_meteo_base_url: String,
    pub http_timeout_seconds: u64,
    pub weather_timeout_seconds: u64,
    pub use_elevation: bool,
    /// Fetch turn-by-turn steps for segmented speeds and intersection analysis
    pub detailed_route: bool,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ors_api_key: None,
            ors_base_url: "https://api.openrouteservice.org".to_string(),
            osrm_base_url: "https://router.project-osrm.org".to_string(),
            open_meteo_base_url: "https://api.open-meteo.com".to_string(),
            http_timeout_seconds: 60,
            weather_timeout_seconds: 20,
            use_elevation: true,
            detailed_route: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// Defaults file, then `EVSPEED__SECTION__KEY` variables, then the bare ORS key variable.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&[ORS_KEY_ENV])
                    .map(|_| "providers.ors_api_key".into()),
            )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    /// Resolve presets and overrides into the immutable per-run configuration.
    pub fn into_run(self) -> Result<RunConfiguration, PlannerError> {
        self.trip.validate()?;
        self.hvac.validate()?;
        self.optimizer.validate()?;

        let vehicle = self.vehicle.params();
        vehicle.check()?;

        Ok(RunConfiguration {
            origin: self.trip.origin,
            destination: self.trip.destination,
            vehicle_profile: self.vehicle.profile,
            vehicle,
            hvac: self.hvac.params(self.vehicle.profile),
            hvac_enabled: self.hvac.enabled,
            hvac_intensity_pct: self.hvac.intensity_pct,
            passengers: self.trip.passengers,
            payload_kg: self.trip.passengers as f64 * self.trip.avg_passenger_weight_kg,
            soc: SocWindow {
                start_pct: self.trip.start_soc_pct,
                end_pct: self.trip.end_soc_pct,
            },
            weather: self.weather,
            optimizer: self.optimizer.settings(),
            costs: self.costs,
            providers: self.providers,
        })
    }
}

/// Everything one planning run needs, assembled once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    pub origin: String,
    pub destination: String,
    pub vehicle_profile: VehicleProfile,
    pub vehicle: VehicleParams,
    pub hvac: HvacParams,
    pub hvac_enabled: bool,
    pub hvac_intensity_pct: f64,
    pub passengers: u32,
    /// Passengers × average weight (kg)
    pub payload_kg: f64,
    pub soc: SocWindow,
    pub weather: WeatherConfig,
    pub optimizer: OptimizerSettings,
    pub costs: CostSettings,
    pub providers: ProvidersConfig,
}
