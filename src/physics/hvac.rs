use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Cabin heating technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HeatingType {
    /// PTC heater, electrical draw equals thermal output
    Resistive,
    /// Heat pump, electrical draw is thermal output divided by COP
    HeatPump,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvacParams {
    pub target_cabin_c: f64,
    pub deadband_c: f64,
    /// Thermal heating ceiling (kW_th)
    pub max_heat_kw: f64,
    /// Thermal cooling ceiling (kW_th)
    pub max_cool_kw: f64,
    /// Cabin size / insulation scaling
    pub cabin_factor: f64,
    pub heating_type: HeatingType,
    pub cop_heat: f64,
    pub cop_cool: f64,
}

impl Default for HvacParams {
    fn default() -> Self {
        Self {
            target_cabin_c: 21.0,
            deadband_c: 2.0,
            max_heat_kw: 5.0,
            max_cool_kw: 3.0,
            cabin_factor: 1.0,
            heating_type: HeatingType::HeatPump,
            cop_heat: 2.5,
            cop_cool: 2.5,
        }
    }
}

/// Electrical HVAC power (kW) for the given ambient temperature and intensity (0-100 %).
pub fn hvac_electric_power_kw(temp_c: f64, intensity_pct: f64, params: &HvacParams) -> f64 {
    let intensity = intensity_pct.min(100.0).max(0.0) / 100.0;
    if intensity <= 0.0 {
        return 0.0;
    }

    let heat_below = params.target_cabin_c - params.deadband_c;
    let cool_above = params.target_cabin_c + params.deadband_c;

    let p_elec = if temp_c < heat_below {
        let delta = heat_below - temp_c;
        let q_th = params.max_heat_kw.min(params.cabin_factor * 0.35 * delta);
        match params.heating_type {
            HeatingType::Resistive => q_th,
            HeatingType::HeatPump => q_th / params.cop_heat.max(1e-3),
        }
    } else if temp_c > cool_above {
        let delta = temp_c - cool_above;
        let q_th = params.max_cool_kw.min(params.cabin_factor * 0.25 * delta);
        q_th / params.cop_cool.max(1e-3)
    } else {
        // fans and electronics
        0.2 * params.cabin_factor
    };

    p_elec * intensity
}
