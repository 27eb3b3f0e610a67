use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

use crate::error::PlannerError;
use crate::physics::{HeatingType, HvacParams};

/// Immutable vehicle description for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VehicleParams {
    /// Curb mass (kg), payload is added separately
    #[validate(range(exclusive_min = 0.0))]
    pub mass_kg: f64,

    /// Drag coefficient × frontal area (m²)
    #[validate(range(exclusive_min = 0.0))]
    pub cda_m2: f64,

    /// Rolling-resistance coefficient
    #[validate(range(min = 0.0))]
    pub crr: f64,

    /// Motor + inverter + gearbox efficiency, (0, 1]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub drivetrain_efficiency: f64,

    /// Share of negative wheel power recovered
    #[validate(range(min = 0.0, max = 1.0))]
    pub regen_efficiency: f64,

    /// Base auxiliary draw (kW), HVAC excluded
    #[validate(range(min = 0.0))]
    pub aux_power_kw: f64,

    /// Nominal battery capacity (kWh)
    #[validate(range(exclusive_min = 0.0))]
    pub battery_kwh: f64,
}

impl VehicleParams {
    /// Reject configurations the simulator cannot run.
    pub fn check(&self) -> Result<(), PlannerError> {
        if ![
            self.mass_kg,
            self.cda_m2,
            self.crr,
            self.drivetrain_efficiency,
            self.regen_efficiency,
            self.aux_power_kw,
            self.battery_kwh,
        ]
        .iter()
        .all(|v| v.is_finite())
        {
            return Err(PlannerError::InvalidConfig(
                "vehicle parameters must be finite".to_string(),
            ));
        }
        self.validate()?;
        Ok(())
    }
}

impl Default for VehicleParams {
    fn default() -> Self {
        VehicleProfile::Custom.params()
    }
}

/// Built-in vehicle presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VehicleProfile {
    TeslaModel3,
    TeslaModelY,
    AudiQ4Etron,
    BmwIx3,
    MercedesEqc,
    VolkswagenId4,
    RenaultZoe,
    BmwI3,
    NissanLeaf,
    HyundaiIoniq5,
    KiaEv6,
    Custom,
}

impl VehicleProfile {
    pub fn display_name(&self) -> &'static str {
        match self {
            VehicleProfile::TeslaModel3 => "Tesla Model 3",
            VehicleProfile::TeslaModelY => "Tesla Model Y",
            VehicleProfile::AudiQ4Etron => "Audi Q4 e-tron",
            VehicleProfile::BmwIx3 => "BMW iX3",
            VehicleProfile::MercedesEqc => "Mercedes EQC",
            VehicleProfile::VolkswagenId4 => "Volkswagen ID.4",
            VehicleProfile::RenaultZoe => "Renault Zoe",
            VehicleProfile::BmwI3 => "BMW i3",
            VehicleProfile::NissanLeaf => "Nissan Leaf",
            VehicleProfile::HyundaiIoniq5 => "Hyundai IONIQ 5",
            VehicleProfile::KiaEv6 => "Kia EV6",
            VehicleProfile::Custom => "Custom",
        }
    }

    pub fn params(&self) -> VehicleParams {
        // (mass, CdA, Crr, eta, regen, aux kW, battery kWh)
        let (mass_kg, cda_m2, crr, eta, regen, aux, battery) = match self {
            VehicleProfile::TeslaModel3 => (1850.0, 0.58, 0.008, 0.95, 0.85, 2.0, 75.0),
            VehicleProfile::TeslaModelY => (2000.0, 0.62, 0.008, 0.95, 0.85, 2.2, 75.0),
            VehicleProfile::AudiQ4Etron => (2100.0, 0.70, 0.009, 0.92, 0.80, 2.5, 82.0),
            VehicleProfile::BmwIx3 => (2180.0, 0.68, 0.009, 0.93, 0.82, 2.3, 80.0),
            VehicleProfile::MercedesEqc => (2425.0, 0.72, 0.010, 0.91, 0.78, 2.8, 80.0),
            VehicleProfile::VolkswagenId4 => (2120.0, 0.66, 0.009, 0.90, 0.75, 2.0, 77.0),
            VehicleProfile::RenaultZoe => (1500.0, 0.65, 0.010, 0.90, 0.70, 1.5, 52.0),
            VehicleProfile::BmwI3 => (1200.0, 0.50, 0.008, 0.92, 0.80, 1.8, 42.0),
            VehicleProfile::NissanLeaf => (1600.0, 0.68, 0.010, 0.88, 0.75, 1.7, 40.0),
            VehicleProfile::HyundaiIoniq5 => (1950.0, 0.64, 0.008, 0.94, 0.83, 2.1, 73.0),
            VehicleProfile::KiaEv6 => (1980.0, 0.63, 0.008, 0.94, 0.83, 2.1, 77.0),
            VehicleProfile::Custom => (1900.0, 0.62, 0.010, 0.90, 0.60, 2.0, 60.0),
        };

        VehicleParams {
            mass_kg,
            cda_m2,
            crr,
            drivetrain_efficiency: eta,
            regen_efficiency: regen,
            aux_power_kw: aux,
            battery_kwh: battery,
        }
    }

    pub fn hvac(&self) -> HvacParams {
        use HeatingType::{HeatPump, Resistive};

        // (heating, max heat, max cool, cabin factor, COP heat, COP cool)
        let (heating_type, max_heat_kw, max_cool_kw, cabin_factor, cop_heat, cop_cool) = match self {
            VehicleProfile::TeslaModel3 => (HeatPump, 5.0, 3.0, 1.00, 2.8, 2.6),
            VehicleProfile::TeslaModelY => (HeatPump, 5.5, 3.2, 1.15, 2.8, 2.6),
            VehicleProfile::AudiQ4Etron => (HeatPump, 5.5, 3.2, 1.15, 2.6, 2.5),
            VehicleProfile::BmwIx3 => (HeatPump, 5.8, 3.3, 1.18, 2.6, 2.5),
            VehicleProfile::MercedesEqc => (HeatPump, 6.0, 3.5, 1.25, 2.4, 2.4),
            VehicleProfile::VolkswagenId4 => (HeatPump, 5.5, 3.2, 1.15, 2.5, 2.4),
            VehicleProfile::RenaultZoe => (HeatPump, 4.0, 2.5, 0.85, 2.4, 2.4),
            VehicleProfile::BmwI3 => (Resistive, 4.0, 2.2, 0.80, 1.0, 2.3),
            VehicleProfile::NissanLeaf => (Resistive, 4.5, 2.5, 0.90, 1.0, 2.3),
            VehicleProfile::HyundaiIoniq5 => (HeatPump, 5.5, 3.2, 1.10, 2.6, 2.5),
            VehicleProfile::KiaEv6 => (HeatPump, 5.5, 3.2, 1.10, 2.6, 2.5),
            VehicleProfile::Custom => (HeatPump, 5.0, 3.0, 1.00, 2.5, 2.5),
        };

        HvacParams {
            heating_type,
            max_heat_kw,
            max_cool_kw,
            cabin_factor,
            cop_heat,
            cop_cool,
            ..Default::default()
        }
    }
}
