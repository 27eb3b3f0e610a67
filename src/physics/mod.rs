//! # Vehicle & Environment Physics
//!
//! Pure functions shared by the route simulator.
//!
//! - **Environment**: air density, rain rolling-resistance factor, battery temperature effects
//! - **HVAC**: electrical climate-control draw from ambient temperature and intensity
//! - **Segment**: energy and time for one straight leg at constant speed

pub mod environment;
pub mod hvac;
pub mod segment;

pub use environment::{
    air_density, battery_capacity_factor, battery_energy_multiplier,
    rain_rolling_resistance_factor, EnvironmentParams, STANDARD_PRESSURE_PA,
};
pub use hvac::{hvac_electric_power_kw, HeatingType, HvacParams};
pub use segment::{segment_energy, SegmentEnergy, SimulationParams, GRAVITY};
