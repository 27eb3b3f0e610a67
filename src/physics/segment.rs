//! # Segment Energy Model
//!
//! Longitudinal road-load model for one straight leg driven at constant speed.
//!
//! F_aero  = ½ · ρ · CdA · v²
//! F_roll  = Crr · m · g · cos(atan(grade))
//! F_grade = m · g · sin(atan(grade))
//!
//! Positive wheel power is divided by the drivetrain efficiency; negative wheel power is
//! recovered at the regeneration efficiency. Auxiliary load is added on top and is never
//! regenerated. The resulting energy is scaled by the battery temperature multiplier.

use serde::{Deserialize, Serialize};

use super::EnvironmentParams;
use crate::domain::VehicleParams;

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Grade is clamped to ±50 %
const MAX_ABS_GRADE: f64 = 0.5;

/// Everything the energy model needs for one run, already combined with the environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Vehicle plus payload (kg)
    pub mass_kg: f64,
    pub cda_m2: f64,
    /// Crr with the rain factor applied
    pub crr: f64,
    pub air_density: f64,
    pub drivetrain_efficiency: f64,
    pub regen_efficiency: f64,
    /// Base auxiliary draw plus HVAC (kW)
    pub aux_power_kw: f64,
    /// Battery capacity after temperature derating (kWh)
    pub battery_kwh: f64,
    pub battery_energy_multiplier: f64,
}

impl SimulationParams {
    pub fn new(
        vehicle: &VehicleParams,
        env: &EnvironmentParams,
        payload_kg: f64,
        hvac_kw: f64,
    ) -> Self {
        Self {
            mass_kg: vehicle.mass_kg + payload_kg,
            cda_m2: vehicle.cda_m2,
            crr: vehicle.crr * env.rolling_resistance_factor,
            air_density: env.air_density,
            drivetrain_efficiency: vehicle.drivetrain_efficiency,
            regen_efficiency: vehicle.regen_efficiency,
            aux_power_kw: vehicle.aux_power_kw + hvac_kw,
            battery_kwh: vehicle.battery_kwh * env.battery_capacity_factor,
            battery_energy_multiplier: env.battery_energy_multiplier,
        }
    }

    pub fn aux_power_w(&self) -> f64 {
        self.aux_power_kw * 1000.0
    }
}

/// Energy and time for one leg
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentEnergy {
    pub energy_wh: f64,
    pub time_h: f64,
}

/// Mechanical power at the wheels (W) at constant speed on the given grade.
pub fn wheel_power_w(grade: f64, speed_ms: f64, params: &SimulationParams) -> f64 {
    let grade = grade.min(MAX_ABS_GRADE).max(-MAX_ABS_GRADE);
    let angle = grade.atan();

    let f_aero = 0.5 * params.air_density * params.cda_m2 * speed_ms * speed_ms;
    let f_roll = params.crr * params.mass_kg * GRAVITY * angle.cos();
    let f_grade = params.mass_kg * GRAVITY * angle.sin();

    (f_aero + f_roll + f_grade) * speed_ms
}

/// Battery-side electrical power (W) including the auxiliary load.
pub fn electrical_power_w(grade: f64, speed_ms: f64, params: &SimulationParams) -> f64 {
    let p_wheels = wheel_power_w(grade, speed_ms, params);

    let p_drive = if p_wheels >= 0.0 {
        p_wheels / params.drivetrain_efficiency.max(1e-6)
    } else {
        p_wheels * params.regen_efficiency
    };

    p_drive + params.aux_power_w()
}

/// Energy (Wh) and time (h) to cover `distance_m` at `speed_kmh` on `grade`.
///
/// Zero distance or non-positive speed is a valid no-op and yields zero.
pub fn segment_energy(
    distance_m: f64,
    grade: f64,
    speed_kmh: f64,
    params: &SimulationParams,
) -> SegmentEnergy {
    if distance_m <= 0.0 || speed_kmh <= 0.0 {
        return SegmentEnergy::default();
    }

    let v = speed_kmh.max(1e-3) * (1000.0 / 3600.0);
    let p_total = electrical_power_w(grade, v, params);

    let t_s = distance_m / v.max(1e-6);
    let energy_wh = p_total * (t_s / 3600.0) * params.battery_energy_multiplier;

    SegmentEnergy {
        energy_wh,
        time_h: t_s / 3600.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams {
            mass_kg: 1850.0,
            cda_m2: 0.58,
            crr: 0.008,
            air_density: 1.225,
            drivetrain_efficiency: 0.95,
            regen_efficiency: 0.85,
            aux_power_kw: 2.0,
            battery_kwh: 75.0,
            battery_energy_multiplier: 1.0,
        }
    }

    #[test]
    fn test_degenerate_inputs_return_zero() {
        let p = params();
        assert_eq!(segment_energy(0.0, 0.1, 90.0, &p), SegmentEnergy::default());
        assert_eq!(segment_energy(1000.0, 0.1, 0.0, &p), SegmentEnergy::default());
        assert_eq!(segment_energy(1000.0, 0.1, -20.0, &p), SegmentEnergy::default());
    }

    #[test]
    fn test_flat_energy_is_aero_roll_aux_only() {
        let p = params();
        let v: f64 = 90.0 / 3.6;
        let seg = segment_energy(10_000.0, 0.0, 90.0, &p);

        let f_aero = 0.5 * p.air_density * p.cda_m2 * v * v;
        let f_roll = p.crr * p.mass_kg * GRAVITY;
        let p_total = (f_aero + f_roll) * v / p.drivetrain_efficiency + p.aux_power_w();
        let t_h = 10_000.0 / v / 3600.0;

        assert!((seg.time_h - t_h).abs() < 1e-12);
        assert!((seg.energy_wh - p_total * t_h).abs() < 1e-6);
    }

    #[test]
    fn test_grade_is_clamped() {
        let p = params();
        let steep = segment_energy(1000.0, 3.0, 50.0, &p);
        let capped = segment_energy(1000.0, 0.5, 50.0, &p);
        assert_eq!(steep, capped);
    }

    #[test]
    fn test_regeneration_reduces_draw() {
        let p = params();
        let v = 60.0 / 3.6;
        let grade = -0.08;

        let p_wheels = wheel_power_w(grade, v, &p);
        assert!(p_wheels < 0.0);

        let p_elec = electrical_power_w(grade, v, &p);
        assert!(p_elec < p.aux_power_w());

        let recovered = p.aux_power_w() - p_elec;
        assert!(recovered <= p_wheels.abs() * p.regen_efficiency + 1e-9);
    }

    #[test]
    fn test_energy_multiplier_scales_energy() {
        let mut p = params();
        let base = segment_energy(5000.0, 0.02, 100.0, &p);
        p.battery_energy_multiplier = 1.2;
        let cold = segment_energy(5000.0, 0.02, 100.0, &p);
        assert!((cold.energy_wh - base.energy_wh * 1.2).abs() < 1e-6);
        assert_eq!(cold.time_h, base.time_h);
    }

    #[test]
    fn test_faster_costs_more_on_flat() {
        let p = params();
        let slow = segment_energy(10_000.0, 0.0, 80.0, &p);
        let fast = segment_energy(10_000.0, 0.0, 130.0, &p);
        assert!(fast.energy_wh > slow.energy_wh);
        assert!(fast.time_h < slow.time_h);
    }
}
