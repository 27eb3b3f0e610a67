use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;
use crate::error::PlannerError;
use crate::physics::{segment_energy, SimulationParams};
use crate::routing::SpeedProfile;

/// Legs shorter than this (m) are skipped
const DEGENERATE_LEG_M: f64 = 1e-2;

/// Accumulated totals for one simulated route
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTotals {
    pub energy_wh: f64,
    pub time_h: f64,
    pub distance_km: f64,
}

/// Walk every leg of the route and accumulate energy, time and distance.
///
/// `elevations` must hold one sample per point. A per-leg `profile` whose length does not
/// match the leg count is applied as a uniform speed (its first entry).
pub fn simulate_route(
    points: &[GeoPoint],
    elevations: &[f64],
    profile: &SpeedProfile,
    params: &SimulationParams,
) -> Result<RouteTotals, PlannerError> {
    let leg_count = points.len().saturating_sub(1);
    let profile = profile.clone().resolve(leg_count);
    let fail = |reason: String| PlannerError::simulation(profile.mean_kmh(), reason);

    if elevations.len() != points.len() {
        return Err(fail(format!(
            "{} elevation samples for {} points",
            elevations.len(),
            points.len()
        )));
    }

    let mut total_wh = 0.0;
    let mut total_h = 0.0;
    let mut total_m = 0.0;

    for i in 1..points.len() {
        let d = points[i - 1].distance_m(&points[i]);
        if d < DEGENERATE_LEG_M {
            continue;
        }

        let grade = (elevations[i] - elevations[i - 1]) / d.max(1e-6);
        let speed = profile.speed_for_leg(i - 1);
        if !speed.is_finite() {
            return Err(fail(format!("non-finite speed on leg {}", i - 1)));
        }

        let seg = segment_energy(d, grade, speed, params);
        total_wh += seg.energy_wh;
        total_h += seg.time_h;
        total_m += d;
    }

    if !total_wh.is_finite() || !total_h.is_finite() {
        return Err(fail("non-finite route totals".to_string()));
    }

    Ok(RouteTotals {
        energy_wh: total_wh,
        time_h: total_h,
        distance_km: total_m / 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{segment::wheel_power_w, GRAVITY};

    fn params() -> SimulationParams {
        SimulationParams {
            mass_kg: 1900.0,
            cda_m2: 0.62,
            crr: 0.010,
            air_density: 1.225,
            drivetrain_efficiency: 0.90,
            regen_efficiency: 0.60,
            aux_power_kw: 2.0,
            battery_kwh: 60.0,
            battery_energy_multiplier: 1.0,
        }
    }

    fn line(n: usize) -> Vec<GeoPoint> {
        (0..n).map(|i| GeoPoint::new(2.0 + i as f64 * 0.01, 48.0)).collect()
    }

    #[test]
    fn test_flat_route_has_no_grade_contribution() {
        let pts = line(6);
        let elev = vec![0.0; 6];
        let p = params();
        let totals = simulate_route(&pts, &elev, &SpeedProfile::Uniform(90.0), &p).unwrap();

        // Grade force vanishes exactly: wheel power equals aero + rolling
        let v = 90.0 * (1000.0 / 3600.0);
        let expected_wheels = (0.5 * p.air_density * p.cda_m2 * v * v + p.crr * p.mass_kg * GRAVITY) * v;
        assert_eq!(wheel_power_w(0.0, v, &p), expected_wheels);

        let p_total = expected_wheels / p.drivetrain_efficiency + p.aux_power_w();
        assert!((totals.energy_wh - p_total * totals.time_h).abs() < 1e-6);
        assert!((totals.distance_km - totals.time_h * 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_elevation_matches_zero_elevation() {
        let pts = line(4);
        let p = params();
        let sea = simulate_route(&pts, &[0.0; 4], &SpeedProfile::Uniform(80.0), &p).unwrap();
        let plateau = simulate_route(&pts, &[850.0; 4], &SpeedProfile::Uniform(80.0), &p).unwrap();
        assert_eq!(sea, plateau);
    }

    #[test]
    fn test_descent_uses_less_energy_than_climb() {
        let pts = line(3);
        let p = params();
        let up = simulate_route(&pts, &[0.0, 50.0, 100.0], &SpeedProfile::Uniform(70.0), &p).unwrap();
        let down = simulate_route(&pts, &[100.0, 50.0, 0.0], &SpeedProfile::Uniform(70.0), &p).unwrap();
        assert!(down.energy_wh < up.energy_wh);
        assert_eq!(down.time_h, up.time_h);
    }

    #[test]
    fn test_degenerate_legs_are_skipped() {
        let mut pts = line(3);
        pts.insert(1, pts[0]);
        let p = params();
        let with_dup = simulate_route(&pts, &[0.0; 4], &SpeedProfile::PerLeg(vec![90.0; 3]), &p).unwrap();
        let clean = simulate_route(&line(3), &[0.0; 3], &SpeedProfile::Uniform(90.0), &p).unwrap();
        assert!((with_dup.energy_wh - clean.energy_wh).abs() < 1e-9);
        assert_eq!(with_dup.distance_km, clean.distance_km);
    }

    #[test]
    fn test_mismatched_profile_uses_first_speed() {
        let pts = line(5);
        let p = params();
        let bad = simulate_route(&pts, &[0.0; 5], &SpeedProfile::PerLeg(vec![60.0, 120.0]), &p).unwrap();
        let uniform = simulate_route(&pts, &[0.0; 5], &SpeedProfile::Uniform(60.0), &p).unwrap();
        assert_eq!(bad, uniform);
    }

    #[test]
    fn test_elevation_length_mismatch_fails() {
        let pts = line(3);
        let err = simulate_route(&pts, &[0.0; 2], &SpeedProfile::Uniform(90.0), &params());
        assert!(matches!(err, Err(PlannerError::Simulation { .. })));
    }

    #[test]
    fn test_nan_speed_fails() {
        let pts = line(3);
        let err = simulate_route(&pts, &[0.0; 3], &SpeedProfile::PerLeg(vec![90.0, f64::NAN]), &params());
        assert!(err.is_err());
    }
}
