use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

/// Legs shorter than this (m) are ignored for slope statistics
const MIN_SLOPE_LEG_M: f64 = 1e-3;

/// Terrain summary of a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRelief {
    /// Total ascent (m)
    pub ascent_m: f64,
    /// Total descent (m), positive
    pub descent_m: f64,
    pub max_abs_slope_pct: f64,
    /// Distance-weighted mean absolute slope
    pub mean_abs_slope_pct: f64,
}

impl RouteRelief {
    pub fn from_profile(points: &[GeoPoint], elevations: &[f64]) -> Self {
        let mut relief = RouteRelief::default();
        let mut slope_distance_m = 0.0;
        let mut abs_rise_m = 0.0;

        let n = points.len().min(elevations.len());
        for i in 1..n {
            let dh = elevations[i] - elevations[i - 1];
            if dh > 0.0 {
                relief.ascent_m += dh;
            } else {
                relief.descent_m -= dh;
            }

            let d = points[i - 1].distance_m(&points[i]);
            if d > MIN_SLOPE_LEG_M {
                relief.max_abs_slope_pct = relief.max_abs_slope_pct.max((dh / d).abs() * 100.0);
                slope_distance_m += d;
                abs_rise_m += dh.abs();
            }
        }

        if slope_distance_m > 0.0 {
            relief.mean_abs_slope_pct = abs_rise_m / slope_distance_m * 100.0;
        }
        relief
    }
}
