//! Per-leg speed assignment.
//!
//! Route polyline vertices and routing-service sections come from different sampling
//! resolutions, so legs are matched to sections by proportional cumulative distance: the
//! polyline's cumulative distance is rescaled to the sections' total and each leg takes the
//! section containing its midpoint. When the two sources describe different geometries the
//! match degrades silently.

use serde::{Deserialize, Serialize};

use super::{speed_limit_for_road_type, SlowdownPoint};
use crate::domain::{cumulative_distances_m, GeoPoint, RoadSection, RoadStep, RouteData};

/// Nothing is ever assigned below this (km/h)
pub const MIN_ASSIGNED_SPEED_KMH: f64 = 30.0;

/// Speed used when a per-leg list is empty
const EMPTY_PROFILE_SPEED_KMH: f64 = 50.0;

/// Speed factor applied on the leg nearest a slow-down point
const SLOWDOWN_FACTOR: f64 = 0.7;

/// Cruising speed for a candidate: uniform or one entry per leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedProfile {
    Uniform(f64),
    PerLeg(Vec<f64>),
}

impl SpeedProfile {
    /// A per-leg list whose length does not match `leg_count` degrades to its first
    /// element applied uniformly.
    pub fn resolve(self, leg_count: usize) -> SpeedProfile {
        match self {
            SpeedProfile::PerLeg(speeds) if speeds.len() != leg_count => {
                SpeedProfile::Uniform(speeds.first().copied().unwrap_or(EMPTY_PROFILE_SPEED_KMH))
            }
            other => other,
        }
    }

    /// Speed on leg `i`. Call on a resolved profile.
    pub fn speed_for_leg(&self, i: usize) -> f64 {
        match self {
            SpeedProfile::Uniform(v) => *v,
            SpeedProfile::PerLeg(speeds) => speeds.get(i).copied().unwrap_or(EMPTY_PROFILE_SPEED_KMH),
        }
    }

    /// Unweighted mean of the assigned speeds
    pub fn mean_kmh(&self) -> f64 {
        match self {
            SpeedProfile::Uniform(v) => *v,
            SpeedProfile::PerLeg(speeds) if speeds.is_empty() => EMPTY_PROFILE_SPEED_KMH,
            SpeedProfile::PerLeg(speeds) => speeds.iter().sum::<f64>() / speeds.len() as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentedSpeedSettings {
    pub enabled: bool,
    /// User speed ceiling (km/h)
    pub user_max_kmh: f64,
    /// Lowest assigned speed is `limit - delta` (never below 30)
    pub min_speed_delta_kmh: f64,
}

impl Default for SegmentedSpeedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            user_max_kmh: 110.0,
            min_speed_delta_kmh: 20.0,
        }
    }
}

/// Per-leg speeds from road classification, before slow-downs.
///
/// Returns the candidate speed on every leg when no section carries a road label.
pub fn build_segmented_speeds(
    points: &[GeoPoint],
    steps: &[RoadStep],
    sections: &[RoadSection],
    candidate_kmh: f64,
    user_max_kmh: f64,
    min_speed_delta_kmh: f64,
) -> Vec<f64> {
    let leg_count = points.len().saturating_sub(1);
    let uniform = vec![candidate_kmh; leg_count];
    if steps.is_empty() || sections.is_empty() {
        return uniform;
    }

    let section_total: f64 = sections.iter().map(|s| s.distance).sum();
    let section_total = if section_total == 0.0 { 1.0 } else { section_total };

    let mut boundaries = Vec::with_capacity(sections.len());
    let mut acc = 0.0;
    for section in sections {
        boundaries.push((acc, acc + section.distance, section));
        acc += section.distance;
    }

    let mut vertex_dist = cumulative_distances_m(points);
    if let Some(&polyline_total) = vertex_dist.last() {
        if polyline_total > 0.0 {
            let ratio = section_total / polyline_total;
            vertex_dist.iter_mut().for_each(|d| *d *= ratio);
        }
    }

    let mut found_road_types = false;
    let mut speeds = Vec::with_capacity(leg_count);

    for i in 0..leg_count {
        let mid = (vertex_dist[i] + vertex_dist[i + 1]) / 2.0;
        let label = boundaries
            .iter()
            .find(|(start, end, _)| *start <= mid && mid < *end)
            .and_then(|(_, _, section)| section.road_label());

        let speed = match label {
            Some(label) => {
                found_road_types = true;
                let limit = speed_limit_for_road_type(label, user_max_kmh);
                let min_allowed = MIN_ASSIGNED_SPEED_KMH.max(limit - min_speed_delta_kmh);
                min_allowed.max(candidate_kmh.min(limit))
            }
            None => candidate_kmh,
        };
        speeds.push(speed);
    }

    if !found_road_types {
        return uniform;
    }
    speeds
}

/// Cut the speed by 30 % (floor 30 km/h) on the leg nearest each slow-down point,
/// mapping step index to leg index proportionally.
pub fn apply_slowdowns(speeds: &mut [f64], slowdowns: &[SlowdownPoint], step_count: usize) {
    if speeds.is_empty() || step_count == 0 {
        return;
    }

    let leg_count = speeds.len();
    for point in slowdowns {
        let ratio = point.step_index as f64 / step_count.max(1) as f64;
        let idx = ((ratio * leg_count as f64) as usize).min(leg_count - 1);
        speeds[idx] = (speeds[idx] * SLOWDOWN_FACTOR).max(MIN_ASSIGNED_SPEED_KMH);
    }
}

/// Speed profile for one candidate, segmented when enabled and the route has steps.
pub fn profile_for_candidate(
    route: &RouteData,
    slowdowns: &[SlowdownPoint],
    candidate_kmh: f64,
    settings: &SegmentedSpeedSettings,
) -> SpeedProfile {
    if !settings.enabled || !route.has_step_info() {
        return SpeedProfile::Uniform(candidate_kmh);
    }

    let mut speeds = build_segmented_speeds(
        &route.points,
        &route.steps,
        &route.sections,
        candidate_kmh,
        settings.user_max_kmh,
        settings.min_speed_delta_kmh,
    );
    apply_slowdowns(&mut speeds, slowdowns, route.steps.len());
    SpeedProfile::PerLeg(speeds)
}
