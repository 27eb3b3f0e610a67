use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::charging::ChargingPlan;
use crate::routing::SegmentedSpeedSettings;

/// Selection rule applied to the feasible candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Objective {
    /// Least energy inside the time window, ties broken by least total time
    MinimizeEnergy,
    /// Least `norm(E) + λ·norm(T)` across the feasible set
    WeightedScore,
}

/// Simulation outcome for one candidate speed. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Requested cruising speed (km/h)
    pub speed_kmh: f64,
    pub energy_wh: f64,
    /// Driving time (h)
    pub time_h: f64,
    pub distance_km: f64,
    /// Mean of the per-leg speeds actually assigned (km/h)
    pub avg_speed_kmh: f64,
    pub energy_kwh: f64,
    pub charging: ChargingPlan,
    pub charging_time_min: f64,
    /// Driving plus charging (min)
    pub total_time_min: f64,
}

impl CandidateResult {
    pub fn driving_time_min(&self) -> f64 {
        self.time_h * 60.0
    }
}

/// A candidate dropped because its simulation failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub speed_kmh: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Candidate cruising speeds (km/h)
    pub candidate_speeds_kmh: Vec<f64>,
    /// Speed ceiling (km/h)
    pub user_max_kmh: f64,
    /// Allowed total-time increase over the fastest candidate (%)
    pub max_time_penalty_pct: f64,
    pub objective: Objective,
    /// Time weight for the weighted score
    pub lambda: f64,
    pub segmented_speeds: bool,
    pub min_speed_delta_kmh: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            candidate_speeds_kmh: default_candidate_speeds(),
            user_max_kmh: 110.0,
            max_time_penalty_pct: 15.0,
            objective: Objective::MinimizeEnergy,
            lambda: 2.0,
            segmented_speeds: true,
            min_speed_delta_kmh: 20.0,
        }
    }
}

impl OptimizerSettings {
    /// Candidates at or below the ceiling; the ceiling alone when none qualify.
    pub fn effective_candidates(&self) -> Vec<f64> {
        let speeds: Vec<f64> = self
            .candidate_speeds_kmh
            .iter()
            .copied()
            .filter(|v| *v <= self.user_max_kmh)
            .collect();
        if speeds.is_empty() {
            vec![self.user_max_kmh]
        } else {
            speeds
        }
    }

    pub fn segmented(&self) -> SegmentedSpeedSettings {
        SegmentedSpeedSettings {
            enabled: self.segmented_speeds,
            user_max_kmh: self.user_max_kmh,
            min_speed_delta_kmh: self.min_speed_delta_kmh,
        }
    }
}

/// 50, 55, …, 130 km/h
pub fn default_candidate_speeds() -> Vec<f64> {
    (50..=130).step_by(5).map(f64::from).collect()
}

/// Parse a comma-separated speed list into a sorted, de-duplicated set.
///
/// Any unparsable entry yields the default list. Speeds of 0 km/h or less are dropped.
pub fn parse_candidate_speeds(input: &str) -> Vec<f64> {
    let parsed: Result<std::collections::BTreeSet<i64>, _> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<i64>)
        .collect();

    match parsed {
        Ok(set) => {
            let (positive, dropped): (Vec<i64>, Vec<i64>) = set.into_iter().partition(|v| *v > 0);
            if !dropped.is_empty() {
                warn!(?dropped, "ignoring non-positive candidate speeds");
            }
            if positive.is_empty() && !dropped.is_empty() {
                return default_candidate_speeds();
            }
            positive.into_iter().map(|v| v as f64).collect()
        }
        Err(_) => default_candidate_speeds(),
    }
}

/// Ranked comparison of all candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Successful candidates in evaluation order
    pub results: Vec<CandidateResult>,
    pub skipped: Vec<SkippedCandidate>,
    /// Indices into `results` inside the time window
    pub feasible: Vec<usize>,
    /// Upper bound of the time window (min), `None` when the fastest time is zero
    pub time_window_min: Option<f64>,
    pub best: usize,
    pub fastest: usize,
    pub objective: Objective,
}

impl OptimizationOutcome {
    pub fn best(&self) -> &CandidateResult {
        &self.results[self.best]
    }

    pub fn fastest(&self) -> &CandidateResult {
        &self.results[self.fastest]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates() {
        let speeds = default_candidate_speeds();
        assert_eq!(speeds.len(), 17);
        assert_eq!(speeds[0], 50.0);
        assert_eq!(speeds[16], 130.0);
    }

    #[test]
    fn test_parse_candidate_speeds() {
        assert_eq!(parse_candidate_speeds("90, 70,80 ,70,"), vec![70.0, 80.0, 90.0]);
        assert_eq!(parse_candidate_speeds("90, fast"), default_candidate_speeds());
        assert!(parse_candidate_speeds("").is_empty());
    }

    #[test]
    fn test_non_positive_candidates_dropped() {
        assert_eq!(parse_candidate_speeds("0, 60, -20, 90"), vec![60.0, 90.0]);
        assert_eq!(parse_candidate_speeds("0,-5"), default_candidate_speeds());
    }

    #[test]
    fn test_effective_candidates() {
        let settings = OptimizerSettings {
            candidate_speeds_kmh: vec![90.0, 120.0, 130.0],
            user_max_kmh: 110.0,
            ..Default::default()
        };
        assert_eq!(settings.effective_candidates(), vec![90.0]);

        let settings = OptimizerSettings {
            candidate_speeds_kmh: vec![120.0, 130.0],
            user_max_kmh: 100.0,
            ..Default::default()
        };
        assert_eq!(settings.effective_candidates(), vec![100.0]);
    }

    #[test]
    fn test_objective_parse() {
        assert_eq!("weighted_score".parse::<Objective>().unwrap(), Objective::WeightedScore);
        assert_eq!(Objective::MinimizeEnergy.to_string(), "minimize_energy");
    }
}
