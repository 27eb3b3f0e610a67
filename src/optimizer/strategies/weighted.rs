use itertools::{Itertools, MinMaxResult};
use ordered_float::OrderedFloat;

use super::SelectionStrategy;
use crate::optimizer::{CandidateResult, Objective};

/// Least `norm(E) + λ·norm(T)`, each axis normalized to [0, 1] over the feasible set
pub struct WeightedScoreStrategy {
    pub lambda: f64,
}

impl WeightedScoreStrategy {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    match values.minmax_by_key(|v| OrderedFloat(*v)) {
        MinMaxResult::NoElements => (0.0, 0.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    }
}

/// 0 on a constant axis
fn normalize(x: f64, lo: f64, hi: f64) -> f64 {
    if lo == hi {
        0.0
    } else {
        (x - lo) / (hi - lo)
    }
}

impl SelectionStrategy for WeightedScoreStrategy {
    fn select(&self, feasible: &[&CandidateResult]) -> Option<usize> {
        let (e_min, e_max) = bounds(feasible.iter().map(|r| r.energy_wh));
        let (t_min, t_max) = bounds(feasible.iter().map(|r| r.total_time_min));

        feasible
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| {
                OrderedFloat(
                    normalize(r.energy_wh, e_min, e_max)
                        + self.lambda * normalize(r.total_time_min, t_min, t_max),
                )
            })
            .map(|(i, _)| i)
    }

    fn objective(&self) -> Objective {
        Objective::WeightedScore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charging::{plan_charging, SocWindow};

    fn result(energy_wh: f64, total_min: f64) -> CandidateResult {
        CandidateResult {
            speed_kmh: 90.0,
            energy_wh,
            time_h: total_min / 60.0,
            distance_km: 100.0,
            avg_speed_kmh: 90.0,
            energy_kwh: energy_wh / 1000.0,
            charging: plan_charging(60.0, energy_wh / 1000.0, &SocWindow::default()),
            charging_time_min: 0.0,
            total_time_min: total_min,
        }
    }

    #[test]
    fn test_lambda_zero_is_min_energy() {
        let a = result(10_000.0, 60.0);
        let b = result(12_000.0, 55.0);
        let c = result(15_000.0, 50.0);
        assert_eq!(WeightedScoreStrategy::new(0.0).select(&[&a, &b, &c]), Some(0));
    }

    #[test]
    fn test_large_lambda_favors_time() {
        let a = result(10_000.0, 60.0);
        let b = result(12_000.0, 55.0);
        let c = result(15_000.0, 50.0);
        assert_eq!(WeightedScoreStrategy::new(10.0).select(&[&a, &b, &c]), Some(2));
    }

    #[test]
    fn test_balanced_lambda() {
        // scores: a = 0 + 2·1 = 2, b = 0.4 + 2·0.5 = 1.4, c = 1 + 0 = 1
        let a = result(10_000.0, 60.0);
        let b = result(12_000.0, 55.0);
        let c = result(15_000.0, 50.0);
        assert_eq!(WeightedScoreStrategy::new(2.0).select(&[&a, &b, &c]), Some(2));
        // λ = 1: a = 1, b = 0.9, c = 1
        assert_eq!(WeightedScoreStrategy::new(1.0).select(&[&a, &b, &c]), Some(1));
    }

    #[test]
    fn test_constant_axis_scores_zero() {
        let a = result(10_000.0, 60.0);
        let b = result(10_000.0, 50.0);
        assert_eq!(normalize(10_000.0, 10_000.0, 10_000.0), 0.0);
        assert_eq!(WeightedScoreStrategy::new(1.0).select(&[&a, &b]), Some(1));
    }
}
