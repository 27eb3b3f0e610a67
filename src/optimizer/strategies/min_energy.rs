use ordered_float::OrderedFloat;

use super::SelectionStrategy;
use crate::optimizer::{CandidateResult, Objective};

/// Least energy inside the time window
pub struct MinEnergyStrategy;

impl SelectionStrategy for MinEnergyStrategy {
    fn select(&self, feasible: &[&CandidateResult]) -> Option<usize> {
        feasible
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| (OrderedFloat(r.energy_wh), OrderedFloat(r.total_time_min)))
            .map(|(i, _)| i)
    }

    fn objective(&self) -> Objective {
        Objective::MinimizeEnergy
    }
}
