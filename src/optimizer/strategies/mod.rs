//! Selection strategies
//!
//! Each strategy picks one winner among the candidates that fit the time window:
//! - MinEnergy: least energy, ties broken by least total time
//! - Weighted: least normalized energy + λ · normalized total time

pub mod min_energy;
pub mod weighted;

pub use min_energy::*;
pub use weighted::*;

use super::{CandidateResult, Objective};

pub trait SelectionStrategy: Send + Sync {
    /// Index into `feasible` of the winner, `None` only when `feasible` is empty.
    fn select(&self, feasible: &[&CandidateResult]) -> Option<usize>;

    fn objective(&self) -> Objective;
}

pub fn strategy_for(objective: Objective, lambda: f64) -> Box<dyn SelectionStrategy> {
    match objective {
        Objective::MinimizeEnergy => Box::new(MinEnergyStrategy),
        Objective::WeightedScore => Box::new(WeightedScoreStrategy::new(lambda)),
    }
}
