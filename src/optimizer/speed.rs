use ordered_float::OrderedFloat;
use tracing::{info, warn};

use super::{
    strategy_for, CandidateResult, OptimizationOutcome, OptimizerSettings, ProgressObserver,
    SelectionStrategy, SkippedCandidate,
};
use crate::charging::{plan_charging, SocWindow};
use crate::domain::{align_elevations, RouteData};
use crate::error::PlannerError;
use crate::physics::SimulationParams;
use crate::routing::{detect_intersections, profile_for_candidate, SlowdownPoint};
use crate::simulation::simulate_route;

/// Runs the route simulation for every candidate speed and ranks the results
pub struct SpeedOptimizer {
    pub strategy: Box<dyn SelectionStrategy>,
    pub settings: OptimizerSettings,
}

impl SpeedOptimizer {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self {
            strategy: strategy_for(settings.objective, settings.lambda),
            settings,
        }
    }

    /// Simulate one candidate speed end to end.
    pub fn evaluate_candidate(
        &self,
        route: &RouteData,
        slowdowns: &[SlowdownPoint],
        params: &SimulationParams,
        soc: &SocWindow,
        speed_kmh: f64,
    ) -> Result<CandidateResult, PlannerError> {
        let profile = profile_for_candidate(route, slowdowns, speed_kmh, &self.settings.segmented());
        let totals = simulate_route(&route.points, &route.elevations, &profile, params)
            .map_err(|e| match e {
                PlannerError::Simulation { reason, .. } => PlannerError::simulation(speed_kmh, reason),
                other => other,
            })?;

        let energy_kwh = totals.energy_wh / 1000.0;
        let charging = plan_charging(params.battery_kwh, energy_kwh, soc);
        let charging_time_min = charging.charging_time_min();

        Ok(CandidateResult {
            speed_kmh,
            energy_wh: totals.energy_wh,
            time_h: totals.time_h,
            distance_km: totals.distance_km,
            avg_speed_kmh: profile.mean_kmh(),
            energy_kwh,
            charging,
            charging_time_min,
            total_time_min: totals.time_h * 60.0 + charging_time_min,
        })
    }

    /// Evaluate every candidate, drop the ones that fail, then select the winner.
    pub fn optimize(
        &self,
        route: &RouteData,
        params: &SimulationParams,
        soc: &SocWindow,
        observer: &mut dyn ProgressObserver,
    ) -> Result<OptimizationOutcome, PlannerError> {
        route.check()?;

        let elevations = align_elevations(&route.points, route.elevations.clone());
        let aligned;
        let route = if elevations == route.elevations {
            route
        } else {
            warn!(
                points = route.points.len(),
                elevations = route.elevations.len(),
                "elevation profile unusable, assuming constant altitude"
            );
            aligned = RouteData {
                elevations,
                ..route.clone()
            };
            &aligned
        };

        let slowdowns = detect_intersections(&route.steps).slowdown_points;
        let candidates = self.settings.effective_candidates();
        let total = candidates.len();

        let mut results = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (i, &speed) in candidates.iter().enumerate() {
            observer.on_candidate(i, total, speed);
            match self.evaluate_candidate(route, &slowdowns, params, soc, speed) {
                Ok(result) => results.push(result),
                Err(e) if !e.is_candidate_local() => return Err(e),
                Err(e) => {
                    warn!(speed_kmh = speed, error = %e, "candidate speed skipped");
                    skipped.push(SkippedCandidate {
                        speed_kmh: speed,
                        reason: e.to_string(),
                    });
                }
            }
        }
        observer.on_finished(results.len(), skipped.len());

        let outcome = self.rank(results, skipped)?;
        let best = outcome.best();
        info!(
            objective = %outcome.objective,
            best_speed_kmh = best.speed_kmh,
            energy_kwh = best.energy_kwh,
            total_time_min = best.total_time_min,
            feasible = outcome.feasible.len(),
            candidates = outcome.results.len(),
            "speed optimization finished"
        );
        Ok(outcome)
    }

    /// Apply the time window and the selection strategy to finished results.
    pub fn rank(
        &self,
        results: Vec<CandidateResult>,
        skipped: Vec<SkippedCandidate>,
    ) -> Result<OptimizationOutcome, PlannerError> {
        let fastest = results
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| OrderedFloat(r.total_time_min))
            .map(|(i, _)| i)
            .ok_or(PlannerError::NoResults)?;

        let fastest_min = results[fastest].total_time_min;
        let time_window_min = (fastest_min > 0.0)
            .then(|| fastest_min * (1.0 + self.settings.max_time_penalty_pct / 100.0));

        let all: Vec<usize> = (0..results.len()).collect();
        let feasible = match time_window_min {
            Some(limit) => {
                let inside: Vec<usize> = all
                    .iter()
                    .copied()
                    .filter(|&i| results[i].total_time_min <= limit)
                    .collect();
                if inside.is_empty() {
                    all
                } else {
                    inside
                }
            }
            None => all,
        };

        let refs: Vec<&CandidateResult> = feasible.iter().map(|&i| &results[i]).collect();
        let best = self
            .strategy
            .select(&refs)
            .map(|k| feasible[k])
            .ok_or(PlannerError::NoResults)?;

        Ok(OptimizationOutcome {
            objective: self.strategy.objective(),
            results,
            skipped,
            feasible,
            time_window_min,
            best,
            fastest,
        })
    }
}
