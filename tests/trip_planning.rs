//! End-to-end planning runs against in-process providers.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use ev_eco_speed::config::{Config, RunConfiguration};
use ev_eco_speed::domain::{GeoPoint, RoadSection, RoadStep};
use ev_eco_speed::optimizer::{NoopProgress, Objective, RecordingProgress};
use ev_eco_speed::providers::{
    ElevationProvider, Geocoder, Resolution, RouteChain, RouteGeometry, RouteProvider, StepChain,
    StepProvider,
};
use ev_eco_speed::report::Advisory;
use ev_eco_speed::trip::{Providers, TripPlanner};

const PARIS: GeoPoint = GeoPoint { lon: 2.3522, lat: 48.8566, elevation_m: None };
const AUXERRE: GeoPoint = GeoPoint { lon: 3.5673, lat: 47.7982, elevation_m: None };
const LYON: GeoPoint = GeoPoint { lon: 4.8357, lat: 45.7640, elevation_m: None };

struct Cities;

#[async_trait]
impl Geocoder for Cities {
    async fn geocode(&self, query: &str) -> Result<GeoPoint> {
        match query {
            "Paris, France" => Ok(PARIS),
            "Lyon, France" => Ok(LYON),
            other => Err(anyhow!("unknown place {other}")),
        }
    }
}

struct Down;

#[async_trait]
impl RouteProvider for Down {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn route(&self, _start: &GeoPoint, _end: &GeoPoint) -> Result<RouteGeometry> {
        Err(anyhow!("HTTP 503"))
    }
}

/// Paris, Auxerre, Lyon
struct ViaAuxerre;

#[async_trait]
impl RouteProvider for ViaAuxerre {
    fn name(&self) -> &'static str {
        "via-auxerre"
    }

    async fn route(&self, start: &GeoPoint, end: &GeoPoint) -> Result<RouteGeometry> {
        Ok(RouteGeometry {
            points: vec![*start, AUXERRE, *end],
            distance_m: 465_000.0,
            duration_s: 16_200.0,
        })
    }
}

#[async_trait]
impl StepProvider for ViaAuxerre {
    fn name(&self) -> &'static str {
        "via-auxerre"
    }

    async fn sections(&self, _start: &GeoPoint, _end: &GeoPoint) -> Result<Vec<RoadSection>> {
        let step = |instruction: &str, road: &str, distance: f64| RoadStep {
            instruction: instruction.to_string(),
            road_type: Some(road.to_string()),
            distance,
            ..Default::default()
        };
        Ok(vec![
            RoadSection {
                distance: 150_000.0,
                steps: vec![step("Take the ramp onto A6", "motorway", 150_000.0)],
                ..Default::default()
            },
            RoadSection {
                distance: 315_000.0,
                steps: vec![
                    step("At the roundabout, take the 2nd exit", "primary", 15_000.0),
                    step("Continue on N6", "primary", 300_000.0),
                ],
                ..Default::default()
            },
        ])
    }
}

/// Altitude rising towards the south
struct Rising;

#[async_trait]
impl ElevationProvider for Rising {
    async fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        Ok(points.iter().map(|p| 35.0 + (48.8566 - p.lat) * 45.0).collect())
    }
}

fn run_config(edit: impl FnOnce(&mut Config)) -> RunConfiguration {
    let mut cfg = Config::default();
    cfg.optimizer.candidate_speeds = Some("70,80,90,100,110".into());
    edit(&mut cfg);
    cfg.into_run().expect("valid configuration")
}

fn providers() -> Providers {
    let via = Arc::new(ViaAuxerre);
    Providers {
        geocoder: Some(Arc::new(Cities)),
        routes: RouteChain::new(vec![Arc::new(Down), via.clone()]),
        steps: StepChain::new(vec![via]),
        elevation: Some(Arc::new(Rising)),
        weather: None,
    }
}

#[tokio::test]
async fn paris_lyon_with_fallback_router() {
    let planner = TripPlanner::new(run_config(|_| {}), providers());
    let mut progress = RecordingProgress::default();
    let plan = planner.run(&mut progress).await.unwrap();

    assert_eq!(plan.sources.origin.resolution, Resolution::Primary);
    assert_eq!(plan.sources.route.resolution, Resolution::Degraded);
    assert!(plan.sources.route.note.as_deref().unwrap_or_default().contains("down"));
    assert_eq!(plan.sources.elevation.resolution, Resolution::Primary);
    assert_eq!(plan.sources.steps.resolution, Resolution::Primary);

    // Three-point polyline is kept as is
    assert_eq!(plan.route_points, 3);
    assert_eq!(plan.routed_distance_km, 465.0);

    let report = &plan.report;
    assert_eq!(report.comparison.len(), 5);
    assert_eq!(progress.events.len(), 5);
    assert!(report.relief.ascent_m > 100.0);
    assert_eq!(report.relief.descent_m, 0.0);
    assert_eq!(report.intersections, 3);
    assert_eq!(report.slowdown_points, 1);

    // A 60 kWh car cannot cover ~400 km on one charge
    assert!(report.best.charging.num_stops >= 1);
    assert!(report
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::ChargesRecommended { .. })));

    let window = report.time_window_min.unwrap();
    assert!(report.best.total_time_min <= window + 1e-9);
    assert!(report.best.energy_kwh <= report.fastest.energy_kwh);
}

#[tokio::test]
async fn weighted_objective_trades_energy_for_time() {
    let min_energy = TripPlanner::new(run_config(|_| {}), providers())
        .run(&mut NoopProgress)
        .await
        .unwrap();
    let time_heavy = TripPlanner::new(
        run_config(|cfg| {
            cfg.optimizer.objective = Objective::WeightedScore;
            cfg.optimizer.lambda = 50.0;
        }),
        providers(),
    )
    .run(&mut NoopProgress)
    .await
    .unwrap();

    assert_eq!(time_heavy.report.objective, Objective::WeightedScore);
    assert!(time_heavy.report.best.total_time_min <= min_energy.report.best.total_time_min);
    assert!(time_heavy.report.best.energy_kwh >= min_energy.report.best.energy_kwh);
}

#[tokio::test]
async fn offline_run_still_produces_a_plan() {
    let cfg = run_config(|cfg| {
        cfg.trip.origin = "Nantes".into();
        cfg.trip.destination = "Toulouse, France".into();
    });
    let plan = TripPlanner::new(cfg, Providers::default())
        .run(&mut NoopProgress)
        .await
        .unwrap();

    assert_eq!(plan.sources.origin.resolution, Resolution::Degraded);
    assert_eq!(plan.sources.route.resolution, Resolution::Degraded);
    assert_eq!(plan.sources.steps.resolution, Resolution::Failed);
    assert_eq!(plan.report.relief.ascent_m, 0.0);
    assert_eq!(plan.report.intersections, 0);
    assert!(plan.route_points >= 50);
}

#[tokio::test]
async fn plan_serializes_for_output() {
    let plan = TripPlanner::new(run_config(|_| {}), providers())
        .run(&mut NoopProgress)
        .await
        .unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["sources"]["route"]["resolution"], "degraded");
    assert_eq!(json["report"]["objective"], "minimize_energy");
    assert_eq!(json["vehicle_profile"], "custom");
    assert!(json["report"]["comparison"].as_array().unwrap().len() == 5);
    assert!(json["report"]["advisories"][0]["kind"].is_string());
}
