//! # Trip Planner
//!
//! Resolves external data through the provider chains, then runs the pure planning core.
//!
//! - **Resolve**: geocoding, weather, route, steps and elevation, each with its fallback
//! - **Plan**: environment, HVAC and vehicle parameters, speed optimization, report
//!
//! Only `resolve` touches the network; `plan` is deterministic in its inputs.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{ProvidersConfig, RunConfiguration};
use crate::domain::{densify_straight_line, GeoPoint, RoadSection, RouteData, VehicleProfile};
use crate::error::PlannerError;
use crate::optimizer::{ProgressObserver, SpeedOptimizer};
use crate::physics::{hvac_electric_power_kw, EnvironmentParams, SimulationParams};
use crate::providers::{
    is_valid_ors_key, resolve_elevations, resolve_place, resolve_weather, ElevationProvider,
    Geocoder, OpenMeteoClient, OpenRouteServiceClient, OsrmClient, Resolved, RouteChain,
    RouteProvider, SourceStatus, StepChain, StepProvider, Weather, WeatherProvider,
};
use crate::report::{ReportInputs, TripReport};
use crate::routing::detect_intersections;
use crate::simulation::RouteRelief;

/// The external collaborators of one planner
#[derive(Clone, Default)]
pub struct Providers {
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub routes: RouteChain,
    pub steps: StepChain,
    pub elevation: Option<Arc<dyn ElevationProvider>>,
    pub weather: Option<Arc<dyn WeatherProvider>>,
}

impl Providers {
    /// OpenRouteService first when a key is configured, OSRM second, Open-Meteo for weather.
    pub fn from_config(cfg: &ProvidersConfig) -> Result<Self, PlannerError> {
        let timeout = Duration::from_secs(cfg.http_timeout_seconds);
        let provider_err = |e: anyhow::Error| PlannerError::Provider(format!("{e:#}"));

        let osrm = Arc::new(OsrmClient::new(cfg.osrm_base_url.clone(), timeout).map_err(provider_err)?);
        let weather = Arc::new(
            OpenMeteoClient::new(
                cfg.open_meteo_base_url.clone(),
                Duration::from_secs(cfg.weather_timeout_seconds),
            )
            .map_err(provider_err)?,
        );

        let key = cfg.ors_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let ors = match key {
            Some(key) if is_valid_ors_key(key) => Some(Arc::new(
                OpenRouteServiceClient::new(cfg.ors_base_url.clone(), key, timeout).map_err(provider_err)?,
            )),
            Some(_) => {
                return Err(PlannerError::InvalidConfig(
                    "invalid OpenRouteService API key, paste the key itself rather than an error message".into(),
                ))
            }
            None => {
                warn!("no OpenRouteService API key, using OSRM and built-in city coordinates");
                None
            }
        };

        let mut routes: Vec<Arc<dyn RouteProvider>> = Vec::new();
        let mut steps: Vec<Arc<dyn StepProvider>> = Vec::new();
        let mut geocoder: Option<Arc<dyn Geocoder>> = None;
        let mut elevation: Option<Arc<dyn ElevationProvider>> = None;

        if let Some(ors) = &ors {
            routes.push(ors.clone());
            steps.push(ors.clone());
            geocoder = Some(ors.clone());
            if cfg.use_elevation {
                elevation = Some(ors.clone());
            }
        }
        routes.push(osrm.clone());
        steps.push(osrm);

        Ok(Self {
            geocoder,
            routes: RouteChain::new(routes),
            steps: StepChain::new(steps),
            elevation,
            weather: Some(weather),
        })
    }
}

/// How each piece of external data was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSources {
    pub origin: SourceStatus,
    pub destination: SourceStatus,
    pub weather: SourceStatus,
    pub route: SourceStatus,
    pub elevation: SourceStatus,
    pub steps: SourceStatus,
}

/// External data after every fallback has been applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTrip {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub weather: Weather,
    pub route: RouteData,
    /// Distance reported by the routing service (m)
    pub routed_distance_m: f64,
    pub sources: DataSources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub vehicle_profile: VehicleProfile,
    pub vehicle_name: String,
    pub passengers: u32,
    pub payload_kg: f64,
    pub weather: Weather,
    pub environment: EnvironmentParams,
    pub simulation: SimulationParams,
    pub route_points: usize,
    pub routed_distance_km: f64,
    pub sources: DataSources,
    pub report: TripReport,
}

pub struct TripPlanner {
    config: RunConfiguration,
    providers: Providers,
}

impl TripPlanner {
    pub fn new(config: RunConfiguration, providers: Providers) -> Self {
        Self { config, providers }
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Resolve, then plan.
    pub async fn run(&self, observer: &mut dyn ProgressObserver) -> Result<TripPlan, PlannerError> {
        let resolved = self.resolve().await?;
        self.plan(&resolved, observer)
    }

    /// Fetch everything the core needs. Only geocoding can fail.
    pub async fn resolve(&self) -> Result<ResolvedTrip, PlannerError> {
        let cfg = &self.config;
        let geocoder = self.providers.geocoder.as_deref();

        let (origin, destination) = futures::join!(
            resolve_place(geocoder, &cfg.origin),
            resolve_place(geocoder, &cfg.destination)
        );
        let origin_status = origin.status();
        let destination_status = destination.status();
        let start = origin
            .into_value()
            .ok_or_else(|| PlannerError::Geocoding(cfg.origin.clone()))?;
        let end = destination
            .into_value()
            .ok_or_else(|| PlannerError::Geocoding(cfg.destination.clone()))?;

        let manual = Weather {
            temperature_c: cfg.weather.temperature_c,
            precipitation_mm_per_h: cfg.weather.precipitation_mm_per_h,
        };
        let midpoint = start.midpoint(&end);
        let weather_fut = async {
            match (cfg.weather.use_live, self.providers.weather.as_deref()) {
                (true, Some(provider)) => resolve_weather(provider, &midpoint, manual).await,
                _ => Resolved::Primary(manual),
            }
        };
        let steps_fut = async {
            if cfg.providers.detailed_route {
                self.providers.steps.resolve(&start, &end).await
            } else {
                Resolved::Failed("detailed route disabled".to_string())
            }
        };

        let (weather, route, steps) =
            futures::join!(weather_fut, self.providers.routes.resolve(&start, &end), steps_fut);

        let weather_status = weather.status();
        let weather = weather.into_value().unwrap_or(manual);

        let route_status = route.status();
        let geometry = route
            .into_value()
            .ok_or_else(|| PlannerError::InvalidRoute("no route".to_string()))?;
        let mut routed_distance_m = geometry.distance_m;
        let mut points = geometry.points;
        if points.len() < 2 {
            return Err(PlannerError::InvalidRoute(format!(
                "route has {} point(s)",
                points.len()
            )));
        }
        if points.len() == 2 {
            warn!("simplified route with only start and end, densifying a straight line");
            routed_distance_m = points[0].distance_m(&points[1]);
            points = densify_straight_line(&points[0], &points[1]);
        }

        let (elevations, elevation_status) = self.resolve_elevations(&points).await;

        let steps_status = steps.status();
        let sections: Vec<RoadSection> = steps.into_value().unwrap_or_default();

        let route = RouteData::flat(points)
            .with_elevations(elevations)
            .with_sections(sections);

        info!(
            points = route.points.len(),
            steps = route.steps.len(),
            routed_distance_km = routed_distance_m / 1000.0,
            temperature_c = weather.temperature_c,
            "route and elevations resolved"
        );

        Ok(ResolvedTrip {
            origin: start,
            destination: end,
            weather,
            route,
            routed_distance_m,
            sources: DataSources {
                origin: origin_status,
                destination: destination_status,
                weather: weather_status,
                route: route_status,
                elevation: elevation_status,
                steps: steps_status,
            },
        })
    }

    async fn resolve_elevations(&self, points: &[GeoPoint]) -> (Vec<f64>, SourceStatus) {
        let flat = vec![0.0; points.len()];
        if !self.config.providers.use_elevation {
            info!("elevation disabled, using constant altitude");
            return (flat, SourceStatus::degraded("elevation disabled"));
        }
        match self.providers.elevation.as_deref() {
            Some(provider) => {
                let resolved = resolve_elevations(provider, points).await;
                let status = resolved.status();
                (resolved.into_value().unwrap_or(flat), status)
            }
            None => {
                warn!("no elevation service, assuming constant altitude");
                (flat, SourceStatus::degraded("no elevation service"))
            }
        }
    }

    /// Run the optimizer on resolved data and build the report.
    pub fn plan(&self, trip: &ResolvedTrip, observer: &mut dyn ProgressObserver) -> Result<TripPlan, PlannerError> {
        let cfg = &self.config;
        cfg.vehicle.check()?;
        trip.route.check()?;

        let environment = EnvironmentParams::from_weather(
            trip.weather.temperature_c,
            trip.weather.precipitation_mm_per_h,
            cfg.weather.model_battery_temp,
        );
        let hvac_kw = if cfg.hvac_enabled {
            hvac_electric_power_kw(trip.weather.temperature_c, cfg.hvac_intensity_pct, &cfg.hvac)
        } else {
            0.0
        };
        let simulation = SimulationParams::new(&cfg.vehicle, &environment, cfg.payload_kg, hvac_kw);

        let intersections = detect_intersections(&trip.route.steps);
        let relief = RouteRelief::from_profile(&trip.route.points, &trip.route.elevations);

        let optimizer = SpeedOptimizer::new(cfg.optimizer.clone());
        let outcome = optimizer.optimize(&trip.route, &simulation, &cfg.soc, observer)?;

        let inputs = ReportInputs {
            battery_kwh: simulation.battery_kwh,
            start_soc_pct: cfg.soc.start_pct,
            costs: cfg.costs,
            hvac_kw,
            rain_factor: environment.rolling_resistance_factor,
            relief,
            intersections: 0,
            slowdown_points: 0,
        }
        .with_intersections(&intersections);
        let report = TripReport::build(&outcome, &inputs);

        Ok(TripPlan {
            origin: trip.origin,
            destination: trip.destination,
            vehicle_profile: cfg.vehicle_profile,
            vehicle_name: cfg.vehicle_profile.display_name().to_string(),
            passengers: cfg.passengers,
            payload_kg: cfg.payload_kg,
            weather: trip.weather,
            environment,
            simulation,
            route_points: trip.route.points.len(),
            routed_distance_km: trip.routed_distance_m / 1000.0,
            sources: trip.sources.clone(),
            report,
        })
    }
}
