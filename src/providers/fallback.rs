//! Provider chains.
//!
//! Each chain tries its providers in order and reports how the value was obtained as a
//! [`Resolved`]: from the first provider, from a later provider or a built-in default, or
//! not at all. Failures never escape as errors.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{ElevationProvider, Geocoder, RouteGeometry, RouteProvider, StepProvider, Weather, WeatherProvider};
use crate::domain::{GeoPoint, RoadSection};

/// Cities answered locally when the geocoder is unavailable (lon, lat)
pub const FALLBACK_CITIES: [(&str, f64, f64); 6] = [
    ("paris", 2.3522, 48.8566),
    ("lyon", 4.8357, 45.7640),
    ("marseille", 5.3698, 43.2965),
    ("beauvais", 2.0833, 49.4333),
    ("toulouse", 1.4442, 43.6047),
    ("nantes", -1.5536, 47.2184),
];

/// Outcome of resolving one piece of external data
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    /// From the preferred source
    Primary(T),
    /// From a fallback source or a conservative default
    Degraded { value: T, reason: String },
    Failed(String),
}

impl<T> Resolved<T> {
    pub fn is_primary(&self) -> bool {
        matches!(self, Resolved::Primary(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolved::Degraded { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Resolved::Primary(v) | Resolved::Degraded { value: v, .. } => Some(v),
            Resolved::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Resolved::Primary(v) | Resolved::Degraded { value: v, .. } => Some(v),
            Resolved::Failed(_) => None,
        }
    }

    pub fn status(&self) -> SourceStatus {
        match self {
            Resolved::Primary(_) => SourceStatus {
                resolution: Resolution::Primary,
                note: None,
            },
            Resolved::Degraded { reason, .. } => SourceStatus {
                resolution: Resolution::Degraded,
                note: Some(reason.clone()),
            },
            Resolved::Failed(reason) => SourceStatus {
                resolution: Resolution::Failed,
                note: Some(reason.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Primary,
    Degraded,
    Failed,
}

/// Serializable summary of a [`Resolved`] value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub resolution: Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SourceStatus {
    pub fn primary() -> Self {
        Self {
            resolution: Resolution::Primary,
            note: None,
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            resolution: Resolution::Degraded,
            note: Some(reason.into()),
        }
    }
}

/// Look up a city from the built-in table, accepting `"<city>"` or `"<city>, france"`.
pub fn fallback_city(query: &str) -> Option<GeoPoint> {
    let key = query.trim().to_lowercase();
    let city = key.strip_suffix(", france").unwrap_or(&key).trim();
    FALLBACK_CITIES
        .iter()
        .find(|(name, _, _)| *name == city)
        .map(|(_, lon, lat)| GeoPoint::new(*lon, *lat))
}

/// Geocoder first, then the city table.
pub async fn resolve_place(geocoder: Option<&dyn Geocoder>, query: &str) -> Resolved<GeoPoint> {
    let reason = match geocoder {
        Some(g) => match g.geocode(query).await {
            Ok(point) => return Resolved::Primary(point),
            Err(e) => format!("geocoder failed: {e:#}"),
        },
        None => "no geocoder configured".to_string(),
    };

    match fallback_city(query) {
        Some(point) => {
            warn!(query, %reason, "using built-in city coordinates");
            Resolved::Degraded { value: point, reason }
        }
        None => {
            warn!(query, %reason, "geocoding failed");
            Resolved::Failed(reason)
        }
    }
}

/// Ordered route providers with a straight line as the last resort
#[derive(Clone, Default)]
pub struct RouteChain {
    providers: Vec<Arc<dyn RouteProvider>>,
}

impl RouteChain {
    pub fn new(providers: Vec<Arc<dyn RouteProvider>>) -> Self {
        Self { providers }
    }

    /// Never fails: when every provider fails the result is the straight segment.
    pub async fn resolve(&self, start: &GeoPoint, end: &GeoPoint) -> Resolved<RouteGeometry> {
        let mut failures = Vec::new();

        for (i, provider) in self.providers.iter().enumerate() {
            match provider.route(start, end).await {
                Ok(route) if i == 0 => return Resolved::Primary(route),
                Ok(route) => {
                    warn!(provider = provider.name(), "using fallback route provider");
                    return Resolved::Degraded {
                        value: route,
                        reason: failures.join("; "),
                    };
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "route provider failed");
                    failures.push(format!("{}: {e:#}", provider.name()));
                }
            }
        }

        warn!("no routing service available, falling back to a straight line");
        failures.push("straight line".to_string());
        Resolved::Degraded {
            value: RouteGeometry {
                points: vec![*start, *end],
                distance_m: start.distance_m(end),
                duration_s: 0.0,
            },
            reason: failures.join("; "),
        }
    }
}

/// Ordered step providers; failing them all leaves the route without step information
#[derive(Clone, Default)]
pub struct StepChain {
    providers: Vec<Arc<dyn StepProvider>>,
}

impl StepChain {
    pub fn new(providers: Vec<Arc<dyn StepProvider>>) -> Self {
        Self { providers }
    }

    pub async fn resolve(&self, start: &GeoPoint, end: &GeoPoint) -> Resolved<Vec<RoadSection>> {
        let mut failures = Vec::new();

        for (i, provider) in self.providers.iter().enumerate() {
            match provider.sections(start, end).await {
                Ok(sections) if i == 0 => return Resolved::Primary(sections),
                Ok(sections) => {
                    warn!(provider = provider.name(), "using fallback step provider");
                    return Resolved::Degraded {
                        value: sections,
                        reason: failures.join("; "),
                    };
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "step provider failed");
                    failures.push(format!("{}: {e:#}", provider.name()));
                }
            }
        }

        warn!("no step information, speeds will be uniform");
        Resolved::Failed(if failures.is_empty() {
            "no step provider configured".to_string()
        } else {
            failures.join("; ")
        })
    }
}

/// Elevation carried by the coordinates, else from `provider`, else flat.
pub async fn resolve_elevations(provider: &dyn ElevationProvider, points: &[GeoPoint]) -> Resolved<Vec<f64>> {
    if !points.is_empty() && points.iter().all(|p| p.elevation_m.is_some()) {
        return Resolved::Primary(points.iter().filter_map(|p| p.elevation_m).collect());
    }

    let flat = vec![0.0; points.len()];
    match provider.elevations(points).await {
        Ok(e) if e.len() == points.len() && e.iter().all(|v| v.is_finite()) => Resolved::Primary(e),
        Ok(e) => {
            let reason = format!("{} elevation samples for {} points", e.len(), points.len());
            warn!(%reason, "elevation profile unusable, assuming constant altitude");
            Resolved::Degraded { value: flat, reason }
        }
        Err(e) => {
            warn!(error = %e, "elevation unavailable, assuming constant altitude");
            Resolved::Degraded {
                value: flat,
                reason: format!("{e:#}"),
            }
        }
    }
}

/// Live weather at `at`, the manual values when the fetch fails.
pub async fn resolve_weather(provider: &dyn WeatherProvider, at: &GeoPoint, manual: Weather) -> Resolved<Weather> {
    match provider.current(at).await {
        Ok(weather) => {
            info!(
                temperature_c = weather.temperature_c,
                precipitation_mm_per_h = weather.precipitation_mm_per_h,
                "live weather at route midpoint"
            );
            Resolved::Primary(weather)
        }
        Err(e) => {
            warn!(error = %e, "live weather failed, using manual weather inputs");
            Resolved::Degraded {
                value: manual,
                reason: format!("{e:#}"),
            }
        }
    }
}
