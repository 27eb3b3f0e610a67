//! # External Data Providers
//!
//! Capability traits for the services a trip depends on and their HTTP clients.
//!
//! - **OpenRouteService**: route geometry, steps, elevation and geocoding
//! - **OSRM**: secondary route geometry and steps, no key required
//! - **Open-Meteo**: live temperature and precipitation
//! - **Fallback**: ordered provider chains resolving to [`Resolved`] values
//!
//! Clients return `anyhow::Result`; only the fallback layer decides what a failure means.

pub mod fallback;
pub mod open_meteo;
pub mod openrouteservice;
pub mod osrm;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{GeoPoint, RoadSection};

pub use fallback::*;
pub use open_meteo::OpenMeteoClient;
pub use openrouteservice::{is_valid_ors_key, OpenRouteServiceClient};
pub use osrm::OsrmClient;

/// Route geometry as returned by a routing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub points: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Ambient weather at one location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature_c: f64,
    pub precipitation_mm_per_h: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn route(&self, start: &GeoPoint, end: &GeoPoint) -> Result<RouteGeometry>;
}

/// Turn-by-turn steps grouped into sections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StepProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sections(&self, start: &GeoPoint, end: &GeoPoint) -> Result<Vec<RoadSection>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElevationProvider: Send + Sync {
    /// One altitude (m) per input point.
    async fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, at: &GeoPoint) -> Result<Weather>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<GeoPoint>;
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("ev-eco-speed/", env!("CARGO_PKG_VERSION"))),
    );
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}
