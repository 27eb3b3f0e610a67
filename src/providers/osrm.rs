use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{http_client, RouteGeometry, RouteProvider, StepProvider};
use crate::domain::{GeoPoint, RoadSection, RoadStep};

/// OSRM demo-server style routing client
#[derive(Clone)]
pub struct OsrmClient {
    base_url: String,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }

    async fn fetch(&self, start: &GeoPoint, end: &GeoPoint, steps: bool) -> Result<OsrmRoute> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url.trim_end_matches('/'),
            start.lon,
            start.lat,
            end.lon,
            end.lat
        );
        let resp = self
            .client
            .get(url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", if steps { "true" } else { "false" }),
                ("alternatives", "false"),
            ])
            .send()
            .await
            .context("OSRM route GET failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("OSRM route error: HTTP {status}");
        }

        let body: OsrmResponse = resp.json().await.context("OSRM JSON parse failed")?;
        body.routes.into_iter().next().context("OSRM returned no route")
    }
}

#[async_trait]
impl RouteProvider for OsrmClient {
    fn name(&self) -> &'static str {
        "osrm"
    }

    async fn route(&self, start: &GeoPoint, end: &GeoPoint) -> Result<RouteGeometry> {
        let route = self.fetch(start, end, false).await?;
        if route.geometry.coordinates.len() < 2 {
            anyhow::bail!("OSRM route geometry has fewer than 2 points");
        }
        Ok(RouteGeometry {
            points: route.geometry.coordinates,
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }
}

#[async_trait]
impl StepProvider for OsrmClient {
    fn name(&self) -> &'static str {
        "osrm"
    }

    async fn sections(&self, start: &GeoPoint, end: &GeoPoint) -> Result<Vec<RoadSection>> {
        let route = self.fetch(start, end, true).await?;
        let sections: Vec<RoadSection> = route.legs.into_iter().map(OsrmLeg::into_section).collect();
        if sections.iter().all(|s| s.steps.is_empty()) {
            anyhow::bail!("OSRM route has no steps");
        }
        Ok(sections)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

impl OsrmLeg {
    fn into_section(self) -> RoadSection {
        RoadSection {
            distance: self.distance,
            steps: self.steps.into_iter().map(OsrmStep::into_step).collect(),
            road_type: None,
            way_type: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    modifier: Option<String>,
}

impl OsrmStep {
    /// OSRM has no text instructions or numeric maneuver codes; build an English
    /// instruction from the maneuver so keyword matching still applies. OSRM steps carry
    /// no road classification, so routes from here keep uniform speeds.
    fn into_step(self) -> RoadStep {
        let mut instruction = self.maneuver.kind.replace('_', " ");
        if let Some(modifier) = &self.maneuver.modifier {
            instruction.push(' ');
            instruction.push_str(modifier);
        }
        if !self.name.is_empty() {
            instruction.push_str(" onto ");
            instruction.push_str(&self.name);
        }

        RoadStep {
            instruction,
            maneuver: 0,
            distance: self.distance,
            road_type: None,
            way_type: None,
        }
    }
}
