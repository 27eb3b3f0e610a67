use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{http_client, ElevationProvider, Geocoder, RouteGeometry, RouteProvider, StepProvider};
use crate::domain::{GeoPoint, RoadSection};

/// Largest line the elevation endpoint is sent in one request
pub const MAX_ELEVATION_SAMPLES: usize = 1000;

const KEY_MIN_LEN: usize = 20;
const KEY_MAX_LEN: usize = 256;
const KEY_BANNED: [&str; 6] = ["http", "client error", "bad request", "forbidden", "erreur", "error:"];

/// Reject strings that cannot be an ORS key, such as a pasted error message or URL.
pub fn is_valid_ors_key(key: &str) -> bool {
    let k = key.trim();
    if k.is_empty() {
        return false;
    }
    let lower = k.to_lowercase();
    if KEY_BANNED.iter().any(|b| lower.contains(b)) {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "+/=_-.".contains(c);
    k.chars().all(allowed) && (KEY_MIN_LEN..=KEY_MAX_LEN).contains(&k.len())
}

/// OpenRouteService client (directions, elevation, geocoding)
#[derive(Clone)]
pub struct OpenRouteServiceClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouteServiceClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: http_client(timeout)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn directions(&self, start: &GeoPoint, end: &GeoPoint, instructions: bool) -> Result<DirectionsFeature> {
        let body = json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
            "elevation": false,
            "instructions": instructions,
        });

        let resp = self
            .client
            .post(self.url("/v2/directions/driving-car/geojson"))
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("ORS directions POST failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("ORS directions error: HTTP {status}: {text}");
        }

        let collection: FeatureCollection<DirectionsFeature> =
            resp.json().await.context("ORS directions JSON parse failed")?;
        collection
            .features
            .into_iter()
            .next()
            .context("ORS directions returned no route")
    }
}

#[async_trait]
impl RouteProvider for OpenRouteServiceClient {
    fn name(&self) -> &'static str {
        "openrouteservice"
    }

    async fn route(&self, start: &GeoPoint, end: &GeoPoint) -> Result<RouteGeometry> {
        let feature = self.directions(start, end, false).await?;
        if feature.geometry.coordinates.len() < 2 {
            anyhow::bail!("ORS route geometry has fewer than 2 points");
        }
        let summary = feature.properties.summary;
        Ok(RouteGeometry {
            points: feature.geometry.coordinates,
            distance_m: summary.distance,
            duration_s: summary.duration,
        })
    }
}

#[async_trait]
impl StepProvider for OpenRouteServiceClient {
    fn name(&self) -> &'static str {
        "openrouteservice"
    }

    async fn sections(&self, start: &GeoPoint, end: &GeoPoint) -> Result<Vec<RoadSection>> {
        let feature = self.directions(start, end, true).await?;
        if feature.properties.segments.is_empty() {
            anyhow::bail!("ORS route has no segments");
        }
        Ok(feature.properties.segments)
    }
}

#[async_trait]
impl ElevationProvider for OpenRouteServiceClient {
    async fn elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>> {
        let reduced = downsample(points, MAX_ELEVATION_SAMPLES);
        debug!(points = points.len(), sampled = reduced.len(), "requesting elevation line");

        let coordinates: Vec<[f64; 2]> = reduced.iter().map(|p| [p.lon, p.lat]).collect();
        let body = json!({
            "format_in": "geojson",
            "format_out": "geojson",
            "geometry": { "type": "LineString", "coordinates": coordinates },
        });

        let resp = self
            .client
            .post(self.url("/elevation/line"))
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("ORS elevation POST failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("ORS elevation error: HTTP {status}");
        }

        let line: ElevationLine = resp.json().await.context("ORS elevation JSON parse failed")?;
        let sampled = line
            .geometry
            .coordinates
            .iter()
            .map(|c| c.get(2).copied().context("elevation sample without altitude"))
            .collect::<Result<Vec<f64>>>()?;

        let elevations = if reduced.len() != points.len() {
            interpolate_back(&sampled, points.len())
        } else {
            sampled
        };

        if !elevations.is_empty() && elevations.iter().all(|e| *e == 0.0) {
            anyhow::bail!("ORS elevation returned an all-zero profile");
        }
        Ok(elevations)
    }
}

#[async_trait]
impl Geocoder for OpenRouteServiceClient {
    async fn geocode(&self, query: &str) -> Result<GeoPoint> {
        let resp = self
            .client
            .get(self.url("/geocode/search"))
            .query(&[("api_key", self.api_key.as_str()), ("text", query), ("size", "1")])
            .send()
            .await
            .context("ORS geocode GET failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("ORS geocode error: HTTP {status}");
        }

        let collection: FeatureCollection<PointFeature> =
            resp.json().await.context("ORS geocode JSON parse failed")?;
        let feature = collection
            .features
            .into_iter()
            .next()
            .with_context(|| format!("no geocoding match for {query:?}"))?;
        Ok(GeoPoint::new(feature.geometry.coordinates.lon, feature.geometry.coordinates.lat))
    }
}

/// Every `ceil(n / max)`-th point, always ending on the last point.
pub fn downsample(points: &[GeoPoint], max: usize) -> Vec<GeoPoint> {
    if points.len() <= max || max == 0 {
        return points.to_vec();
    }
    let stride = points.len().div_ceil(max);
    let mut reduced: Vec<GeoPoint> = points.iter().step_by(stride).copied().collect();
    if let (Some(last), Some(kept)) = (points.last(), reduced.last()) {
        if kept != last {
            reduced.push(*last);
        }
    }
    reduced
}

/// Linear interpolation of `sampled` onto `full_len` evenly spaced positions.
pub fn interpolate_back(sampled: &[f64], full_len: usize) -> Vec<f64> {
    match sampled.len() {
        n if n == full_len => sampled.to_vec(),
        0 => Vec::new(),
        1 => vec![sampled[0]; full_len],
        n => {
            let span = (n - 1) as f64;
            (0..full_len)
                .map(|i| {
                    let x = if full_len > 1 {
                        i as f64 / (full_len - 1) as f64 * span
                    } else {
                        0.0
                    };
                    let j = (x.floor() as usize).min(n - 2);
                    let t = x - j as f64;
                    sampled[j] + (sampled[j + 1] - sampled[j]) * t
                })
                .collect()
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection<F> {
    #[serde(default = "Vec::new")]
    features: Vec<F>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    geometry: LineString,
    #[serde(default)]
    properties: DirectionsProperties,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<GeoPoint>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectionsProperties {
    #[serde(default)]
    segments: Vec<RoadSection>,
    #[serde(default)]
    summary: Summary,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct PointFeature {
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct ElevationLine {
    geometry: ElevationGeometry,
}

#[derive(Debug, Deserialize)]
struct ElevationGeometry {
    coordinates: Vec<Vec<f64>>,
}
