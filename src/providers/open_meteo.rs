use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, Weather, WeatherProvider};
use crate::domain::GeoPoint;

/// Open-Meteo forecast client (no key)
#[derive(Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    client: reqwest::Client,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }

    /// Current weather at `at`, picking the hourly precipitation entry for `now`.
    pub async fn current_at(&self, at: &GeoPoint, now: DateTime<Utc>) -> Result<Weather> {
        let url = format!("{}/v1/forecast", self.base_url.trim_end_matches('/'));
        debug!(lat = at.lat, lon = at.lon, "fetching live weather");

        let resp = self
            .client
            .get(url)
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lon.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", "precipitation".to_string()),
                ("timezone", "UTC".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await
            .context("Open-Meteo GET failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Open-Meteo error: HTTP {status}");
        }

        let forecast: Forecast = resp.json().await.context("Open-Meteo JSON parse failed")?;
        forecast.weather_at(now)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(&self, at: &GeoPoint) -> Result<Weather> {
        self.current_at(at, Utc::now()).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
    #[serde(default)]
    hourly: Option<Hourly>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Hourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

impl Forecast {
    fn weather_at(&self, now: DateTime<Utc>) -> Result<Weather> {
        let temperature_c = self
            .current_weather
            .as_ref()
            .and_then(|c| c.temperature)
            .context("Open-Meteo: temperature missing")?;

        Ok(Weather {
            temperature_c,
            precipitation_mm_per_h: self.precipitation_at(now),
        })
    }

    /// Hourly entry whose timestamp starts with `now`'s UTC hour, else the first one.
    fn precipitation_at(&self, now: DateTime<Utc>) -> f64 {
        let Some(hourly) = &self.hourly else {
            return 0.0;
        };
        if hourly.time.is_empty() || hourly.time.len() != hourly.precipitation.len() {
            return 0.0;
        }

        let prefix = now.format("%Y-%m-%dT%H").to_string();
        let idx = hourly
            .time
            .iter()
            .position(|t| t.starts_with(&prefix))
            .unwrap_or(0);
        hourly.precipitation[idx].unwrap_or(0.0).max(0.0)
    }
}
