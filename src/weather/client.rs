use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{Coordinates, WeatherError, WeatherProvider, WeatherSnapshot};
use crate::app::WeatherConfig;
use crate::constants::{HTTP_CONNECT_TIMEOUT_SECS, WEATHER_REQUEST_TIMEOUT_SECS};

/// OpenWeather current-conditions client (metric units)
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Build from config, reading the API key from the configured env var
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| WeatherError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(&config.base_url, api_key)
    }

    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(WEATHER_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.into(),
        })
    }

    async fn fetch(&self, query: &[(&str, String)]) -> Result<WeatherSnapshot, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: OpenWeatherResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        Ok(body.into())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch(&[("lat", lat.to_string()), ("lon", lon.to_string())]).await
    }

    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch(&[("q", name.to_string())]).await
    }
}

/// Look up the weather at `coords`, falling back to `default_city`
///
/// `coords` is `None` when the location is unknown (e.g. permission denied).
/// The coordinate lookup failing also falls back; only the city lookup's
/// error is returned.
pub async fn fetch_with_fallback(
    provider: &dyn WeatherProvider,
    coords: Option<Coordinates>,
    default_city: &str,
) -> Result<WeatherSnapshot, WeatherError> {
    if let Some(Coordinates { lat, lon }) = coords {
        match provider.fetch_by_coordinates(lat, lon).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) => warn!(error = %e, "Coordinate weather lookup failed, using default city"),
        }
    } else {
        debug!("No location available, using default city");
    }

    provider.fetch_by_city(default_city).await
}

// Response structures for OpenWeather; every field is optional upstream

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    main: Option<MainBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
}

impl From<OpenWeatherResponse> for WeatherSnapshot {
    fn from(raw: OpenWeatherResponse) -> Self {
        let main = raw.main.unwrap_or_default();
        Self {
            temperature: main.temp.unwrap_or(0.0),
            humidity: main.humidity.unwrap_or(0.0),
            wind_speed_mps: raw.wind.and_then(|w| w.speed).unwrap_or(0.0),
            description: raw
                .weather
                .into_iter()
                .next()
                .and_then(|c| c.description)
                .unwrap_or_default(),
            city_name: raw.name.unwrap_or_default(),
        }
    }
}
