use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current conditions at one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    pub wind_speed_mps: f64,
    pub description: String,
    pub city_name: String,
}

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Weather API error ({0})")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed weather response: {0}")]
    Malformed(String),
}

/// Source of current weather conditions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError>;

    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot, WeatherError>;
}
