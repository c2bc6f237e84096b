// Gateway module for weather - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod client;
mod types;

// Public re-exports - the ONLY way to access weather functionality
pub use client::{fetch_with_fallback, OpenWeatherClient};
pub use types::{Coordinates, WeatherError, WeatherProvider, WeatherSnapshot};
#[cfg(test)]
pub use types::MockWeatherProvider;
