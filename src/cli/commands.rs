use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    app::{init_config, Config},
    utils::log_info,
    weather::{fetch_with_fallback, Coordinates, OpenWeatherClient, WeatherSnapshot},
};

use super::Commands;

/// Handle CLI subcommands
///
/// Returns `false` when the caller should continue into the chat shell.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing Agrimate configuration...");
            let path = init_config()?;
            log_info("📝", format!("Config initialized at {}", path.display()));
            println!("Configuration written to {}", path.display().to_string().green());
            Ok(true)
        }
        Commands::Weather { city, lat, lon } => {
            let coords = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Coordinates { lat: *lat, lon: *lon }),
                _ => None,
            };
            show_weather(config, coords, city.as_deref()).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Chat => Ok(false),
    }
}

/// Print current conditions for a location, or the default city
pub async fn show_weather(config: &Config, coords: Option<Coordinates>, city: Option<&str>) -> Result<()> {
    let client = OpenWeatherClient::from_config(&config.weather)
        .context("Weather lookup is not configured")?;
    let city = city.unwrap_or(&config.weather.default_city);

    let snapshot = fetch_with_fallback(&client, coords, city)
        .await
        .context("Failed to fetch weather")?;
    println!("{}", format_weather(&snapshot));
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("Agrimate v{}", env!("CARGO_PKG_VERSION"));
    println!("   A multilingual farming assistant");
}

fn format_weather(snapshot: &WeatherSnapshot) -> String {
    let place = if snapshot.city_name.is_empty() {
        "Unknown location"
    } else {
        snapshot.city_name.as_str()
    };
    format!(
        "{}\n  {:.1}°C, {}\n  Humidity: {:.0}%\n  Wind: {:.1} m/s",
        place.bold(),
        snapshot.temperature,
        snapshot.description,
        snapshot.humidity,
        snapshot.wind_speed_mps
    )
}
