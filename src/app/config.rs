use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::{
    DEFAULT_GEMINI_API_KEY_ENV, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K, DEFAULT_TOP_P,
    DEFAULT_WEATHER_API_KEY_ENV, DEFAULT_WEATHER_BASE_URL, DEFAULT_WEATHER_CITY,
    LOCAL_REPLY_DELAY_MS, RESPONDER_TIMEOUT_SECS,
};
use crate::responders::{PromptMode, ResponderKind};
use crate::session::Locale;
use crate::voice::VoicePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conversation language; unknown codes fall back to English
    #[serde(default, deserialize_with = "deserialize_locale_or_default")]
    pub locale: Locale,

    /// Which responder answers and how long it may take
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Voice input configuration
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Weather lookup configuration
    #[serde(default)]
    pub weather: WeatherConfig,
}

fn deserialize_locale_or_default<'de, D>(deserializer: D) -> Result<Locale, D::Error>
where
    D: Deserializer<'de>,
{
    let code = String::deserialize(deserializer)?;
    Ok(code.parse().unwrap_or_else(|e| {
        warn!(error = %e, "Unsupported locale in config, falling back to English");
        Locale::default()
    }))
}

/// Responder selection and request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// local or gemini
    pub kind: ResponderKind,
    /// Upper bound on a single reply
    pub timeout_secs: u64,
    /// Simulated typing delay of the local responder
    pub reply_delay_ms: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            kind: ResponderKind::Local,
            timeout_secs: RESPONDER_TIMEOUT_SECS,
            reply_delay_ms: LOCAL_REPLY_DELAY_MS,
        }
    }
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Environment variable containing API key
    pub api_key_env: String,
    pub model: String,
    pub base_url: String,
    /// single_turn or multi_turn
    pub mode: PromptMode,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_GEMINI_API_KEY_ENV.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            mode: PromptMode::SingleTurn,
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Voice input configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// fill_input leaves the transcript for editing, auto_submit sends it
    pub policy: VoicePolicy,
}

/// Weather lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Environment variable containing API key
    pub api_key_env: String,
    pub base_url: String,
    /// Used when the location is unknown or the coordinate lookup fails
    pub default_city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_WEATHER_API_KEY_ENV.to_string(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            default_city: DEFAULT_WEATHER_CITY.to_string(),
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    // Get config directories
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = PathBuf::from(".agrimate/config.toml");

    load_config_from(&[global_config, local_config])
}

/// Layer defaults, the given TOML files (later wins) and `AGRIMATE_` env vars
pub fn load_config_from(files: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // Add environment variables (AGRIMATE_ prefix, `__` for nesting)
    figment = figment.merge(Env::prefixed("AGRIMATE_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Load a single explicit configuration file on top of the defaults
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    load_config_from(&[path.to_path_buf()])
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "agrimate") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("agrimate");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path of the global config file.
pub fn init_config() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    Ok(config_file)
}
