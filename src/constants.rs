/// Constants module to avoid magic numbers in the codebase

// Remote responder (Gemini generative-language API)
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GEMINI_API_KEY_ENV: &str = "GOOGLE_API_KEY";

// Generation parameters
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_K: u32 = 40;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

// Weather (OpenWeather current conditions)
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_WEATHER_CITY: &str = "New Delhi";

// Timeouts
pub const RESPONDER_TIMEOUT_SECS: u64 = 30;
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const WEATHER_REQUEST_TIMEOUT_SECS: u64 = 15;

// Local rule engine
pub const LOCAL_REPLY_DELAY_MS: u64 = 1500; // simulated typing delay

// Session
pub const SESSION_EVENT_CAPACITY: usize = 64;
pub const FIRST_TURN_ID: u64 = 1;

// Screens known to the navigation shell
pub const SCREEN_DASHBOARD: &str = "dashboard";
pub const SCREEN_CHAT: &str = "chat";
pub const KNOWN_SCREENS: &[&str] = &[
    "dashboard",
    "disease-detection",
    "chat",
    "crop-recommendations",
    "weather",
    "soil-analysis",
    "market-prices",
];
