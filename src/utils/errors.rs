use thiserror::Error;

/// Main error type for Agrimate
///
/// Boundary failures stay in their own enums (`ResponderError`, `VoiceError`,
/// `WeatherError`); this one covers input the shell and config reject.
#[derive(Error, Debug)]
pub enum AgrimateError {
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
