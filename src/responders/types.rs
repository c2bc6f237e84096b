use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Why a responder could not produce a reply
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Responder crashed: {0}")]
    Crashed(String),
}

impl ResponderError {
    /// Short machine-friendly label, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ResponderError::Network(_) => "network",
            ResponderError::Timeout(_) => "timeout",
            ResponderError::Quota(_) => "quota",
            ResponderError::Api { .. } => "api",
            ResponderError::MalformedResponse(_) => "malformed",
            ResponderError::MissingApiKey(_) => "missing_api_key",
            ResponderError::Crashed(_) => "crashed",
        }
    }
}

/// Which responder backs the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResponderKind {
    /// Keyword rule table, no network
    #[default]
    Local,
    /// Google Gemini generative-language API
    Gemini,
}

/// How much of the conversation is sent to the remote model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// Only the latest user message, wrapped in the assistant preamble
    #[default]
    SingleTurn,
    /// Seed exchange plus the prior conversation
    MultiTurn,
}
