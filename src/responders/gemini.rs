use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::traits::Responder;
use super::types::{PromptMode, ResponderError};
use crate::app::GeminiConfig;
use crate::constants::HTTP_CONNECT_TIMEOUT_SECS;
use crate::session::{Author, Locale, Turn, TurnKind};

// Seed exchange that opens every multi-turn conversation
const SEED_USER: &str = "Hello, I am a farmer. I need help with my crops.";
const SEED_MODEL: &str = "Hello! I'm your farming assistant. How can I help you with your crops today?";

/// Responder that calls the Gemini `generateContent` REST endpoint
pub struct GeminiResponder {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    mode: PromptMode,
    generation: GenerationConfig,
    timeout: Duration,
}

impl GeminiResponder {
    /// Build from config, reading the API key from the configured env var
    pub fn from_config(config: &GeminiConfig, timeout: Duration) -> Result<Self, ResponderError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ResponderError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key, timeout)
    }

    pub fn new(
        config: &GeminiConfig,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ResponderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()
            .map_err(|e| ResponderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            mode: config.mode,
            timeout,
            generation: GenerationConfig {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    /// Assemble the request body for the configured prompt mode
    fn build_request(&self, text: &str, locale: Locale, history: &[Turn]) -> GenerateContentRequest {
        let contents = match self.mode {
            PromptMode::SingleTurn => vec![Content::user(single_turn_prompt(text, locale))],
            PromptMode::MultiTurn => multi_turn_contents(text, locale, history),
        };

        GenerateContentRequest {
            contents,
            generation_config: self.generation.clone(),
        }
    }
}

fn single_turn_prompt(text: &str, locale: Locale) -> String {
    format!(
        "You are a helpful farming assistant. Respond in {}. The user asked: {}",
        locale.language_name(),
        text
    )
}

fn multi_turn_contents(text: &str, locale: Locale, history: &[Turn]) -> Vec<Content> {
    let mut contents = vec![Content::user(SEED_USER.to_string()), Content::model(SEED_MODEL.to_string())];

    // Only real exchanges; the welcome and canned apologies are local text
    for turn in history.iter().filter(|t| t.kind() == TurnKind::Message) {
        contents.push(match turn.author() {
            Author::User => Content::user(turn.text().to_string()),
            Author::Assistant => Content::model(turn.text().to_string()),
        });
    }

    contents.push(Content::user(format!(
        "Respond in {}. {}",
        locale.language_name(),
        text
    )));
    contents
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn respond(
        &self,
        text: &str,
        locale: Locale,
        history: &[Turn],
    ) -> Result<String, ResponderError> {
        let body = self.build_request(text, locale, history);
        debug!(model = %self.model, contents = body.contents.len(), "Sending Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResponderError::Timeout(self.timeout)
                } else {
                    ResponderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::MalformedResponse(e.to_string()))?;

        extract_text(parsed)
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_local(&self) -> bool {
        false
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ResponderError> {
    response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
        .ok_or_else(|| ResponderError::MalformedResponse("no text in response candidates".into()))
}

fn map_http_error(status: StatusCode, body: &str) -> ResponderError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| w.error.message)
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        ResponderError::Quota(message)
    } else {
        ResponderError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

// Wire structures for the generateContent endpoint

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: "user",
            parts: vec![Part { text }],
        }
    }

    fn model(text: String) -> Self {
        Self {
            role: "model",
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
