use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    app::Config,
    cli::OutputFormat,
    responders::Responder,
    session::{Locale, Session, SessionSettings, Submission, TurnKind},
};

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// The question that was asked
    pub prompt: String,
    /// The assistant's reply (or the localized failure message)
    pub response: String,
    /// Whether the reply is a failure turn
    pub failed: bool,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub responder: String,
    pub locale: Locale,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Non-interactive runner for answering a single question
pub struct NonInteractiveRunner {
    responder: Arc<dyn Responder>,
    locale: Locale,
    settings: SessionSettings,
}

impl NonInteractiveRunner {
    pub fn new(responder: Arc<dyn Responder>, config: &Config) -> Self {
        Self {
            responder,
            locale: config.locale,
            settings: SessionSettings {
                responder_timeout: Duration::from_secs(config.responder.timeout_secs),
            },
        }
    }

    /// Ask one question through a fresh session and wait for the answer
    pub async fn execute(&self, prompt: String) -> Result<NonInteractiveResult> {
        let start_time = Instant::now();
        let session = Session::new(Arc::clone(&self.responder), self.locale, self.settings.clone());

        if let Submission::Ignored(reason) = session.submit(&prompt) {
            bail!("Prompt was not sent: {:?}", reason);
        }
        session.wait_idle().await;

        let Some(reply) = session.last_turn().filter(|turn| !turn.is_user()) else {
            bail!("Session finished without a reply");
        };
        session.dispose();

        Ok(NonInteractiveResult {
            prompt,
            response: reply.text().to_string(),
            failed: reply.kind() == TurnKind::Failure,
            metadata: ExecutionMetadata {
                responder: self.responder.name().to_string(),
                locale: self.locale,
                duration_ms: start_time.elapsed().as_millis(),
            },
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => result.response.clone(),
        }
    }
}
