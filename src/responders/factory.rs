use std::sync::Arc;
use std::time::Duration;

use super::gemini::GeminiResponder;
use super::local::LocalResponder;
use super::traits::Responder;
use super::types::{ResponderError, ResponderKind};
use crate::app::Config;

/// Factory for creating the configured reply backend
pub struct ResponderFactory;

impl ResponderFactory {
    /// Create the responder named by `config.responder.kind`
    pub fn create(config: &Config) -> Result<Arc<dyn Responder>, ResponderError> {
        Self::create_kind(config.responder.kind, config)
    }

    /// Create a specific responder kind, taking the remaining settings from `config`
    pub fn create_kind(kind: ResponderKind, config: &Config) -> Result<Arc<dyn Responder>, ResponderError> {
        match kind {
            ResponderKind::Local => Ok(Arc::new(LocalResponder::new(Duration::from_millis(
                config.responder.reply_delay_ms,
            )))),
            ResponderKind::Gemini => Ok(Arc::new(GeminiResponder::from_config(
                &config.gemini,
                Duration::from_secs(config.responder.timeout_secs),
            )?)),
        }
    }
}
