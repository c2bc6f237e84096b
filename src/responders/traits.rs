use async_trait::async_trait;

use super::types::ResponderError;
use crate::session::{Locale, Turn};

/// Core trait that every reply backend must implement
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce the assistant reply to `text`
    ///
    /// `history` holds the turns that preceded the user's message, oldest first.
    /// Implementations must always resolve; they never block the caller's thread.
    async fn respond(
        &self,
        text: &str,
        locale: Locale,
        history: &[Turn],
    ) -> Result<String, ResponderError>;

    /// Get the name of the responder
    fn name(&self) -> &str;

    /// Check if this is a local responder (no API calls)
    fn is_local(&self) -> bool;
}
