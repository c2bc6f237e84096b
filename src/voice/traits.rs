use tokio::sync::mpsc::UnboundedSender;

use super::types::{RecognitionEvent, VoiceError};

/// Platform speech-to-text facility
///
/// Implementations acquire the microphone in `start` and release it in `stop`.
/// `stop` must be idempotent and safe to call when nothing is running.
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the platform offers speech recognition at all
    fn is_supported(&self) -> bool;

    /// Begin a single-utterance capture in `language_tag` (BCP-47)
    fn start(
        &self,
        language_tag: &str,
        events: UnboundedSender<RecognitionEvent>,
    ) -> Result<(), VoiceError>;

    /// Stop capturing and release the microphone
    fn stop(&self);
}
