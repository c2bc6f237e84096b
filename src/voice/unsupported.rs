use tokio::sync::mpsc::UnboundedSender;

use super::traits::SpeechRecognizer;
use super::types::{RecognitionEvent, VoiceError};

/// Recognizer for hosts without any speech facility, such as a terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(
        &self,
        _language_tag: &str,
        _events: UnboundedSender<RecognitionEvent>,
    ) -> Result<(), VoiceError> {
        Err(VoiceError::UnsupportedCapability)
    }

    fn stop(&self) {}
}
