use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::TurnId;

/// Failure reported by a platform recognizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    #[error("no speech detected")]
    NoSpeech,
    #[error("capture aborted")]
    Aborted,
    #[error("audio capture failed")]
    AudioCapture,
    #[error("microphone permission denied")]
    NotAllowed,
    #[error("recognition service unreachable")]
    Network,
    #[error("{0}")]
    Other(String),
}

/// Voice input errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Speech recognition is not supported on this platform")]
    UnsupportedCapability,

    #[error("Already listening")]
    AlreadyListening,

    #[error("Speech recognition failed: {0}")]
    Recognition(#[from] RecognitionErrorKind),
}

/// Callbacks of a recognizer, delivered in order on a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Result(String),
    Error(RecognitionErrorKind),
    End,
}

/// What happens to a recognized utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicePolicy {
    /// Put the text in the input box for the user to confirm
    #[default]
    FillInput,
    /// Submit the text straight to the session
    AutoSubmit,
}

/// Where a delivered utterance ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceDelivery {
    /// Text for the input box
    Draft(String),
    /// Sent as the user turn with this id
    Submitted(TurnId),
}
