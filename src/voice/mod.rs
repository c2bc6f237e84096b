// Gateway module for voice input - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod capture;
mod traits;
mod types;
mod unsupported;

// Public re-exports - the ONLY way to access voice functionality
pub use capture::VoiceCapture;
pub use traits::SpeechRecognizer;
pub use types::{RecognitionErrorKind, RecognitionEvent, VoiceDelivery, VoiceError, VoicePolicy};
pub use unsupported::UnsupportedRecognizer;
