pub mod app;
pub mod cli;
pub mod constants;
pub mod responders;
pub mod runtime;
pub mod session;
pub mod utils;
pub mod voice;
pub mod weather;

pub use app::{load_config, AppContext, Config};
pub use responders::{Responder, ResponderFactory};
pub use session::{Locale, Session, SessionEvent, Submission, Turn};
pub use utils::AgrimateError;
pub use voice::{SpeechRecognizer, VoiceCapture};
