// Gateway module for responders - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod gemini;
mod local;
mod traits;
mod types;

// Public re-exports - the ONLY way to access responder functionality
pub use factory::ResponderFactory;
pub use gemini::GeminiResponder;
pub use local::{canned_reply, classify, LocalResponder, Topic};
pub use traits::Responder;
#[cfg(test)]
pub use traits::MockResponder;
pub use types::{PromptMode, ResponderError, ResponderKind};
