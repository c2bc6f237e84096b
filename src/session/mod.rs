/// Session management module - Gateway

mod dispatcher;
mod locale;
mod log;
mod turn;

pub use dispatcher::{
    IgnoreReason, Session, SessionEvent, SessionSettings, SessionStatus, Submission,
};
pub use locale::Locale;
pub use log::MessageLog;
pub use turn::{Author, Turn, TurnId, TurnKind};
