use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identifier of a turn, unique and increasing within one session
pub type TurnId = u64;

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Display hint for a turn; never drives control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Welcome,
    Message,
    Failure,
}

/// One exchanged message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    id: TurnId,
    text: String,
    author: Author,
    kind: TurnKind,
    created_at: DateTime<Local>,
}

impl Turn {
    pub(crate) fn new(id: TurnId, author: Author, kind: TurnKind, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            author,
            kind,
            created_at: Local::now(),
        }
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    /// Wall-clock label for display, e.g. `14:05:09`
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M:%S").to_string()
    }
}
