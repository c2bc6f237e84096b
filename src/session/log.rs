use super::turn::{Turn, TurnId};
use crate::constants::FIRST_TURN_ID;

/// Append-only, ordered record of a conversation
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    turns: Vec<Turn>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Add a turn to the end of the log
    ///
    /// Ids must keep increasing; the session hands them out through `next_id`.
    pub fn append(&mut self, turn: Turn) {
        debug_assert!(
            self.turns.last().map_or(true, |last| last.id() < turn.id()),
            "turn ids must increase"
        );
        self.turns.push(turn);
    }

    /// Snapshot of every turn in conversation order
    pub fn all(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Id the next appended turn should carry
    pub fn next_id(&self) -> TurnId {
        self.turns.last().map_or(FIRST_TURN_ID, |t| t.id() + 1)
    }
}
