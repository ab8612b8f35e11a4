//! Bounded turn log kept inside a session.
//!
//! The log lives under [`CHAT_HISTORY_KEY`] and never holds more than
//! `2 * max_turns` entries after a mutation. Trimming drops the oldest turns.

use bonechat_types::chat::{CHAT_HISTORY_KEY, Role, SessionState, Turn, TurnLog};
use tracing::warn;

use crate::session::store::SessionStore;

/// Reads and writes the turn log of a session.
#[derive(Debug, Clone, Copy)]
pub struct TurnStore {
    max_turns: usize,
}

impl TurnStore {
    /// Create a store retaining `max_turns` user/model pairs (at least one).
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Maximum number of stored turns.
    pub fn capacity(&self) -> usize {
        self.max_turns * 2
    }

    /// Current log, oldest first. Absent or unreadable state is an empty log.
    pub fn get<S: SessionStore + ?Sized>(&self, session: &S) -> TurnLog {
        match SessionState::from_stored(session.get(CHAT_HISTORY_KEY)) {
            Ok(state) => state.turn_log,
            Err(e) => {
                warn!(error = %e, "Stored chat history is unreadable, starting empty");
                TurnLog::new()
            }
        }
    }

    /// Append one turn, trim to capacity, and write the log back.
    pub fn append<S: SessionStore + ?Sized>(
        &self,
        session: &mut S,
        role: Role,
        content: impl Into<String>,
    ) {
        let mut state = SessionState {
            turn_log: self.get(session),
        };
        state.turn_log.push(Turn::new(role, content));

        let excess = state.turn_log.len().saturating_sub(self.capacity());
        if excess > 0 {
            state.turn_log.drain(..excess);
        }

        Self::write(session, &state);
    }

    /// Replace the log with an empty one.
    pub fn reset<S: SessionStore + ?Sized>(&self, session: &mut S) {
        Self::write(session, &SessionState::default());
    }

    fn write<S: SessionStore + ?Sized>(session: &mut S, state: &SessionState) {
        session.set(CHAT_HISTORY_KEY, state.to_stored());
        session.mark_dirty();
    }
}

impl Default for TurnStore {
    fn default() -> Self {
        Self::new(bonechat_types::chat::DEFAULT_MAX_TURNS)
    }
}
