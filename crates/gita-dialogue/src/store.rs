//! Conversation history stores.
//!
//! The storage medium sits behind the [`ConversationStore`] trait: the engine
//! only needs append, windowed-read, and clear with strict per-user ordering.
//! Two implementations are provided: a concurrent in-memory store and a
//! durable SQLite-backed store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use gita_core::types::ConversationTurn;
use gita_storage::{Database, TurnRepository};

use crate::error::DialogueError;
use crate::types::ConversationWindow;

/// Per-user ordered turn history.
///
/// Contract: turns for one user are strictly ordered by arrival and never
/// reordered; `clear` is idempotent; `recent_window` returns an empty window
/// (not an error) for an unknown user.
pub trait ConversationStore: Send + Sync {
    /// Append a turn atomically. Appends for the same user are serialized.
    fn append(&self, user_key: &str, turn: ConversationTurn) -> Result<(), DialogueError>;

    /// The most recent turns respecting both `max_turns` and the `max_chars`
    /// character budget, dropping oldest first. A turn is never split.
    fn recent_window(
        &self,
        user_key: &str,
        max_turns: usize,
        max_chars: usize,
    ) -> Result<ConversationWindow, DialogueError>;

    /// Remove all turns for the user. Clearing an empty history succeeds.
    fn clear(&self, user_key: &str) -> Result<(), DialogueError>;
}

/// Assemble a window from a chronological turn list under both budgets.
///
/// Walks backwards from the newest turn, admitting whole turns while both
/// the count and character budgets hold, then restores chronological order.
fn apply_window(
    turns: &[ConversationTurn],
    max_turns: usize,
    max_chars: usize,
) -> ConversationWindow {
    let mut selected: Vec<ConversationTurn> = Vec::new();
    let mut chars = 0usize;

    for turn in turns.iter().rev() {
        if selected.len() >= max_turns {
            break;
        }
        let len = turn.char_len();
        if chars + len > max_chars {
            break;
        }
        chars += len;
        selected.push(turn.clone());
    }

    selected.reverse();
    ConversationWindow { turns: selected }
}

// =============================================================================
// MemoryConversationStore
// =============================================================================

/// In-memory store with per-user mutual exclusion.
///
/// The outer `RwLock` only guards the map of users; each user's turn vec has
/// its own mutex, so operations on different users never block each other.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    users: RwLock<HashMap<String, Arc<Mutex<Vec<ConversationTurn>>>>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the user's turn list, creating it on first append.
    fn entry(&self, user_key: &str) -> Result<Arc<Mutex<Vec<ConversationTurn>>>, DialogueError> {
        {
            let users = self
                .users
                .read()
                .map_err(|e| DialogueError::History(format!("user map lock poisoned: {}", e)))?;
            if let Some(list) = users.get(user_key) {
                return Ok(Arc::clone(list));
            }
        }

        let mut users = self
            .users
            .write()
            .map_err(|e| DialogueError::History(format!("user map lock poisoned: {}", e)))?;
        Ok(Arc::clone(
            users.entry(user_key.to_string()).or_default(),
        ))
    }
}

impl ConversationStore for MemoryConversationStore {
    fn append(&self, user_key: &str, turn: ConversationTurn) -> Result<(), DialogueError> {
        let list = self.entry(user_key)?;
        let mut turns = list
            .lock()
            .map_err(|e| DialogueError::History(format!("turn list lock poisoned: {}", e)))?;
        turns.push(turn);
        Ok(())
    }

    fn recent_window(
        &self,
        user_key: &str,
        max_turns: usize,
        max_chars: usize,
    ) -> Result<ConversationWindow, DialogueError> {
        let list = {
            let users = self
                .users
                .read()
                .map_err(|e| DialogueError::History(format!("user map lock poisoned: {}", e)))?;
            match users.get(user_key) {
                Some(list) => Arc::clone(list),
                None => return Ok(ConversationWindow::default()),
            }
        };

        let turns = list
            .lock()
            .map_err(|e| DialogueError::History(format!("turn list lock poisoned: {}", e)))?;
        Ok(apply_window(&turns, max_turns, max_chars))
    }

    fn clear(&self, user_key: &str) -> Result<(), DialogueError> {
        let list = {
            let users = self
                .users
                .read()
                .map_err(|e| DialogueError::History(format!("user map lock poisoned: {}", e)))?;
            match users.get(user_key) {
                Some(list) => Arc::clone(list),
                None => return Ok(()),
            }
        };

        let mut turns = list
            .lock()
            .map_err(|e| DialogueError::History(format!("turn list lock poisoned: {}", e)))?;
        turns.clear();
        Ok(())
    }
}

// =============================================================================
// SqliteConversationStore
// =============================================================================

/// Durable store delegating to the SQLite turn repository.
///
/// Ordering across restarts comes from the repository's monotonic sequence
/// column. The window's character budget is applied after the turn-count
/// fetch, so the repository read stays a single indexed query.
pub struct SqliteConversationStore {
    repo: TurnRepository,
}

impl SqliteConversationStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            repo: TurnRepository::new(db),
        }
    }
}

impl ConversationStore for SqliteConversationStore {
    fn append(&self, user_key: &str, turn: ConversationTurn) -> Result<(), DialogueError> {
        self.repo.save(user_key, &turn)?;
        Ok(())
    }

    fn recent_window(
        &self,
        user_key: &str,
        max_turns: usize,
        max_chars: usize,
    ) -> Result<ConversationWindow, DialogueError> {
        let turns = self.repo.recent(user_key, max_turns)?;
        Ok(apply_window(&turns, max_turns, max_chars))
    }

    fn clear(&self, user_key: &str) -> Result<(), DialogueError> {
        self.repo.clear(user_key)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
