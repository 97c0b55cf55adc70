//! Repository for conversation turns, keyed by the caller-supplied user key.
//!
//! Ordering guarantee: `recent` returns turns for one user in arrival order,
//! as fixed by the monotonic `seq` column at insert time.

use std::sync::Arc;

use rusqlite::OptionalExtension;
use uuid::Uuid;

use gita_core::error::GitaError;
use gita_core::types::{ConversationTurn, Role};

use crate::db::Database;

/// Repository for persisted conversation turns.
pub struct TurnRepository {
    db: Arc<Database>,
}

impl TurnRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a turn for the given user key.
    pub fn save(&self, user_key: &str, turn: &ConversationTurn) -> Result<(), GitaError> {
        let cited = serde_json::to_string(&turn.cited_verse_ids)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO turns (id, user_key, user_id, role, text, cited_verse_ids, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    turn.id.to_string(),
                    user_key,
                    turn.user_id,
                    turn.role.as_str(),
                    turn.text,
                    cited,
                    turn.timestamp,
                ],
            )
            .map_err(|e| GitaError::Storage(format!("Failed to save turn: {}", e)))?;
            Ok(())
        })
    }

    /// Return the most recent `limit` turns for a user, in chronological
    /// (oldest-first) order. An unknown user yields an empty vec.
    pub fn recent(&self, user_key: &str, limit: usize) -> Result<Vec<ConversationTurn>, GitaError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, role, text, cited_verse_ids, timestamp
                     FROM turns
                     WHERE user_key = ?1
                     ORDER BY seq DESC
                     LIMIT ?2",
                )
                .map_err(|e| GitaError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![user_key, limit as i64], |row| {
                    Ok(row_to_turn(row))
                })
                .map_err(|e| GitaError::Storage(e.to_string()))?;

            let mut turns = Vec::new();
            for row in rows {
                let turn = row.map_err(|e| GitaError::Storage(e.to_string()))??;
                turns.push(turn);
            }
            // Rows arrive newest-first; callers expect chronological order.
            turns.reverse();
            Ok(turns)
        })
    }

    /// Delete all turns for a user. Idempotent.
    pub fn clear(&self, user_key: &str) -> Result<(), GitaError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM turns WHERE user_key = ?1", [user_key])
                .map_err(|e| GitaError::Storage(format!("Failed to clear turns: {}", e)))?;
            Ok(())
        })
    }

    /// Number of turns stored for a user.
    pub fn count_for_user(&self, user_key: &str) -> Result<usize, GitaError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM turns WHERE user_key = ?1",
                    [user_key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| GitaError::Storage(e.to_string()))?
                .unwrap_or(0);
            Ok(count as usize)
        })
    }
}

/// Map a row to a `ConversationTurn`, deferring fallible parsing out of the
/// rusqlite callback.
fn row_to_turn(row: &rusqlite::Row<'_>) -> Result<ConversationTurn, GitaError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| GitaError::Storage(e.to_string()))?;
    let user_id: Option<String> = row
        .get(1)
        .map_err(|e| GitaError::Storage(e.to_string()))?;
    let role_str: String = row
        .get(2)
        .map_err(|e| GitaError::Storage(e.to_string()))?;
    let text: String = row
        .get(3)
        .map_err(|e| GitaError::Storage(e.to_string()))?;
    let cited_json: String = row
        .get(4)
        .map_err(|e| GitaError::Storage(e.to_string()))?;
    let timestamp: i64 = row
        .get(5)
        .map_err(|e| GitaError::Storage(e.to_string()))?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| GitaError::Storage(format!("Invalid turn id {}: {}", id_str, e)))?;
    let role = Role::parse(&role_str)
        .ok_or_else(|| GitaError::Storage(format!("Invalid role: {}", role_str)))?;
    let cited_verse_ids: Vec<String> = serde_json::from_str(&cited_json)?;

    Ok(ConversationTurn {
        id,
        user_id,
        role,
        text,
        cited_verse_ids,
        timestamp,
    })
}
