//! Database schema migrations.
//!
//! Applies the initial schema: the turns table and the schema_migrations
//! tracking table.

use rusqlite::Connection;
use tracing::info;

use gita_core::error::GitaError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), GitaError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| GitaError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| GitaError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// The `seq` column is the authoritative per-user ordering: timestamps have
/// second resolution and two turns of one exchange share one.
fn apply_v1(conn: &Connection) -> Result<(), GitaError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS turns (
            seq             INTEGER PRIMARY KEY AUTOINCREMENT,
            id              TEXT NOT NULL UNIQUE,
            user_key        TEXT NOT NULL,
            user_id         TEXT,
            role            TEXT NOT NULL
                            CHECK (role IN ('user', 'assistant')),
            text            TEXT NOT NULL DEFAULT '',
            cited_verse_ids TEXT NOT NULL DEFAULT '[]',
            timestamp       INTEGER NOT NULL,
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_turns_user_key
            ON turns (user_key, seq DESC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| GitaError::Storage(format!("Failed to apply v1 schema: {}", e)))?;

    Ok(())
}
