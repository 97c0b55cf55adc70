//! SQLite persistence boundary for conversation history.
//!
//! Provides the `Database` connection wrapper, schema migrations, and the
//! `TurnRepository` implementing append, windowed-read, and clear with
//! strict per-user ordering.

pub mod db;
pub mod migrations;
pub mod turns;

pub use db::Database;
pub use turns::TurnRepository;
