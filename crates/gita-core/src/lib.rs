//! Shared types, errors, and configuration for the Gita dialogue engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::GitaConfig;
pub use error::{GitaError, Result};
pub use types::*;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for an embedding application.
///
/// `level` is used when `RUST_LOG` is not set. Safe to call once per process;
/// a second call returns without reinitializing.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
