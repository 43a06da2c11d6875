//! CLI command implementations.

pub mod clear;
pub mod path;
pub mod sessions;
pub mod show;

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::registry::SessionStore;

/// Resolve the persisted store the CLI operates on.
///
/// An explicit `--store-dir` wins, then `sessile.toml` in the current
/// directory, then the platform default location.
pub fn resolve_store(store_dir: Option<PathBuf>) -> Result<SessionStore> {
    if let Some(dir) = store_dir {
        return Ok(SessionStore::new(dir));
    }
    let config = Config::load_or_default(&std::env::current_dir()?)?;
    Ok(SessionStore::new(config.store_dir))
}

/// Truncate a value for single-line display.
pub(crate) fn truncated(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let cut: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
