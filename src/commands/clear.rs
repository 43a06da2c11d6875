//! Clear all saved sessions
//! Usage: sessile clear
//!
//! The CLI reaches the cross-run store; in-memory registries live inside a
//! suite run and start empty anyway.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use super::resolve_store;

pub fn execute(store_dir: Option<PathBuf>) -> Result<()> {
    let store = resolve_store(store_dir)?;
    let removed = store.clear_all()?;

    if removed == 0 {
        println!("No saved sessions in {}", store.path().display());
    } else {
        println!(
            "{} Cleared {removed} saved session(s) from {}",
            "✓".green().bold(),
            store.path().display()
        );
    }

    Ok(())
}
