//! Saved session listing
//! Usage: sessile sessions

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::registry::EntryStatus;

use super::{resolve_store, truncated};

/// List all saved sessions in the cross-run store, newest first.
pub fn execute(store_dir: Option<PathBuf>) -> Result<()> {
    let store = resolve_store(store_dir)?;
    let records = store.list()?;

    println!("{}", "Saved sessions".bold().blue());
    println!("{}", "─".repeat(78));

    if records.is_empty() {
        println!("(no saved sessions - store: {})", store.path().display());
        return Ok(());
    }

    for record in &records {
        let short = truncated(&record.digest, 12);
        let status = match record.entry.status {
            EntryStatus::Valid => "valid".green(),
            EntryStatus::Pending => "pending".yellow(),
            EntryStatus::Invalid => "invalid".red(),
        };
        println!(
            "  {}  {:<44}  {:<7}  {}",
            short.cyan(),
            truncated(record.entry.key.as_str(), 44),
            status,
            record.saved_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!(
        "{} saved session(s) in {}",
        records.len(),
        store.path().display()
    );

    Ok(())
}
