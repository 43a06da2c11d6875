//! Saved session details
//! Usage: sessile show <digest-or-prefix>
//!
//! Storage values and cookie values are withheld on purpose; saved sessions
//! usually hold credentials.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::{resolve_store, truncated};

pub fn execute(digest: String, store_dir: Option<PathBuf>) -> Result<()> {
    let store = resolve_store(store_dir)?;

    let Some(record) = store.find_by_digest_prefix(&digest)? else {
        bail!("No saved session matches '{digest}'");
    };

    let entry = &record.entry;
    println!("{}", "Saved session".bold().blue());
    println!("  Digest:      {}", record.digest.cyan());
    println!("  Key:         {}", entry.key);
    println!("  Entry id:    {}", entry.id);
    println!("  Status:      {}", entry.status);
    println!("  Created:     {}", entry.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Saved:       {}", record.saved_at.format("%Y-%m-%d %H:%M:%S"));
    match &entry.fingerprint {
        Some(fingerprint) => println!("  Setup hash:  {}", truncated(fingerprint, 12)),
        None => println!("  Setup hash:  (none)"),
    }

    println!();
    println!("{}", "Cookies".bold());
    if entry.snapshot.cookies.is_empty() {
        println!("  (none)");
    } else {
        for cookie in &entry.snapshot.cookies {
            println!("  {} ({})", cookie.name, cookie.domain);
        }
    }

    println!();
    println!("{}", "Origins".bold());
    if entry.snapshot.origins.is_empty() {
        println!("  (no storage captured)");
    } else {
        for (origin, slots) in &entry.snapshot.origins {
            println!(
                "  {}  local: {} key(s), session: {} key(s)",
                origin,
                slots.local.len(),
                slots.session.len()
            );
        }
    }

    Ok(())
}
