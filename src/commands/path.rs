//! Print the persisted-store directory
//! Usage: sessile path

use anyhow::Result;
use std::path::PathBuf;

use super::resolve_store;

pub fn execute(store_dir: Option<PathBuf>) -> Result<()> {
    let store = resolve_store(store_dir)?;
    println!("{}", store.path().display());
    Ok(())
}
