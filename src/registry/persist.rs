//! Cross-run persisted session store.
//!
//! In the interactive dev loop, sessions survive full-suite restarts. Each
//! entry lives in its own JSON file at `<store_dir>/<key-digest>.json`,
//! written atomically via a temp file rename. A store-level advisory lock
//! (`fs2`) keeps a concurrently running CLI from reading half-cleared state.
//!
//! Advisory locks are cooperative - all participants must go through this
//! module for the locking to be effective.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::identifier::SessionKey;

use super::types::SessionEntry;

const LOCK_FILE: &str = ".lock";

/// A session entry as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedEntry {
    /// Sha256 hex digest of the session key; also the file stem.
    pub digest: String,
    pub saved_at: DateTime<Utc>,
    pub entry: SessionEntry,
}

/// Directory-backed store of persisted session entries.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, digest: &str) -> PathBuf {
        self.root.join(format!("{digest}.json"))
    }

    /// Acquire the store-level advisory lock. The lock is held until the
    /// returned handle is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create session store: {}", self.root.display())
        })?;
        let lock_path = self.root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        if exclusive {
            file.lock_exclusive()
                .with_context(|| format!("Failed to lock store: {}", lock_path.display()))?;
        } else {
            file.lock_shared()
                .with_context(|| format!("Failed to lock store: {}", lock_path.display()))?;
        }
        Ok(file)
    }

    /// Write an entry, replacing any persisted entry under the same key.
    pub fn save(&self, entry: &SessionEntry) -> Result<PathBuf> {
        let digest = entry.key.digest();
        let record = PersistedEntry {
            digest: digest.clone(),
            saved_at: Utc::now(),
            entry: entry.clone(),
        };

        let _guard = self.lock(true)?;
        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize session entry")?;
        let path = self.entry_path(&digest);
        let mut staged = tempfile::NamedTempFile::new_in(&self.root)
            .with_context(|| format!("Failed to stage entry in {}", self.root.display()))?;
        staged
            .write_all(content.as_bytes())
            .context("Failed to write staged session entry")?;
        staged
            .persist(&path)
            .with_context(|| format!("Failed to publish session entry: {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, key: &SessionKey) -> Result<Option<PersistedEntry>> {
        self.load_by_digest(&key.digest())
    }

    pub fn load_by_digest(&self, digest: &str) -> Result<Option<PersistedEntry>> {
        let path = self.entry_path(digest);
        if !path.exists() {
            return Ok(None);
        }
        let _guard = self.lock(false)?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session entry: {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session entry: {}", path.display()))?;
        Ok(Some(record))
    }

    /// Remove the persisted entry for `key`. Returns false when none existed.
    pub fn remove(&self, key: &SessionKey) -> Result<bool> {
        let path = self.entry_path(&key.digest());
        if !path.exists() {
            return Ok(false);
        }
        let _guard = self.lock(true)?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove session entry: {}", path.display()))?;
        Ok(true)
    }

    /// All persisted entries, newest first. Unparsable files are skipped
    /// with a warning rather than failing the whole listing.
    pub fn list(&self) -> Result<Vec<PersistedEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let _guard = self.lock(false)?;
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read session store: {}", self.root.display()))?;

        let mut records: Vec<PersistedEntry> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session entry: {}", path.display()))?;
            match serde_json::from_str::<PersistedEntry>(&content) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping unparsable session entry"
                    );
                }
            }
        }

        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(records)
    }

    /// Find one entry by digest or digest prefix.
    ///
    /// Tries an exact match first, then scans for prefix matches. More than
    /// one prefix match is an error rather than a guess.
    pub fn find_by_digest_prefix(&self, prefix: &str) -> Result<Option<PersistedEntry>> {
        if self.entry_path(prefix).exists() {
            return self.load_by_digest(prefix);
        }

        let matches: Vec<PersistedEntry> = self
            .list()?
            .into_iter()
            .filter(|record| record.digest.starts_with(prefix))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => bail!("Ambiguous digest prefix '{prefix}': matches {n} saved sessions"),
        }
    }

    /// Remove every persisted entry. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let _guard = self.lock(true)?;
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read session store: {}", self.root.display()))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session entry: {}", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }
}
