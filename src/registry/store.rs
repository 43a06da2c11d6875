//! In-memory session registry, scoped to one spec run.
//!
//! Single-threaded cooperative use only: the lifecycle orchestrator is the
//! sole mutator, and tests run serially, so no interior locking is needed.

use std::collections::HashMap;

use crate::identifier::SessionKey;

use super::types::SessionEntry;

#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<SessionKey, SessionEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SessionKey) -> Option<&SessionEntry> {
        self.entries.get(key)
    }

    /// Look up an entry that is actually restorable.
    pub fn get_valid(&self, key: &SessionKey) -> Option<&SessionEntry> {
        self.entries.get(key).filter(|entry| entry.is_valid())
    }

    /// Insert an entry, replacing any previous entry under the same key.
    pub fn put(&mut self, entry: SessionEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Mark the entry under `key` invalid. Returns false when no entry exists.
    pub fn invalidate(&mut self, key: &SessionKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.mark_invalid();
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.values()
    }
}
