//! Session entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::SessionKey;
use crate::snapshot::StorageSnapshot;

/// Lifecycle status of a cached entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Created by setup, not yet validated and published.
    Pending,
    /// Validated (or accepted without a validate procedure); restorable.
    Valid,
    /// Failed validation after a restore; ignored by lookups until replaced.
    Invalid,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Pending => write!(f, "pending"),
            EntryStatus::Valid => write!(f, "valid"),
            EntryStatus::Invalid => write!(f, "invalid"),
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EntryStatus::Pending),
            "valid" => Ok(EntryStatus::Valid),
            "invalid" => Ok(EntryStatus::Invalid),
            _ => anyhow::bail!("Invalid entry status: {s}. Valid values: pending, valid, invalid"),
        }
    }
}

/// One cached session: the snapshot to restore plus bookkeeping.
///
/// Entries are replaced, never edited in place: when a cached session goes
/// stale, the re-run of setup produces a whole new entry under the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Display id for logs and the CLI.
    pub id: String,
    /// Canonical key derived from the caller's identifier.
    pub key: SessionKey,
    /// Hash of the setup procedure's source, when the host supplied one.
    /// Persisted entries are only honored when this still matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Captured cookies and per-origin storage.
    pub snapshot: StorageSnapshot,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(key: SessionKey, fingerprint: Option<String>, snapshot: StorageSnapshot) -> Self {
        Self {
            id: Self::generate_id(),
            key,
            fingerprint,
            snapshot,
            status: EntryStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn generate_id() -> String {
        let timestamp = Utc::now().timestamp();
        let uuid_short = uuid::Uuid::new_v4()
            .to_string()
            .split('-')
            .next()
            .unwrap_or("")
            .to_string();
        format!("entry-{uuid_short}-{timestamp}")
    }

    pub fn mark_valid(&mut self) {
        self.status = EntryStatus::Valid;
    }

    pub fn mark_invalid(&mut self) {
        self.status = EntryStatus::Invalid;
    }

    pub fn is_valid(&self) -> bool {
        self.status == EntryStatus::Valid
    }

    /// True when `fingerprint` matches the one this entry was created with.
    /// Entries without a fingerprint only match definitions without one.
    pub fn matches_fingerprint(&self, fingerprint: Option<&str>) -> bool {
        self.fingerprint.as_deref() == fingerprint
    }
}
