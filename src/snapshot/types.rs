//! Snapshot types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::browser::{Cookie, Origin, StorageKind};

/// Captured browser state for one session: cookies globally, storage per
/// origin. Ordered maps keep the serialized form deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub origins: BTreeMap<Origin, OriginStorage>,
}

impl StorageSnapshot {
    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }

    /// Total number of storage entries across all origins and both areas.
    pub fn entry_count(&self) -> usize {
        self.origins
            .values()
            .map(|slots| slots.local.len() + slots.session.len())
            .sum()
    }
}

/// The two storage areas of a single origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginStorage {
    #[serde(default)]
    pub local: BTreeMap<String, String>,
    #[serde(default)]
    pub session: BTreeMap<String, String>,
}

impl OriginStorage {
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.session.is_empty()
    }
}

/// What a failed restore write was targeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    Cookies,
    Storage { origin: Origin, kind: StorageKind },
}

/// A non-fatal problem encountered while reapplying a snapshot.
///
/// Restore continues past individual failures; issues are surfaced to the
/// orchestrator, which logs them as warnings.
#[derive(Debug, Clone)]
pub struct RestoreIssue {
    pub target: RestoreTarget,
    pub message: String,
}

impl std::fmt::Display for RestoreIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            RestoreTarget::Cookies => write!(f, "cookies: {}", self.message),
            RestoreTarget::Storage { origin, kind } => {
                write!(f, "{kind} for {origin}: {}", self.message)
            }
        }
    }
}
