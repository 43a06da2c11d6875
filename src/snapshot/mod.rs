//! Storage snapshot capture and restore.
//!
//! This module provides:
//! - Snapshot types (cookies plus per-origin local/session storage)
//! - Capture and restore against a [`crate::browser::Driver`]
//! - The environment-clearing step run before every session invocation

mod transfer;
mod types;

pub use transfer::{capture, clear_environment, restore};
pub use types::{OriginStorage, RestoreIssue, RestoreTarget, StorageSnapshot};
