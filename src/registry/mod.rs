//! Session registry.
//!
//! This module provides:
//! - Entry types shared by the in-memory and persisted stores
//! - The in-memory registry, scoped to one spec run
//! - The cross-run persisted store used by the interactive dev loop

mod persist;
mod store;
mod types;

pub use persist::{PersistedEntry, SessionStore};
pub use store::Registry;
pub use types::{EntryStatus, SessionEntry};
