//! Driver seam between the session engine and the host automation engine.
//!
//! This module provides:
//! - The [`Driver`] trait the host test runner implements
//! - Value types for origins, cookies, and storage kinds
//! - An in-memory driver used by tests and embedding examples

mod driver;
mod memory;

pub use driver::{Cookie, Driver, Origin, StorageKind, BLANK_URL};
pub use memory::MemoryDriver;
