//! Capture, restore, and environment clearing against a driver.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::browser::{Driver, StorageKind};

use super::types::{OriginStorage, RestoreIssue, RestoreTarget, StorageSnapshot};

/// Snapshot the current browser state: all cookies, plus both storage areas
/// of every active origin. Origins with no storage at all are left out of
/// the snapshot.
pub fn capture(driver: &mut dyn Driver) -> Result<StorageSnapshot> {
    let cookies = driver.cookies()?;
    let mut origins = BTreeMap::new();

    for origin in driver.active_origins()? {
        let slots = OriginStorage {
            local: driver.read_storage(&origin, StorageKind::Local)?,
            session: driver.read_storage(&origin, StorageKind::Session)?,
        };
        if slots.is_empty() {
            continue;
        }
        origins.insert(origin, slots);
    }

    Ok(StorageSnapshot { cookies, origins })
}

/// Reapply a snapshot to the browser.
///
/// A failed write for one target does not stop the others; each failure
/// comes back as a [`RestoreIssue`] for the caller to surface.
pub fn restore(driver: &mut dyn Driver, snapshot: &StorageSnapshot) -> Vec<RestoreIssue> {
    let mut issues = Vec::new();

    if !snapshot.cookies.is_empty() {
        if let Err(err) = driver.set_cookies(&snapshot.cookies) {
            issues.push(RestoreIssue {
                target: RestoreTarget::Cookies,
                message: format!("{err:#}"),
            });
        }
    }

    for (origin, slots) in &snapshot.origins {
        for (kind, entries) in [
            (StorageKind::Local, &slots.local),
            (StorageKind::Session, &slots.session),
        ] {
            if entries.is_empty() {
                continue;
            }
            if let Err(err) = driver.write_storage(origin, kind, entries) {
                issues.push(RestoreIssue {
                    target: RestoreTarget::Storage {
                        origin: origin.clone(),
                        kind,
                    },
                    message: format!("{err:#}"),
                });
            }
        }
    }

    issues
}

/// Put the browser into a clean slate: blank page, no cookies, no storage
/// for any active origin. Runs before every session invocation, hit or miss.
pub fn clear_environment(driver: &mut dyn Driver) -> Result<()> {
    driver.visit_blank()?;
    driver.clear_cookies()?;
    for origin in driver.active_origins()? {
        driver.clear_storage(&origin, StorageKind::Local)?;
        driver.clear_storage(&origin, StorageKind::Session)?;
    }
    Ok(())
}
