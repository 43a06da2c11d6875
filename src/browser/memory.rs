//! In-memory browser driver.
//!
//! Backs the lifecycle tests and serves as the reference `Driver`
//! implementation for embedders. State lives in plain maps; navigation is a
//! log entry plus an origin registration. Storage writes can be made to fail
//! for chosen origins to exercise the restore-diagnostic path.

use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};

use super::driver::{Cookie, Driver, Origin, StorageKind, BLANK_URL};

#[derive(Debug, Default, Clone)]
struct StorageSlots {
    local: BTreeMap<String, String>,
    session: BTreeMap<String, String>,
}

impl StorageSlots {
    fn area(&self, kind: StorageKind) -> &BTreeMap<String, String> {
        match kind {
            StorageKind::Local => &self.local,
            StorageKind::Session => &self.session,
        }
    }

    fn area_mut(&mut self, kind: StorageKind) -> &mut BTreeMap<String, String> {
        match kind {
            StorageKind::Local => &mut self.local,
            StorageKind::Session => &mut self.session,
        }
    }
}

/// A browser stand-in holding cookies and per-origin storage in process.
#[derive(Debug)]
pub struct MemoryDriver {
    url: String,
    cookies: Vec<Cookie>,
    origins: BTreeMap<Origin, StorageSlots>,
    write_disabled: BTreeSet<Origin>,
    /// Every URL navigated to, in order.
    pub visits: Vec<String>,
    /// Number of clear-cookie calls, for asserting environment resets.
    pub cookie_clears: usize,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self {
            url: BLANK_URL.to_string(),
            cookies: Vec::new(),
            origins: BTreeMap::new(),
            write_disabled: BTreeSet::new(),
            visits: Vec::new(),
            cookie_clears: 0,
        }
    }

    /// Make storage writes fail for `origin`, as a browser with storage
    /// disabled for that partition would.
    pub fn disable_storage_writes(&mut self, origin: Origin) {
        self.write_disabled.insert(origin);
    }

    pub fn enable_storage_writes(&mut self, origin: &Origin) {
        self.write_disabled.remove(origin);
    }

    /// Direct read access for assertions, without going through the trait.
    pub fn storage_of(&self, origin: &Origin, kind: StorageKind) -> BTreeMap<String, String> {
        self.origins
            .get(origin)
            .map(|slots| slots.area(kind).clone())
            .unwrap_or_default()
    }

    pub fn cookie_named(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for MemoryDriver {
    fn visit(&mut self, url: &str) -> Result<()> {
        self.visits.push(url.to_string());
        self.url = url.to_string();
        if let Some(origin) = Origin::of_url(url) {
            self.origins.entry(origin).or_default();
        }
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn active_origins(&mut self) -> Result<Vec<Origin>> {
        Ok(self.origins.keys().cloned().collect())
    }

    fn cookies(&mut self) -> Result<Vec<Cookie>> {
        Ok(self.cookies.clone())
    }

    fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()> {
        for cookie in cookies {
            self.cookies.retain(|c| {
                c.name != cookie.name || c.domain != cookie.domain || c.path != cookie.path
            });
            self.cookies.push(cookie.clone());
        }
        Ok(())
    }

    fn clear_cookies(&mut self) -> Result<()> {
        self.cookie_clears += 1;
        self.cookies.clear();
        Ok(())
    }

    fn read_storage(
        &mut self,
        origin: &Origin,
        kind: StorageKind,
    ) -> Result<BTreeMap<String, String>> {
        Ok(self.storage_of(origin, kind))
    }

    fn write_storage(
        &mut self,
        origin: &Origin,
        kind: StorageKind,
        entries: &BTreeMap<String, String>,
    ) -> Result<()> {
        if self.write_disabled.contains(origin) {
            bail!("{kind} is disabled for {origin}");
        }
        let slots = self.origins.entry(origin.clone()).or_default();
        slots.area_mut(kind).extend(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Ok(())
    }

    fn clear_storage(&mut self, origin: &Origin, kind: StorageKind) -> Result<()> {
        if let Some(slots) = self.origins.get_mut(origin) {
            slots.area_mut(kind).clear();
        }
        Ok(())
    }
}
