//! The browser driver trait and its value types.
//!
//! The engine never talks to a browser directly. Every navigation, cookie
//! mutation, and storage access goes through [`Driver`], which the host test
//! runner implements on top of its automation transport. Each call is a
//! blocking round-trip; the host runner executes tests serially, so no
//! concurrent driver use happens.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// URL of the neutral page the engine parks on between lifecycle steps.
pub const BLANK_URL: &str = "about:blank";

/// A browser storage partition: scheme + host + port.
///
/// Storage is captured and restored per origin; one session snapshot can
/// span several origins (cross-origin login flows).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the origin of a URL, if it has one.
    ///
    /// `about:` and other scheme-only URLs carry no origin.
    pub fn of_url(url: &str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        if host.is_empty() {
            return None;
        }
        Some(Self(format!("{scheme}://{host}")))
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single browser cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "Cookie::default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: Self::default_path(),
            secure: false,
            http_only: false,
            expiry: None,
        }
    }

    fn default_path() -> String {
        "/".to_string()
    }
}

/// The two per-origin storage areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Session,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Local => write!(f, "localStorage"),
            StorageKind::Session => write!(f, "sessionStorage"),
        }
    }
}

/// The narrow boundary to the host browser automation engine.
pub trait Driver {
    /// Navigate the active page to `url`.
    fn visit(&mut self, url: &str) -> Result<()>;

    /// Navigate the active page to the blank page.
    fn visit_blank(&mut self) -> Result<()> {
        self.visit(BLANK_URL)
    }

    /// URL of the active page.
    fn current_url(&mut self) -> Result<String>;

    /// Origins the browser has touched since the environment was last
    /// cleared. Drives per-origin capture and clearing.
    fn active_origins(&mut self) -> Result<Vec<Origin>>;

    /// All cookies, across origins.
    fn cookies(&mut self) -> Result<Vec<Cookie>>;

    /// Install cookies.
    fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()>;

    /// Remove all cookies.
    fn clear_cookies(&mut self) -> Result<()>;

    /// Read one storage area of one origin.
    fn read_storage(&mut self, origin: &Origin, kind: StorageKind)
        -> Result<BTreeMap<String, String>>;

    /// Write entries into one storage area of one origin.
    fn write_storage(
        &mut self,
        origin: &Origin,
        kind: StorageKind,
        entries: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Empty one storage area of one origin.
    fn clear_storage(&mut self, origin: &Origin, kind: StorageKind) -> Result<()>;
}
