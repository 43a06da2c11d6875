//! Engine configuration.
//!
//! Configuration is optional: a `sessile.toml` next to the test suite
//! overrides the defaults, a missing file is not an error. The only values
//! worth configuring are the persisted-store location and the identifier
//! guard rails.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::identifier::KeyLimits;

/// File name looked up in the suite directory.
pub const CONFIG_FILE: &str = "sessile.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the cross-run persisted session entries.
    pub store_dir: PathBuf,
    /// Maximum nesting depth of a composite session identifier.
    pub max_id_depth: usize,
    /// Maximum byte length of a canonicalized session identifier.
    pub max_id_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = KeyLimits::default();
        Self {
            store_dir: default_store_dir(),
            max_id_depth: limits.max_depth,
            max_id_bytes: limits.max_bytes,
        }
    }
}

impl Config {
    /// Load configuration from `<dir>/sessile.toml`.
    ///
    /// # Returns
    /// * `Ok(Some(config))` - file present and parsed
    /// * `Ok(None)` - no config file in `dir`
    /// * `Err` - file present but unreadable or invalid
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn load_or_default(dir: &Path) -> Result<Self> {
        Ok(Self::load(dir)?.unwrap_or_default())
    }

    pub fn key_limits(&self) -> KeyLimits {
        KeyLimits {
            max_depth: self.max_id_depth,
            max_bytes: self.max_id_bytes,
        }
    }
}

/// Default persisted-store location, under the platform's local data dir.
pub fn default_store_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sessile")
        .join("sessions")
}
