//! Error taxonomy for the session lifecycle.
//!
//! The three validation variants carry distinct messages on purpose: a test
//! that fails because setup never produced a usable session reads differently
//! from one whose restored session went stale and could not be rebuilt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The identifier could not be turned into a cache key.
    #[error("session identifier rejected: {reason}")]
    IdentifierRejected { reason: String },

    /// The caller-supplied setup procedure failed. Fatal, never retried.
    #[error("session setup failed for {key}: {source:#}")]
    SetupFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Validation failed immediately after a fresh setup. Fatal, nothing cached.
    #[error("session validation failed after setup for {key}: {reason}")]
    ValidationAfterSetup { key: String, reason: String },

    /// A restored session failed validation, setup was re-run once, and the
    /// re-run's validation failed too.
    #[error(
        "session {key} failed validation after restore; setup was retried and \
         validation still failed: {reason}"
    )]
    ValidationAfterRetry { key: String, reason: String },

    /// A browser driver round-trip failed outside setup/validate.
    #[error("browser driver command failed: {0:#}")]
    Driver(#[source] anyhow::Error),

    /// The persisted session store could not be read or written.
    #[error("session store operation failed: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl SessionError {
    pub fn driver(source: anyhow::Error) -> Self {
        SessionError::Driver(source)
    }

    pub fn store(source: anyhow::Error) -> Self {
        SessionError::Store(source)
    }
}
