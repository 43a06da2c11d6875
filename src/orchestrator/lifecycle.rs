//! The session lifecycle state machine.
//!
//! One invocation walks `Start -> ClearEnvironment -> (RunSetup | Restore)
//! -> Validate -> Done`, with a single `Invalidate -> RunSetup` edge taken
//! when a restored session fails validation. Validation failure right after
//! setup is fatal: setup produced an unusable session and retrying it would
//! only produce another one.
//!
//! The engine yields no value to the caller and leaves the page blank; the
//! test decides where to navigate next.

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::browser::Driver;
use crate::config::Config;
use crate::error::SessionError;
use crate::identifier::{KeyLimits, SessionId, SessionKey};
use crate::registry::{Registry, SessionEntry, SessionStore};
use crate::snapshot::{capture, clear_environment, restore};

use super::outcome::ValidateOutcome;

/// Caller-supplied steps that establish a session from scratch.
pub type SetupFn<'a> = Box<dyn FnMut(&mut dyn Driver) -> anyhow::Result<()> + 'a>;

/// Caller-supplied steps that confirm a session is still usable.
pub type ValidateFn<'a> = Box<dyn FnMut(&mut dyn Driver) -> anyhow::Result<bool> + 'a>;

/// Everything the engine needs for one session invocation.
pub struct SessionDefinition<'a> {
    id: SessionId,
    setup: SetupFn<'a>,
    validate: Option<ValidateFn<'a>>,
    log: bool,
    persist: bool,
    setup_source: Option<String>,
}

impl<'a> SessionDefinition<'a> {
    pub fn new(
        id: impl Into<SessionId>,
        setup: impl FnMut(&mut dyn Driver) -> anyhow::Result<()> + 'a,
    ) -> Self {
        Self {
            id: id.into(),
            setup: Box::new(setup),
            validate: None,
            log: true,
            persist: false,
            setup_source: None,
        }
    }

    pub fn with_validate(
        mut self,
        validate: impl FnMut(&mut dyn Driver) -> anyhow::Result<bool> + 'a,
    ) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Lifecycle events for this session are logged at info level by
    /// default; `with_log(false)` drops them to debug.
    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Source text of the setup procedure, supplied by the host runner.
    /// Its hash gates reuse of persisted entries across runs.
    pub fn with_setup_source(mut self, source: impl Into<String>) -> Self {
        self.setup_source = Some(source.into());
        self
    }

    /// Opt this session into the cross-run persisted store.
    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }

    fn fingerprint(&self) -> Option<String> {
        self.setup_source.as_ref().map(|source| {
            let mut hasher = Sha256::new();
            hasher.update(source.as_bytes());
            hex::encode(hasher.finalize())
        })
    }
}

/// Whether a setup run is the first for this invocation or the retry taken
/// after a restored session failed validation. Decides which fatal error a
/// subsequent validation failure maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupAttempt {
    First,
    AfterInvalidation,
}

/// The session engine: registry, persisted store, and lifecycle driver.
///
/// One engine lives for one spec run. Tests run serially, so the engine is
/// only ever driven from one place at a time.
pub struct Engine {
    registry: Registry,
    store: SessionStore,
    limits: KeyLimits,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: Registry::new(),
            store: SessionStore::new(config.store_dir.clone()),
            limits: config.key_limits(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run one session invocation to completion.
    ///
    /// On a cache miss the setup procedure runs and its resulting browser
    /// state is snapshotted; on a hit the cached snapshot is restored
    /// instead. Either way the environment is wiped first and the page is
    /// left blank afterwards.
    pub fn session(
        &mut self,
        driver: &mut dyn Driver,
        mut definition: SessionDefinition<'_>,
    ) -> Result<(), SessionError> {
        let key = definition.id.to_key(&self.limits)?;
        let fingerprint = definition.fingerprint();
        debug!(key = %key, "session lifecycle start");

        let cached = self.lookup(&key, fingerprint.as_deref(), definition.persist)?;

        clear_environment(driver).map_err(SessionError::driver)?;

        let Some(entry) = cached else {
            return self.create(driver, &key, fingerprint, &mut definition, SetupAttempt::First);
        };

        let issues = restore(driver, &entry.snapshot);
        for issue in &issues {
            warn!(key = %key, %issue, "session restore issue");
        }
        if definition.log {
            info!(key = %key, id = %entry.id, "restored session from cache");
        } else {
            debug!(key = %key, id = %entry.id, "restored session from cache");
        }

        if let Some(outcome) = Self::run_validate(driver, &mut definition)? {
            if let Some(reason) = outcome.failure_reason() {
                warn!(key = %key, reason, "restored session failed validation; rerunning setup");
                self.discard(&key, definition.persist)?;
                return self.create(
                    driver,
                    &key,
                    fingerprint,
                    &mut definition,
                    SetupAttempt::AfterInvalidation,
                );
            }
        }

        driver.visit_blank().map_err(SessionError::driver)?;
        Ok(())
    }

    /// Empty the in-memory registry and the cross-run persisted store.
    /// Returns how many persisted entries were removed.
    pub fn clear_all_saved_sessions(&mut self) -> Result<usize, SessionError> {
        self.registry.clear_all();
        let removed = self.store.clear_all().map_err(SessionError::store)?;
        if removed > 0 {
            info!(removed, "cleared saved sessions");
        }
        Ok(removed)
    }

    /// Find a restorable entry: the in-memory registry first, then (for
    /// persisted definitions) the on-disk store, gated on the setup
    /// fingerprint still matching.
    fn lookup(
        &self,
        key: &SessionKey,
        fingerprint: Option<&str>,
        persist: bool,
    ) -> Result<Option<SessionEntry>, SessionError> {
        if let Some(entry) = self.registry.get_valid(key) {
            return Ok(Some(entry.clone()));
        }
        if !persist {
            return Ok(None);
        }

        let Some(record) = self.store.load(key).map_err(SessionError::store)? else {
            return Ok(None);
        };
        if !record.entry.matches_fingerprint(fingerprint) {
            warn!(key = %key, "saved session ignored: setup procedure changed");
            return Ok(None);
        }
        if !record.entry.is_valid() {
            return Ok(None);
        }
        Ok(Some(record.entry))
    }

    /// `RunSetup`: execute setup, snapshot the browser, validate, publish.
    fn create(
        &mut self,
        driver: &mut dyn Driver,
        key: &SessionKey,
        fingerprint: Option<String>,
        definition: &mut SessionDefinition<'_>,
        attempt: SetupAttempt,
    ) -> Result<(), SessionError> {
        (definition.setup)(driver).map_err(|source| SessionError::SetupFailed {
            key: key.to_string(),
            source,
        })?;

        let snapshot = capture(driver).map_err(SessionError::driver)?;
        let mut entry = SessionEntry::new(key.clone(), fingerprint, snapshot);

        if let Some(outcome) = Self::run_validate(driver, definition)? {
            if let Some(reason) = outcome.failure_reason() {
                return Err(match attempt {
                    SetupAttempt::First => SessionError::ValidationAfterSetup {
                        key: key.to_string(),
                        reason: reason.to_string(),
                    },
                    SetupAttempt::AfterInvalidation => SessionError::ValidationAfterRetry {
                        key: key.to_string(),
                        reason: reason.to_string(),
                    },
                });
            }
        }

        entry.mark_valid();
        if definition.log {
            info!(
                key = %key,
                id = %entry.id,
                origins = entry.snapshot.origin_count(),
                entries = entry.snapshot.entry_count(),
                "session created and cached"
            );
        } else {
            debug!(
                key = %key,
                id = %entry.id,
                origins = entry.snapshot.origin_count(),
                entries = entry.snapshot.entry_count(),
                "session created and cached"
            );
        }
        if definition.persist {
            self.store.save(&entry).map_err(SessionError::store)?;
        }
        self.registry.put(entry);

        driver.visit_blank().map_err(SessionError::driver)?;
        Ok(())
    }

    /// `Validate`: blank the page (storage stays intact), then run the
    /// validate procedure if one was supplied.
    fn run_validate(
        driver: &mut dyn Driver,
        definition: &mut SessionDefinition<'_>,
    ) -> Result<Option<ValidateOutcome>, SessionError> {
        let Some(validate) = definition.validate.as_mut() else {
            return Ok(None);
        };
        driver.visit_blank().map_err(SessionError::driver)?;
        Ok(Some(ValidateOutcome::from_result(validate(driver))))
    }

    /// `Invalidate`: hide the registry entry and drop the persisted copy so
    /// a broken snapshot cannot outlive this run.
    fn discard(&mut self, key: &SessionKey, persist: bool) -> Result<(), SessionError> {
        self.registry.invalidate(key);
        if persist {
            self.store.remove(key).map_err(SessionError::store)?;
        }
        Ok(())
    }
}
