//! Integration tests for the cross-run persisted store

use sessile::browser::MemoryDriver;
use sessile::orchestrator::SessionDefinition;

use super::helpers::{app_local_storage, counting_login_setup, engine_at, test_engine};

const SETUP_V1: &str = "fn setup() { login('user'); }";
const SETUP_V2: &str = "fn setup() { login_with_sso('user'); }";

#[test]
fn test_persisted_session_survives_a_new_run() {
    let (temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1),
        )
        .unwrap();
    assert_eq!(engine.store().list().unwrap().len(), 1);

    // A fresh engine and a fresh browser, as the next full-suite run.
    let mut engine = engine_at(&temp);
    let mut driver = MemoryDriver::new();
    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1),
        )
        .unwrap();

    assert_eq!(count.get(), 1, "setup must not re-run across runs");
    assert_eq!(app_local_storage(&mut driver)["token"], "token-1");
}

#[test]
fn test_changed_setup_source_invalidates_persisted_entry() {
    let (temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1),
        )
        .unwrap();

    let mut engine = engine_at(&temp);
    let mut driver = MemoryDriver::new();
    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V2),
        )
        .unwrap();

    assert_eq!(count.get(), 2, "edited setup must invalidate the saved entry");
    assert_eq!(app_local_storage(&mut driver)["token"], "token-2");

    // The store now holds the entry for the edited setup.
    let records = engine.store().list().unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_non_persisted_sessions_stay_off_disk() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, _count) = counting_login_setup();

    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .unwrap();

    assert!(engine.store().list().unwrap().is_empty());
}

#[test]
fn test_clear_all_reaches_the_persisted_store() {
    let (temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1),
        )
        .unwrap();

    let removed = engine.clear_all_saved_sessions().unwrap();
    assert_eq!(removed, 1);

    let mut engine = engine_at(&temp);
    let mut driver = MemoryDriver::new();
    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1),
        )
        .unwrap();

    assert_eq!(count.get(), 2, "cleared store must force a fresh setup");
}

#[test]
fn test_stale_persisted_entry_is_replaced_after_retry() {
    let (temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1),
        )
        .unwrap();

    // Next run: the restored session fails validation once, the retried
    // setup passes, and the store ends up with the replacement entry.
    let mut engine = engine_at(&temp);
    let mut driver = MemoryDriver::new();
    let mut outcomes = vec![Ok(false), Ok(true)].into_iter();
    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup)
                .persisted()
                .with_setup_source(SETUP_V1)
                .with_validate(move |_driver| outcomes.next().unwrap_or(Ok(true))),
        )
        .unwrap();

    assert_eq!(count.get(), 2);
    let records = engine.store().list().unwrap();
    assert_eq!(records.len(), 1);
    let stored = &records[0].entry;
    assert!(stored.is_valid());
    let app = sessile::browser::Origin::new(super::helpers::APP_ORIGIN);
    assert_eq!(stored.snapshot.origins[&app].local["token"], "token-2");
}
