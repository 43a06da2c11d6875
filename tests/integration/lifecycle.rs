//! Integration tests for setup/restore decisions, validation, and the
//! single validate-triggered retry

use sessile::browser::MemoryDriver;
use sessile::error::SessionError;
use sessile::orchestrator::SessionDefinition;

use super::helpers::{app_local_storage, counting_login_setup, scripted_validate, test_engine};

#[test]
fn test_setup_runs_once_then_restores() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .expect("First invocation should succeed");
    let after_setup = app_local_storage(&mut driver);
    assert_eq!(count.get(), 1);
    assert_eq!(after_setup["token"], "token-1");

    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .expect("Second invocation should succeed");
    let after_restore = app_local_storage(&mut driver);

    // Setup did not run again; the restored state is the captured one.
    assert_eq!(count.get(), 1);
    assert_eq!(after_restore, after_setup);
    assert_eq!(driver.cookie_named("sid").unwrap().value, "sid-1");
}

#[test]
fn test_distinct_ids_get_distinct_sessions() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .unwrap();
    engine
        .session(
            &mut driver,
            SessionDefinition::new("admin", &mut setup).with_log(false),
        )
        .unwrap();

    assert_eq!(count.get(), 2);
    assert_eq!(engine.registry().len(), 2);
}

#[test]
fn test_without_validate_caching_is_unconditional() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, _count) = counting_login_setup();

    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .unwrap();

    assert_eq!(engine.registry().len(), 1);
    let entry = engine.registry().iter().next().unwrap();
    assert!(entry.is_valid());
    assert_eq!(entry.snapshot.origin_count(), 1);
}

#[test]
fn test_validate_failure_after_setup_is_fatal_and_caches_nothing() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();
    let (mut validate, _calls) = scripted_validate(vec![Ok(false)]);

    let err = engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .unwrap_err();

    assert!(matches!(err, SessionError::ValidationAfterSetup { .. }));
    assert_eq!(count.get(), 1);
    assert!(engine.registry().is_empty());
}

#[test]
fn test_validate_error_counts_as_failure() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, _count) = counting_login_setup();
    let (mut validate, _calls) =
        scripted_validate(vec![Err(anyhow::anyhow!("dashboard selector not found"))]);

    let err = engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .unwrap_err();

    match err {
        SessionError::ValidationAfterSetup { reason, .. } => {
            assert!(reason.contains("dashboard selector not found"));
        }
        other => panic!("Unexpected error: {other}"),
    }
}

#[test]
fn test_stale_restored_session_reruns_setup_exactly_once() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();
    // First call: validate passes after setup. Second call: the restored
    // session is reported stale, the retried setup's validate passes.
    let (mut validate, validate_calls) = scripted_validate(vec![Ok(true), Ok(false), Ok(true)]);

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .expect("First invocation should succeed");
    assert_eq!(count.get(), 1);

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .expect("Recovery through setup re-run should succeed");

    assert_eq!(count.get(), 2);
    assert_eq!(validate_calls.get(), 3);
    // The replacement entry carries the re-run's fresh state.
    assert_eq!(app_local_storage(&mut driver)["token"], "token-2");
    assert_eq!(driver.cookie_named("sid").unwrap().value, "sid-2");

    // A third call restores the replacement without running setup.
    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn test_retry_validation_failure_is_fatal() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();
    let (mut validate, _calls) = scripted_validate(vec![Ok(true), Ok(false), Ok(false)]);

    engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .unwrap();

    let err = engine
        .session(
            &mut driver,
            SessionDefinition::new("user", &mut setup).with_validate(&mut validate),
        )
        .unwrap_err();

    assert!(matches!(err, SessionError::ValidationAfterRetry { .. }));
    // Exactly one retry: setup ran once per invocation, never more.
    assert_eq!(count.get(), 2);
}

#[test]
fn test_setup_error_is_fatal_without_retry() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let mut attempts = 0;

    let err = engine
        .session(
            &mut driver,
            SessionDefinition::new("user", |_driver| {
                attempts += 1;
                anyhow::bail!("login endpoint returned 503")
            }),
        )
        .unwrap_err();

    match err {
        SessionError::SetupFailed { .. } => {}
        other => panic!("Unexpected error: {other}"),
    }
    assert_eq!(attempts, 1);
    assert!(engine.registry().is_empty());
}

#[test]
fn test_clear_all_forces_setup_to_rerun() {
    let (_temp, mut engine) = test_engine();
    let mut driver = MemoryDriver::new();
    let (mut setup, count) = counting_login_setup();

    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .unwrap();
    engine.clear_all_saved_sessions().unwrap();
    engine
        .session(&mut driver, SessionDefinition::new("user", &mut setup))
        .unwrap();

    assert_eq!(count.get(), 2);
}
