//! Shared test helpers for session lifecycle integration tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use sessile::browser::{Cookie, Driver, Origin, StorageKind};
use sessile::config::Config;
use sessile::orchestrator::Engine;
use tempfile::TempDir;

pub const APP_ORIGIN: &str = "https://app.example.com";

/// Test helper: engine backed by a store under a fresh temp directory.
pub fn test_engine() -> (TempDir, Engine) {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let engine = engine_at(&temp);
    (temp, engine)
}

/// Test helper: a second engine over the same temp store, as a new suite
/// run would create.
pub fn engine_at(temp: &TempDir) -> Engine {
    let config = Config {
        store_dir: temp.path().join("sessions"),
        ..Config::default()
    };
    Engine::new(&config)
}

/// Test helper: a setup procedure performing a fake login.
///
/// Navigates to the app, sets a session cookie, and stores an auth token.
/// Cookie and token values embed the invocation count, so a re-run is
/// distinguishable from a restore. Returns the closure and its counter.
pub fn counting_login_setup() -> (
    impl FnMut(&mut dyn Driver) -> anyhow::Result<()>,
    Rc<Cell<u32>>,
) {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    let setup = move |driver: &mut dyn Driver| {
        seen.set(seen.get() + 1);
        driver.visit(&format!("{APP_ORIGIN}/login"))?;
        driver.set_cookies(&[Cookie::new(
            "sid",
            format!("sid-{}", seen.get()),
            ".example.com",
        )])?;
        let mut entries = BTreeMap::new();
        entries.insert("token".to_string(), format!("token-{}", seen.get()));
        driver.write_storage(&Origin::new(APP_ORIGIN), StorageKind::Local, &entries)?;
        Ok(())
    };
    (setup, count)
}

/// Test helper: a validate procedure that replays scripted outcomes, then
/// keeps returning `Ok(true)` once the script is exhausted.
pub fn scripted_validate(
    outcomes: Vec<anyhow::Result<bool>>,
) -> (
    impl FnMut(&mut dyn Driver) -> anyhow::Result<bool>,
    Rc<Cell<u32>>,
) {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let script = Rc::new(RefCell::new(VecDeque::from(outcomes)));
    let validate = move |_driver: &mut dyn Driver| {
        seen.set(seen.get() + 1);
        script.borrow_mut().pop_front().unwrap_or(Ok(true))
    };
    (validate, calls)
}

/// The app origin's localStorage, for asserting restored state.
pub fn app_local_storage(driver: &mut dyn Driver) -> BTreeMap<String, String> {
    driver
        .read_storage(&Origin::new(APP_ORIGIN), StorageKind::Local)
        .expect("Failed to read app storage")
}
