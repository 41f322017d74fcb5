use crate::silent_logs;
use dbal_core::{Adapter, Driver, ErrorReporting};
use std::sync::{LazyLock, Mutex};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub fn errors<A: Adapter>(driver: &Driver<A>) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    // Execution faults are reported, not raised
    silent_logs! {
        let result = driver
            .query("SELECT * FROM table_that_does_not_exist", ())
            .expect("Adapter failures must not be raised");
        assert!(result.is_none());
    }
    assert!(!driver.is_successful());
    assert_ne!(driver.error_code(), 0);
    assert!(!driver.error().is_empty());

    silent_logs! {
        let statement = driver.prepare("THIS IS NOT SQL").expect("Adapter failures must not be raised");
        assert!(statement.is_none());
    }
    assert!(!driver.is_successful());

    // The next successful operation clears the error
    driver.query("SELECT 1 AS one", ()).unwrap().unwrap();
    assert!(driver.is_successful());
    assert_eq!(driver.error_code(), 0);
    assert_eq!(driver.error(), "");
}
