use dbal_core::{Adapter, DbError, Driver, Profiler, params};
use std::sync::{LazyLock, Mutex};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub fn profiling<A: Adapter>(driver: &Driver<A>) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    crate::silent_logs! {
        let error = driver.profiler().unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::Configuration(..))));
    }

    driver.enable_profiling();
    assert!(driver.is_profiling());
    let mut result = driver
        .query("SELECT ? AS a, ? AS b", params![7, "it's"])
        .expect("Failed to run the profiled query")
        .expect("The adapter failed the profiled query");
    result.fetch_all().unwrap();
    let profiler = driver.profiler().expect("The profiler must be attached");
    assert_eq!(profiler.sql(), "SELECT ? AS a, ? AS b");
    assert_eq!(profiler.parameters().len(), 2);
    assert!(profiler.execution_time() >= 0.0);
    let interpolated = driver.profiled_sql().unwrap();
    assert!(interpolated.starts_with("SELECT 7 AS a, "));
    assert!(!interpolated.contains('?'));

    // A new query resets the recorded parameters
    driver.prepare("SELECT 1 AS one").unwrap().unwrap();
    let profiler = driver.profiler().unwrap();
    assert_eq!(profiler.sql(), "SELECT 1 AS one");
    assert!(profiler.parameters().is_empty());
    assert_eq!(profiler.execution_time(), 0.0);

    driver.set_profiler(Profiler::new());
    assert_eq!(driver.profiler().unwrap().sql(), "");
    assert!(driver.disable_profiling().is_some());
    assert!(!driver.is_profiling());
}
