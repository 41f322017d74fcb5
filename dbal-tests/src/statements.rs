use crate::{silent_logs, texts};
use dbal_core::{Adapter, DbError, Driver, ErrorReporting, INTERNAL_ERROR_CODE};
use std::sync::{LazyLock, Mutex};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub fn statements<A: Adapter>(driver: &Driver<A>) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    // Prepared twice
    let mut statement = driver
        .prepare("SELECT 1 AS one")
        .expect("Failed to prepare")
        .expect("The adapter refused the query");
    silent_logs! {
        let error = statement.prepare("SELECT 2 AS two").unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::Protocol(..))));
    }
    let mut result = statement.execute(()).unwrap().unwrap();
    assert_eq!(texts(&result.fetch_col("one", 0).unwrap()), ["1"]);

    // Double fetch
    silent_logs! {
        let error = result.fetch_all().unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
    }

    // Batches
    let mut result = driver
        .query("SELECT 1 AS n UNION ALL SELECT 2 UNION ALL SELECT 3", ())
        .unwrap()
        .unwrap();
    assert_eq!(result.fetch_row(2).unwrap().len(), 2);
    assert_eq!(result.fetch_row(2).unwrap().len(), 1);
    silent_logs! {
        let error = result.fetch_row(1).unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
    }

    // Another statement takes the cursor
    let mut first = driver
        .prepare("SELECT 1 AS n UNION ALL SELECT 2")
        .unwrap()
        .unwrap();
    let mut second = driver.prepare("SELECT 'b' AS s").unwrap().unwrap();
    let mut pending = first.execute(()).unwrap().unwrap();
    assert_eq!(texts(&pending.fetch_col("n", 1).unwrap()), ["1"]);
    let mut other = second.execute(()).unwrap().unwrap();
    silent_logs! {
        let error = pending.fetch_row(1).unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
    }
    assert_eq!(texts(&other.fetch_all().unwrap()[0].values), ["b"]);
    let mut again = first.execute(()).unwrap().unwrap();
    assert_eq!(texts(&again.fetch_col("n", 0).unwrap()), ["1", "2"]);

    // Not a query
    let mut result = driver
        .query("CREATE TABLE IF NOT EXISTS statements_probe (id INTEGER)", ())
        .unwrap()
        .unwrap();
    assert!(!result.is_query().unwrap());
    silent_logs! {
        let error = result.fetch_all().unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
    }
    driver
        .execute("DROP TABLE statements_probe", ())
        .unwrap()
        .unwrap();

    // Released by disconnect
    let mut statement = driver.prepare("SELECT 1 AS n").unwrap().unwrap();
    dbal_core::Connect::disconnect(driver);
    silent_logs! {
        let error = statement.execute(()).err().unwrap();
        assert!(matches!(DbError::of(&error), Some(DbError::Protocol(..))));
    }
    assert_eq!(driver.error_code(), INTERNAL_ERROR_CODE);
    let mut result = driver.query("SELECT 1 AS n", ()).unwrap().unwrap();
    assert!(driver.is_successful());
    assert_eq!(texts(&result.fetch_col("n", 0).unwrap()), ["1"]);
}
