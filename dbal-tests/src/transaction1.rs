use crate::{silent_logs, texts};
use dbal_core::{Adapter, DbError, Driver, Transactional, params};
use std::sync::{LazyLock, Mutex};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub fn transaction1<A: Adapter>(driver: &Driver<A>) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    // Setup
    driver
        .execute("DROP TABLE IF EXISTS ledger", ())
        .expect("Failed to drop the ledger table")
        .expect("The adapter failed to drop the ledger table");
    driver
        .execute("CREATE TABLE ledger (name VARCHAR(64), amount INTEGER)", ())
        .expect("Failed to create the ledger table")
        .expect("The adapter failed to create the ledger table");

    // Rollback without begin
    assert!(!driver.in_transaction());
    silent_logs! {
        let error = driver.rollback().err().expect("Rollback without begin must fail");
        assert!(matches!(DbError::of(&error), Some(DbError::Protocol(..))));
    }
    assert!(!driver.in_transaction());

    // Commit
    driver.begin().expect("Could not begin a transaction");
    assert!(driver.in_transaction());
    driver
        .execute("INSERT INTO ledger VALUES (?, ?)", params!["alpha", 10])
        .unwrap()
        .unwrap();
    driver.commit().expect("Failed to commit the transaction");
    assert!(!driver.in_transaction());

    // Rollback
    driver.begin().expect("Could not begin a transaction");
    driver
        .execute("INSERT INTO ledger VALUES (?, ?)", params!["bravo", 20])
        .unwrap()
        .unwrap();
    driver.rollback().expect("Failed to rollback the transaction");
    assert!(!driver.in_transaction());

    let mut result = driver
        .query("SELECT name FROM ledger ORDER BY name", ())
        .unwrap()
        .unwrap();
    assert_eq!(texts(&result.fetch_col("name", 0).unwrap()), ["alpha"]);
}
