use crate::texts;
use dbal_core::{Adapter, ColumnRef, Driver, ParamType, Quote, Value};
use std::sync::{LazyLock, Mutex};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub fn simple<A: Adapter>(driver: &Driver<A>) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    // Statement reuse
    let mut statement = driver
        .prepare("SELECT ? AS col")
        .expect("Failed to prepare the select")
        .expect("The adapter refused the select");
    assert!(statement.is_prepared());
    assert_eq!(statement.execution_time(), 0.0);
    let mut result = statement
        .execute([2])
        .expect("Failed to execute with 2")
        .expect("The adapter failed to execute with 2");
    assert!(result.is_query().expect("The execution should be successful"));
    assert_eq!(result.field_count(), 1);
    assert_eq!(texts(&result.fetch_col("col", 1).unwrap()), ["2"]);
    let mut result = statement
        .execute([3])
        .expect("Failed to execute with 3")
        .expect("The adapter failed to execute with 3");
    assert_eq!(texts(&result.fetch_col("col", 1).unwrap()), ["3"]);
    assert!(statement.execution_time() >= 0.0);

    // Projection by position
    let mut result = driver
        .query("SELECT 'x' AS a, 'y' AS b", ())
        .expect("Failed to query two columns")
        .expect("The adapter failed two columns");
    assert_eq!(texts(&result.fetch_col(ColumnRef::Index(1), 0).unwrap()), ["y"]);

    // Absent columns are skipped
    let mut result = driver
        .query("SELECT 'x' AS a", ())
        .expect("Failed to query one column")
        .expect("The adapter failed one column");
    assert!(result.fetch_col("missing", 0).unwrap().is_empty());

    // Quoting
    assert_eq!(driver.quote(&Value::Null, None).unwrap(), "NULL");
    assert_eq!(driver.quote(&true.into(), None).unwrap(), "TRUE");
    assert_eq!(driver.quote(&false.into(), None).unwrap(), "FALSE");
    assert_eq!(driver.quote(&12.into(), Some(ParamType::Int)).unwrap(), "12");
    let quoted = driver
        .quote(&"it's a \"test\"".into(), None)
        .expect("Failed to quote a string");
    let mut result = driver
        .query(&format!("SELECT {} AS q", quoted), ())
        .expect("Failed to query the quoted string")
        .expect("The adapter failed the quoted string");
    assert_eq!(
        result.fetch_col("q", 1).unwrap(),
        [Value::from("it's a \"test\"")]
    );
}
