#[cfg(test)]
mod tests {
    use dbal::{
        AdapterError, ColumnRef, Connect, DbError, Driver, ErrorReporting, INTERNAL_ERROR_CODE,
        Value, params,
    };
    use dbal_tests::{StubAdapter, init_logs, silent_logs};

    fn stub_driver() -> (StubAdapter, Driver<StubAdapter>) {
        let stub = StubAdapter::new();
        let driver = Driver::new(stub.clone(), [("driver", "stub")]);
        (stub, driver)
    }

    #[test]
    fn adapter_failures_are_recorded() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            stub.state().prepare_failure = Some(AdapterError::new(1064, "You have an error in your SQL syntax"));
            assert!(driver.prepare("SELEC 1").unwrap().is_none());
            assert_eq!(driver.error_code(), 1064);
            assert_eq!(driver.error(), "You have an error in your SQL syntax");
            stub.state().prepare_failure = None;
            stub.state().execute_failure = Some(AdapterError::new(1146, "Table 'shop.missing' doesn't exist"));
            assert!(driver.query("SELECT * FROM missing", ()).unwrap().is_none());
            assert_eq!(driver.error_code(), 1146);
            stub.state().execute_failure = None;
            let result = driver.query("SELECT 1", ()).unwrap().unwrap();
            assert!(result.is_successful());
            assert_eq!(driver.error(), "");
        }
    }

    #[test]
    fn prepare_twice() {
        silent_logs! {
            let (_stub, driver) = stub_driver();
            let mut statement = driver.prepare("SELECT 1").unwrap().unwrap();
            assert!(statement.is_prepared());
            assert_eq!(statement.sql(), "SELECT 1");
            let error = statement.prepare("SELECT 2").err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::Protocol(..))));
            assert!(statement.execute(()).unwrap().is_some());
        }
    }

    #[test]
    fn released_by_disconnect() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            let mut statement = driver.prepare("SELECT name FROM users").unwrap().unwrap();
            driver.disconnect();
            assert!(stub.log().contains(&"close SELECT name FROM users".to_string()));
            let error = statement.execute(()).err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::Protocol(..))));
            assert_eq!(statement.error_code(), INTERNAL_ERROR_CODE);
            assert!(driver.query("SELECT 1", ()).unwrap().is_some());
            assert_eq!(driver.error_code(), 0);
        }
    }

    #[test]
    fn dropping_releases_the_handle() {
        init_logs();
        let (stub, driver) = stub_driver();
        let statement = driver.prepare("SELECT 1").unwrap().unwrap();
        let closes = stub.state().closes;
        drop(statement);
        assert_eq!(stub.state().closes, closes + 1);
        assert!(stub.log().contains(&"close SELECT 1".to_string()));
    }

    #[test]
    fn bound_parameters() {
        init_logs();
        let (stub, driver) = stub_driver();
        driver.query("SELECT ? AS col", [5]).unwrap().unwrap();
        driver
            .query("SELECT * FROM users WHERE id = :id", params! { ":id" => 7 })
            .unwrap()
            .unwrap();
        let log = stub.log();
        assert!(log.contains(&"execute SELECT ? AS col [0=5]".to_string()));
        assert!(log.contains(&"execute SELECT * FROM users WHERE id = :id [:id=7]".to_string()));
    }

    #[test]
    fn fetch_columns() {
        init_logs();
        let (stub, driver) = stub_driver();
        let rows = vec![
            vec![Value::Int(1), Value::from("x")],
            vec![Value::Int(2), Value::from("y")],
        ];
        stub.push_result(&["a", "b"], rows.clone());
        stub.push_result(&["a", "b"], rows.clone());
        stub.push_result(&["a", "b"], rows);
        let mut result = driver.query("SELECT a, b FROM t", ()).unwrap().unwrap();
        assert!(result.is_query().unwrap());
        assert_eq!(result.field_count(), 2);
        assert_eq!(result.row_count(), 2);
        assert_eq!(
            result.fetch_col("b", 0).unwrap(),
            [Value::from("x"), Value::from("y")]
        );
        let mut result = driver.query("SELECT a, b FROM t", ()).unwrap().unwrap();
        assert_eq!(
            result.fetch_col(ColumnRef::Index(0), 0).unwrap(),
            [Value::Int(1), Value::Int(2)]
        );
        let mut result = driver.query("SELECT a, b FROM t", ()).unwrap().unwrap();
        assert!(result.fetch_col("c", 0).unwrap().is_empty());
    }

    #[test]
    fn fetch_in_batches() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            stub.push_result(
                &["n"],
                (0..3).map(|i| vec![Value::Int(i)]).collect(),
            );
            let mut result = driver.query("SELECT n FROM t", ()).unwrap().unwrap();
            assert_eq!(result.fetch_row(2).unwrap().len(), 2);
            let rows = result.fetch_row(2).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].get_column("n"), Some(&Value::Int(2)));
            let error = result.fetch_row(2).err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
        }
    }

    #[test]
    fn results_are_invalidated() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            stub.push_result(&["n"], vec![vec![Value::Int(1)]]);
            let mut first = driver.query("SELECT n FROM t", ()).unwrap().unwrap();
            let mut second = driver.query("SELECT 2", ()).unwrap().unwrap();
            assert!(stub.log().contains(&"close SELECT n FROM t".to_string()));
            let error = first.fetch_all().err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
            assert!(second.fetch_all().unwrap().is_empty());

            let mut statement = driver.prepare("SELECT 3").unwrap().unwrap();
            let mut old = statement.execute(()).unwrap().unwrap();
            let mut new = statement.execute(()).unwrap().unwrap();
            let error = old.fetch_all().err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
            assert!(new.fetch_all().is_ok());
        }
    }

    #[test]
    fn modifications() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            assert_eq!(driver.last_insert_id(None), None);
            stub.state().affected_rows = 3;
            assert_eq!(driver.execute("UPDATE t SET a = 1", ()).unwrap(), Some(3));
            assert_eq!(driver.last_insert_id(None).as_deref(), Some("1"));
            let mut result = driver.query("DELETE FROM t", ()).unwrap().unwrap();
            assert!(!result.is_query().unwrap());
            let error = result.fetch_all().err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
        }
    }

    #[test]
    fn fetch_failure() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            let mut result = driver.query("SELECT 1", ()).unwrap().unwrap();
            stub.state().fetch_failure = Some(AdapterError::new(2013, "Lost connection"));
            let error = result.fetch_all().err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::Adapter(..))));
            assert_eq!(driver.error_code(), 2013);
            assert_eq!(result.error_code(), 2013);
            assert_eq!(result.error(), "Lost connection");
            let error = result.is_query().err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::State(..))));
        }
    }

    #[test]
    fn profiling() {
        init_logs();
        let (_stub, driver) = stub_driver();
        driver.enable_profiling();
        driver
            .query(
                "SELECT * FROM t WHERE a = ? AND b = ?",
                params![1, "it's"],
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            driver.profiled_sql().unwrap(),
            "SELECT * FROM t WHERE a = 1 AND b = 'it\\'s'"
        );
        let profiler = driver.profiler().unwrap();
        assert!(profiler.execution_time() >= 0.0);
        driver
            .query("SELECT :name", params! { "name" => Value::Null })
            .unwrap()
            .unwrap();
        assert_eq!(driver.profiled_sql().unwrap(), "SELECT NULL");
    }

    #[test]
    fn result_outlives_unrelated_failures() {
        silent_logs! {
            let (stub, driver) = stub_driver();
            stub.push_result(&["n"], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
            let mut result = driver.query("SELECT n FROM t", ()).unwrap().unwrap();
            assert!(driver.query("   ", ()).unwrap().is_none());
            assert_eq!(driver.error_code(), 1065);
            assert!(result.is_successful());
            assert_eq!(result.error_code(), 0);
            assert!(result.is_query().unwrap());
            assert_eq!(
                result.fetch_col("n", 0).unwrap(),
                [Value::Int(1), Value::Int(2)]
            );
        }
    }
}
