#[cfg(test)]
mod tests {
    use dbal_core::Driver;
    use dbal_sqlite::SqliteAdapter;
    use dbal_tests::{execute_tests, init_logs};
    use std::{fs, path::Path, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn sqlite() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/tests.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH).expect(
                format!("Failed to remove existing test database file {}", DB_PATH).as_str(),
            );
        }
        let driver = Driver::from_url(SqliteAdapter, &format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not parse the connection url");
        dbal_core::Connect::connect(&driver).expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        execute_tests(driver);
    }

    #[test]
    fn sqlite_memory() {
        init_logs();
        let driver = Driver::new(SqliteAdapter, [("path", ":memory:")]);
        execute_tests(driver);
    }
}
