#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use dbal::{Connect, Driver, Manager, SqliteAdapter, Value};
    use dbal_tests::init_logs;

    #[test]
    fn pooled_sqlite() {
        init_logs();
        let manager = Manager::new();
        for tag in ["RW", "RO"] {
            let driver = Driver::from_url(SqliteAdapter, "sqlite://:memory:")
                .unwrap()
                .with_tag(tag);
            driver.connect().expect("Could not open the database");
            manager.add_driver(driver, 5);
        }
        let driver = manager.get_driver("RO").unwrap();
        let mut result = driver
            .query("SELECT ? + ? AS total", [20, 22])
            .unwrap()
            .unwrap();
        assert_eq!(result.fetch_col("total", 0).unwrap(), [Value::Int(42)]);
    }
}
