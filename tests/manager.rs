#[cfg(test)]
mod tests {
    use dbal::{Connect, DbError, Driver, Manager, Taggable};
    use dbal_tests::{StubAdapter, init_logs, silent_logs};
    use rand::{SeedableRng, rngs::StdRng};

    fn stub_driver(tag: &str) -> (StubAdapter, Driver<StubAdapter>) {
        let stub = StubAdapter::new();
        let driver = Driver::new(stub.clone(), [("driver", "stub")]).with_tag(tag);
        (stub, driver)
    }

    fn connected_driver(tag: &str) -> (StubAdapter, Driver<StubAdapter>) {
        let (stub, driver) = stub_driver(tag);
        driver.connect().expect("The stub driver must connect");
        (stub, driver)
    }

    #[test]
    fn weighted_selection() {
        init_logs();
        let (_, heavy) = connected_driver("RW");
        let (_, light) = connected_driver("RW");
        let manager = Manager::new();
        manager.add_driver(heavy.clone(), 9);
        manager.add_driver(light.clone(), 1);
        let mut rng = StdRng::seed_from_u64(42);
        const DRAWS: usize = 10_000;
        let heavy_count = (0..DRAWS)
            .filter(|_| manager.get_driver_with("", &mut rng).unwrap().same(&heavy))
            .count();
        // 9000 expected, more than ten standard deviations of slack
        assert!(
            (8700..=9300).contains(&heavy_count),
            "heavy driver picked {} times out of {}",
            heavy_count,
            DRAWS
        );
    }

    #[test]
    fn tag_filtering() {
        init_logs();
        let (_, primary) = connected_driver("RW");
        let (_, replica) = connected_driver("RO");
        replica.add_tag("REPORTING");
        let manager = Manager::new();
        manager.add_driver(primary.clone(), 10);
        manager.add_driver(replica.clone(), 1);
        for _ in 0..50 {
            assert!(manager.get_driver("RO").unwrap().same(&replica));
            assert!(manager.get_driver("REPORTING").unwrap().same(&replica));
            assert!(manager.get_driver("RW").unwrap().same(&primary));
        }
        assert!(replica.remove_tag("REPORTING"));
        assert_eq!(replica.tags(), ["RO"]);
        silent_logs! {
            let error = manager.get_driver("REPORTING").err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::NotFound(..))));
        }
    }

    #[test]
    fn dead_drivers_are_skipped() {
        silent_logs! {
            let (alive_stub, alive) = connected_driver("RW");
            let (dead_stub, dead) = connected_driver("RW");
            let (unreachable_stub, unreachable) = stub_driver("RW");
            dead_stub.set_alive(false);
            unreachable_stub.state().connect_failure = Some("Connection refused".into());
            assert!(unreachable.connect().is_err());
            let manager = Manager::new();
            manager.add_driver(dead, 10);
            manager.add_driver(unreachable, 10);
            manager.add_driver(alive.clone(), 1);
            for _ in 0..20 {
                assert!(manager.get_driver("RW").unwrap().same(&alive));
            }
            alive_stub.set_alive(false);
            let error = manager.get_driver("").err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::NotFound(..))));
            dead_stub.set_alive(true);
            assert!(manager.get_driver("").is_ok());
        }
    }

    #[test]
    fn removal() {
        silent_logs! {
            let (_, driver) = connected_driver("RW");
            let manager = Manager::new();
            assert!(manager.is_empty());
            let first = manager.add_driver(driver.clone(), 3);
            let second = manager.add_driver(driver.clone(), 0);
            assert_eq!(manager.factor(first), Some(3));
            assert_eq!(manager.factor(second), Some(1));
            assert!(manager.remove_driver(first).unwrap().same(&driver));
            assert!(manager.get_driver("RW").is_ok());
            manager.remove_driver(second);
            assert!(manager.is_empty());
            assert!(manager.get_driver("").is_err());
        }
    }

    #[test]
    fn selection_does_not_connect() {
        silent_logs! {
            let (stub, idle) = stub_driver("RW");
            let manager = Manager::new();
            manager.add_driver(idle.clone(), 10);
            let error = manager.get_driver("").err().unwrap();
            assert!(matches!(DbError::of(&error), Some(DbError::NotFound(..))));
            assert!(!idle.is_connected());
            assert_eq!(stub.connects(), 0);

            idle.connect().unwrap();
            assert!(manager.get_driver("RW").unwrap().same(&idle));
            idle.disconnect();
            assert!(manager.get_driver("RW").is_err());
            assert!(!idle.is_connected());
            assert_eq!(stub.connects(), 1);
        }
    }
}
