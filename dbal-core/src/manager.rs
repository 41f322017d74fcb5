use crate::{
    DbError, Error, Result, Taggable,
    util::{read, write},
};
use rand::Rng;
use std::{collections::BTreeMap, fmt, iter, sync::RwLock};

/// Lowest and highest selection weight of a pooled driver.
pub const MIN_FACTOR: u8 = 1;
pub const MAX_FACTOR: u8 = 10;

/// What the [`Manager`] needs from a pooled driver.
pub trait ManagedDriver: Clone + Send + Sync {
    /// Liveness check, run on every selection.
    fn is_alive(&self) -> bool;
    /// Tag support, drivers without it only match the empty tag.
    fn as_taggable(&self) -> Option<&dyn Taggable> {
        None
    }
}

/// Token identifying a pool entry, issued by [`Manager::add_driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverId(u64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Pool<D> {
    entries: BTreeMap<DriverId, (D, u8)>,
    next_id: u64,
}

/// Weighted pool of drivers, picking one live driver per request.
///
/// Each eligible driver is chosen with a probability proportional to its
/// factor. Adding the same driver twice creates two independent entries.
pub struct Manager<D: ManagedDriver> {
    pool: RwLock<Pool<D>>,
}

impl<D: ManagedDriver> Manager<D> {
    pub fn new() -> Self {
        Self {
            pool: RwLock::new(Pool {
                entries: Default::default(),
                next_id: 0,
            }),
        }
    }

    /// Add `driver` with a selection weight clamped to `1..=10`.
    pub fn add_driver(&self, driver: D, factor: i64) -> DriverId {
        let factor = factor.clamp(MIN_FACTOR as i64, MAX_FACTOR as i64) as u8;
        let mut pool = write(&self.pool);
        let id = DriverId(pool.next_id);
        pool.next_id += 1;
        pool.entries.insert(id, (driver, factor));
        log::debug!("Driver {} added to the pool with factor {}", id, factor);
        id
    }

    pub fn remove_driver(&self, id: DriverId) -> Option<D> {
        write(&self.pool).entries.remove(&id).map(|(driver, ..)| driver)
    }

    pub fn factor(&self, id: DriverId) -> Option<u8> {
        read(&self.pool).entries.get(&id).map(|(.., factor)| *factor)
    }

    pub fn len(&self) -> usize {
        read(&self.pool).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.pool).entries.is_empty()
    }

    /// Pick a live driver carrying `tag` (any driver when empty).
    pub fn get_driver(&self, tag: &str) -> Result<D> {
        self.get_driver_with(tag, &mut rand::rng())
    }

    /// Same as [`Manager::get_driver`] drawing from `rng`.
    pub fn get_driver_with<R: Rng + ?Sized>(&self, tag: &str, rng: &mut R) -> Result<D> {
        // Liveness checks can block on the network, the lock is not held meanwhile
        let snapshot: Vec<_> = read(&self.pool)
            .entries
            .values()
            .map(|(driver, factor)| (driver.clone(), *factor))
            .collect();
        let mut candidates = Vec::new();
        for (index, (driver, factor)) in snapshot.iter().enumerate() {
            if !driver.is_alive() {
                continue;
            }
            if !tag.is_empty()
                && !driver
                    .as_taggable()
                    .is_some_and(|taggable| taggable.has_tag(tag))
            {
                continue;
            }
            candidates.extend(iter::repeat_n(index, *factor as usize));
        }
        if candidates.is_empty() {
            let error = Error::new(DbError::NotFound(if tag.is_empty() {
                "No live driver in the pool".into()
            } else {
                format!("No live driver tagged `{}` in the pool", tag)
            }));
            return Err(crate::log_error!(error));
        }
        let index = candidates[rng.random_range(0..candidates.len())];
        Ok(snapshot[index].0.clone())
    }
}

impl<D: ManagedDriver> Default for Manager<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Fixed(bool);

    impl ManagedDriver for Fixed {
        fn is_alive(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn factor_is_clamped() {
        let manager = Manager::new();
        let low = manager.add_driver(Fixed(true), -3);
        let high = manager.add_driver(Fixed(true), 42);
        let mid = manager.add_driver(Fixed(true), 5);
        assert_eq!(manager.factor(low), Some(1));
        assert_eq!(manager.factor(high), Some(10));
        assert_eq!(manager.factor(mid), Some(5));
    }

    #[test]
    fn identity_tokens() {
        let manager = Manager::new();
        let driver = Fixed(true);
        let a = manager.add_driver(driver.clone(), 1);
        let b = manager.add_driver(driver, 1);
        assert_ne!(a, b);
        assert_eq!(manager.len(), 2);
        assert!(manager.remove_driver(a).is_some());
        assert!(manager.remove_driver(a).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn untaggable_excluded_by_tag() {
        let manager = Manager::new();
        manager.add_driver(Fixed(true), 1);
        assert!(manager.get_driver("").is_ok());
        let error = manager.get_driver("RO").unwrap_err();
        assert!(matches!(DbError::of(&error), Some(DbError::NotFound(..))));
    }
}
