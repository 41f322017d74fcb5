use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Formats a query for logs and error contexts, cutting it after a few hundred bytes.
#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query: &str = ::std::convert::AsRef::<str>::as_ref(&$query);
        let mut end = ::std::cmp::min(query.len(), 497);
        while !query.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}{}",
            query[..end].trim(),
            if query.len() > end { "..." } else { "" },
        )
    }};
}

/// Logs the error at the point it is produced and hands it back.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {{
        let error = $error;
        ::log::error!("{:#}", error);
        error
    }};
}

/// Locks the mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
