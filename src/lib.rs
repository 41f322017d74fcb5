//! Driver agnostic database access: lazy connections, prepared statements,
//! results, transactions, a query profiler and a weighted driver pool.
//!
//! Backends are [`Adapter`] implementations; SQLite ships behind the default
//! `sqlite` feature.

pub use dbal_core::*;
#[cfg(feature = "sqlite")]
pub use dbal_sqlite::*;
