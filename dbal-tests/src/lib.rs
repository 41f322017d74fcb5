mod books;
mod errors;
mod profiling;
mod simple;
mod statements;
mod stub;
#[cfg(not(feature = "disable-transactions"))]
mod transaction1;

use crate::{
    books::books, errors::errors, profiling::profiling, simple::simple, statements::statements,
};
use dbal_core::{Adapter, Driver, Value};
use log::LevelFilter;
use std::env;
pub use stub::*;
#[cfg(not(feature = "disable-transactions"))]
use transaction1::transaction1;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Backend agnostic checks every adapter is expected to pass.
pub fn execute_tests<A: Adapter>(driver: Driver<A>) {
    simple(&driver);
    statements(&driver);
    books(&driver);
    #[cfg(not(feature = "disable-transactions"))]
    transaction1(&driver);
    profiling(&driver);
    errors(&driver);
}

/// Text form of fetched values, comparable across backends returning
/// integers or strings for the same literal.
pub fn texts(values: &[Value]) -> Vec<String> {
    values.iter().map(|v| v.as_text().into_owned()).collect()
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
