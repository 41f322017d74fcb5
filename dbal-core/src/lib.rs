mod adapter;
mod attribute;
mod config;
mod connect;
mod connection;
mod driver;
mod error;
mod manager;
mod parameters;
mod profiler;
mod quote;
mod result;
mod row;
mod statement;
mod taggable;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use adapter::*;
pub use attribute::*;
pub use config::*;
pub use connect::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use manager::*;
pub use parameters::*;
pub use profiler::*;
pub use quote::*;
pub use result::*;
pub use row::*;
pub use statement::*;
pub use taggable::*;
pub use transaction::*;
pub use value::*;

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type Error = anyhow::Error;
