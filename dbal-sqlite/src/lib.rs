mod adapter;
mod cbox;
mod extract;
mod link;
mod prepared;

pub use adapter::*;
pub(crate) use cbox::*;
pub use link::*;
pub use prepared::*;

use dbal_core::AdapterError;
use libsqlite3_sys::{sqlite3, sqlite3_errmsg, sqlite3_extended_errcode};
use std::{
    ffi::{CStr, c_char},
    ptr,
};

pub(crate) fn error_message_from_ptr(ptr: &'_ *const c_char) -> &'_ str {
    unsafe {
        if *ptr != ptr::null() {
            CStr::from_ptr(*ptr)
                .to_str()
                .unwrap_or("Unknown error (the error message was not a valid C string)")
        } else {
            "Unknown error (could not extract the error message)"
        }
    }
}

/// Last error recorded on the database handle.
pub(crate) fn error_from_db(db: *mut sqlite3) -> AdapterError {
    unsafe {
        AdapterError::new(
            sqlite3_extended_errcode(db) as i64,
            error_message_from_ptr(&sqlite3_errmsg(db)),
        )
    }
}
