use crate::{CBox, error_from_db};
use dbal_core::{AdapterError, Value};
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_ROW, sqlite3, sqlite3_close, sqlite3_exec, sqlite3_finalize,
    sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt,
};
use std::{
    ffi::{CString, c_char, c_int},
    ptr,
};

/// Open SQLite database.
pub struct SqliteLink {
    pub(crate) connection: CBox<*mut sqlite3>,
    pub(crate) busy_timeout: Option<i64>,
}

impl SqliteLink {
    pub(crate) fn new(connection: *mut sqlite3) -> Self {
        Self {
            connection: CBox::new(connection, |p| unsafe {
                sqlite3_close(p);
            }),
            busy_timeout: None,
        }
    }

    /// The raw database handle, valid as long as the link is.
    pub fn handle(&self) -> *mut sqlite3 {
        *self.connection
    }

    /// Run statements that do not return rows.
    pub(crate) fn exec(&self, sql: &str) -> Result<(), AdapterError> {
        let sql = CString::new(sql).map_err(|e| {
            AdapterError::new(libsqlite3_sys::SQLITE_MISUSE as i64, e.to_string())
        })?;
        unsafe {
            let rc = sqlite3_exec(
                *self.connection,
                sql.as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            );
            if rc != SQLITE_OK {
                return Err(error_from_db(*self.connection));
            }
        }
        Ok(())
    }

    /// First column of the first row of `sql`, `Null` when there are no rows.
    pub(crate) fn scalar(&self, sql: &str) -> Result<Value, AdapterError> {
        unsafe {
            let db = *self.connection;
            let mut statement = CBox::new(ptr::null_mut(), |p: *mut sqlite3_stmt| {
                sqlite3_finalize(p);
            });
            let rc = sqlite3_prepare_v2(
                db,
                sql.as_ptr() as *const c_char,
                sql.len() as c_int,
                &mut *statement,
                ptr::null_mut(),
            );
            if rc != SQLITE_OK {
                return Err(error_from_db(db));
            }
            match sqlite3_step(*statement) {
                SQLITE_ROW => crate::extract::extract_value(*statement, 0),
                SQLITE_DONE => Ok(Value::Null),
                _ => Err(error_from_db(db)),
            }
        }
    }
}
