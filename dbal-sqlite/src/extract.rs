use dbal_core::{AdapterError, Value};
use libsqlite3_sys::*;
use std::ffi::{CStr, c_int};

pub(crate) fn extract_value(statement: *mut sqlite3_stmt, index: c_int) -> Result<Value, AdapterError> {
    unsafe {
        let column_type = sqlite3_column_type(statement, index);
        Ok(match column_type {
            SQLITE_NULL => Value::Null,
            SQLITE_INTEGER => Value::Int(sqlite3_column_int64(statement, index)),
            SQLITE_FLOAT => Value::Float(sqlite3_column_double(statement, index)),
            SQLITE_BLOB => {
                let ptr = sqlite3_column_blob(statement, index) as *const u8;
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() {
                    Value::Blob(Box::default())
                } else {
                    Value::Blob(std::slice::from_raw_parts(ptr, len).into())
                }
            }
            SQLITE_TEXT => {
                let ptr = sqlite3_column_text(statement, index);
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() {
                    Value::Varchar(String::new())
                } else {
                    let bytes = std::slice::from_raw_parts(ptr, len);
                    Value::Varchar(String::from_utf8_lossy(bytes).into_owned())
                }
            }
            _ => {
                return Err(AdapterError::new(
                    SQLITE_MISMATCH as i64,
                    format!("Unexpected column type {}", column_type),
                ));
            }
        })
    }
}

pub(crate) fn extract_name(statement: *mut sqlite3_stmt, index: c_int) -> String {
    unsafe {
        let name = sqlite3_column_name(statement, index);
        if name.is_null() {
            return index.to_string();
        }
        CStr::from_ptr(name).to_string_lossy().into_owned()
    }
}
