use crate::{
    CBox, error_from_db,
    extract::{extract_name, extract_value},
};
use dbal_core::{AdapterError, ParamKey, ParamType, Parameters, Row, RowNames, Value, truncate_long};
use libsqlite3_sys::*;
use std::{
    borrow::Cow,
    ffi::{CStr, CString, c_int},
    fmt::{self, Display},
    os::raw::{c_char, c_void},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Reset, waiting for the next execution.
    Idle,
    /// Positioned on a row not yet returned.
    Row,
    Done,
}

pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    labels: RowNames,
    cursor: Cursor,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>) -> Self {
        let labels = unsafe {
            let count = sqlite3_column_count(*statement);
            (0..count).map(|i| extract_name(*statement, i)).collect()
        };
        Self {
            statement,
            labels,
            cursor: Cursor::Idle,
        }
    }

    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    fn db(&self) -> *mut sqlite3 {
        unsafe { sqlite3_db_handle(*self.statement) }
    }

    pub(crate) fn reset(&mut self) {
        unsafe {
            sqlite3_reset(*self.statement);
        }
        self.cursor = Cursor::Idle;
    }

    /// Bind every parameter: positions start from 1 on the SQLite side, names
    /// are looked up with their `:` prefix.
    pub(crate) fn bind(&mut self, parameters: &Parameters) -> Result<(), AdapterError> {
        unsafe {
            sqlite3_clear_bindings(*self.statement);
        }
        for (key, param) in parameters.iter() {
            let index = match key {
                ParamKey::Index(index) => *index as c_int + 1,
                ParamKey::Name(name) => {
                    let placeholder = CString::new(format!(":{}", name)).map_err(|e| {
                        AdapterError::new(SQLITE_MISUSE as i64, e.to_string())
                    })?;
                    let index =
                        unsafe { sqlite3_bind_parameter_index(*self.statement, placeholder.as_ptr()) };
                    if index == 0 {
                        return Err(AdapterError::new(
                            SQLITE_RANGE as i64,
                            format!("The query has no parameter named `:{}`", name),
                        ));
                    }
                    index
                }
            };
            self.bind_index(&param.value, param.kind(), index)?;
        }
        Ok(())
    }

    fn bind_index(&mut self, value: &Value, kind: ParamType, index: c_int) -> Result<(), AdapterError> {
        let statement = *self.statement;
        let rc = unsafe {
            match (kind, value) {
                (ParamType::Null, ..) | (.., Value::Null) => sqlite3_bind_null(statement, index),
                (ParamType::Bool, Value::Boolean(v)) => {
                    sqlite3_bind_int(statement, index, *v as c_int)
                }
                (ParamType::Bool, v) => {
                    sqlite3_bind_int(statement, index, (v.as_i64().unwrap_or(0) != 0) as c_int)
                }
                (ParamType::Int, v) if v.as_i64().is_some() => {
                    sqlite3_bind_int64(statement, index, v.as_i64().unwrap_or_default())
                }
                (ParamType::Lob, v) => {
                    let bytes: Cow<'_, [u8]> = match v {
                        Value::Blob(v) => Cow::Borrowed(v.as_ref()),
                        _ => Cow::Owned(v.as_text().into_owned().into_bytes()),
                    };
                    sqlite3_bind_blob(
                        statement,
                        index,
                        bytes.as_ptr() as *const c_void,
                        bytes.len() as c_int,
                        SQLITE_TRANSIENT(),
                    )
                }
                (.., Value::Float(v)) => sqlite3_bind_double(statement, index, *v),
                (.., Value::Int(v)) => sqlite3_bind_int64(statement, index, *v),
                (.., v) => {
                    let text = v.as_text();
                    sqlite3_bind_text(
                        statement,
                        index,
                        text.as_ptr() as *const c_char,
                        text.len() as c_int,
                        SQLITE_TRANSIENT(),
                    )
                }
            }
        };
        if rc != SQLITE_OK {
            let mut error = error_from_db(self.db());
            let sql = self.sql();
            error.message = format!(
                "Cannot bind parameter {} to query `{}`: {}",
                index,
                truncate_long!(sql),
                error.message
            );
            log::error!("{}", error);
            return Err(error);
        }
        Ok(())
    }

    /// Step to the next row. A locked database fails with `SQLITE_BUSY` once
    /// the busy timeout of the link has elapsed.
    pub(crate) fn step(&mut self) -> Result<(), AdapterError> {
        match unsafe { sqlite3_step(*self.statement) } {
            SQLITE_ROW => self.cursor = Cursor::Row,
            SQLITE_DONE => self.cursor = Cursor::Done,
            _ => {
                self.cursor = Cursor::Done;
                return Err(error_from_db(self.db()));
            }
        }
        Ok(())
    }

    pub(crate) fn fetch(&mut self, limit: usize) -> Result<Vec<Row>, AdapterError> {
        let mut rows = Vec::new();
        while rows.len() < limit && self.cursor == Cursor::Row {
            let values = (0..self.labels.len() as c_int)
                .map(|i| extract_value(*self.statement, i))
                .collect::<Result<Box<[Value]>, _>>()?;
            rows.push(Row::new(self.labels.clone(), values));
            self.step()?;
        }
        Ok(rows)
    }

    pub fn sql(&self) -> String {
        unsafe {
            let sql = sqlite3_sql(*self.statement);
            if sql.is_null() {
                return String::new();
            }
            CStr::from_ptr(sql).to_string_lossy().into_owned()
        }
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:p}", *self.statement)
    }
}
