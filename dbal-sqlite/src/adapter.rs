use crate::{CBox, SqliteLink, SqlitePrepared, error_from_db, error_message_from_ptr};
use dbal_core::{
    Adapter, AdapterError, AttributeId, ConnectParameters, Context, Error, Execution, ParamType,
    Parameters, Result, Row, Value, truncate_long,
};
use libsqlite3_sys::*;
use std::{
    ffi::{CString, c_char, c_int},
    ptr,
};

/// Not a SQLite limit: `sqlite3_busy_timeout` in milliseconds.
pub const BUSY_TIMEOUT: AttributeId = 1000;
/// Not a SQLite limit: `PRAGMA foreign_keys`.
pub const FOREIGN_KEYS: AttributeId = 1001;

static ATTRIBUTES: &[(&str, AttributeId)] = &[
    ("SQLITE_LIMIT_LENGTH", SQLITE_LIMIT_LENGTH),
    ("SQLITE_LIMIT_SQL_LENGTH", SQLITE_LIMIT_SQL_LENGTH),
    ("SQLITE_LIMIT_COLUMN", SQLITE_LIMIT_COLUMN),
    ("SQLITE_LIMIT_EXPR_DEPTH", SQLITE_LIMIT_EXPR_DEPTH),
    ("SQLITE_LIMIT_COMPOUND_SELECT", SQLITE_LIMIT_COMPOUND_SELECT),
    ("SQLITE_LIMIT_VDBE_OP", SQLITE_LIMIT_VDBE_OP),
    ("SQLITE_LIMIT_FUNCTION_ARG", SQLITE_LIMIT_FUNCTION_ARG),
    ("SQLITE_LIMIT_ATTACHED", SQLITE_LIMIT_ATTACHED),
    ("SQLITE_LIMIT_LIKE_PATTERN_LENGTH", SQLITE_LIMIT_LIKE_PATTERN_LENGTH),
    ("SQLITE_LIMIT_VARIABLE_NUMBER", SQLITE_LIMIT_VARIABLE_NUMBER),
    ("SQLITE_LIMIT_TRIGGER_DEPTH", SQLITE_LIMIT_TRIGGER_DEPTH),
    ("SQLITE_LIMIT_WORKER_THREADS", SQLITE_LIMIT_WORKER_THREADS),
    ("SQLITE_BUSY_TIMEOUT", BUSY_TIMEOUT),
    ("SQLITE_FOREIGN_KEYS", FOREIGN_KEYS),
];

/// Adapter for the bundled SQLite library.
///
/// Connect parameters:
/// * `path`: database file, `:memory:` when missing.
/// * `mode`: `ro`, `rw`, `rwc` (default) or `memory`.
///
/// Attributes are the `SQLITE_LIMIT_*` run time limits plus
/// `SQLITE_BUSY_TIMEOUT` and `SQLITE_FOREIGN_KEYS`.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteAdapter;

impl SqliteAdapter {
    fn open_flags(mode: Option<&str>) -> Result<c_int> {
        Ok(SQLITE_OPEN_URI
            | match mode.unwrap_or("rwc") {
                "ro" => SQLITE_OPEN_READONLY,
                "rw" => SQLITE_OPEN_READWRITE,
                "rwc" => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                "memory" => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_MEMORY,
                mode => {
                    let error = Error::msg(format!(
                        "Unknown sqlite open mode `{}`, expected one of ro, rw, rwc, memory",
                        mode
                    ));
                    log::error!("{:#}", error);
                    return Err(error);
                }
            })
    }
}

fn integer(attribute: AttributeId, value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        Error::msg(format!(
            "Attribute {} expects an integer, found `{}`",
            attribute, value
        ))
    })
}

impl Adapter for SqliteAdapter {
    type Link = SqliteLink;
    type Prepared = SqlitePrepared;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn resolve_attribute(&self, name: &str) -> Option<AttributeId> {
        ATTRIBUTES
            .iter()
            .find(|(k, ..)| *k == name)
            .map(|(.., v)| *v)
    }

    fn connect(&self, parameters: &ConnectParameters) -> Result<SqliteLink> {
        let path = parameters
            .get("path")
            .or(parameters.get("db"))
            .unwrap_or(":memory:");
        let flags = Self::open_flags(parameters.get("mode"))?;
        let context = || format!("While opening the sqlite database `{}`", path);
        let filename = CString::new(path).with_context(context)?;
        let mut connection: *mut sqlite3 = ptr::null_mut();
        let rc = unsafe { sqlite3_open_v2(filename.as_ptr(), &mut connection, flags, ptr::null()) };
        // The handle must be closed even when opening failed
        let link = SqliteLink::new(connection);
        if rc != SQLITE_OK {
            let message = if connection.is_null() {
                error_message_from_ptr(&unsafe { sqlite3_errstr(rc) }).to_string()
            } else {
                error_from_db(connection).message
            };
            return Err(Error::msg(message).context(context()));
        }
        log::debug!("Opened the sqlite database `{}`", path);
        Ok(link)
    }

    fn disconnect(&self, link: SqliteLink) -> Result<()> {
        drop(link);
        Ok(())
    }

    fn ping(&self, link: &mut SqliteLink) -> bool {
        link.exec("SELECT 1").is_ok()
    }

    fn set_attribute(&self, link: &mut SqliteLink, attribute: AttributeId, value: &Value) -> Result<()> {
        match attribute {
            BUSY_TIMEOUT => {
                let milliseconds = integer(attribute, value)?;
                let rc = unsafe { sqlite3_busy_timeout(link.handle(), milliseconds as c_int) };
                if rc != SQLITE_OK {
                    return Err(Error::new(error_from_db(link.handle())));
                }
                link.busy_timeout = Some(milliseconds);
            }
            FOREIGN_KEYS => {
                let enabled = integer(attribute, value)? != 0;
                link.exec(if enabled {
                    "PRAGMA foreign_keys = ON"
                } else {
                    "PRAGMA foreign_keys = OFF"
                })?;
            }
            limit if ATTRIBUTES.iter().any(|(.., v)| *v == limit) => {
                let value = integer(attribute, value)?;
                unsafe {
                    sqlite3_limit(link.handle(), limit, value as c_int);
                }
            }
            _ => return Err(Error::msg(format!("Unsupported sqlite attribute {}", attribute))),
        }
        Ok(())
    }

    fn get_attribute(&self, link: &mut SqliteLink, attribute: AttributeId) -> Result<Option<Value>> {
        Ok(match attribute {
            BUSY_TIMEOUT => link.busy_timeout.map(Value::Int),
            FOREIGN_KEYS => Some(link.scalar("PRAGMA foreign_keys")?),
            limit if ATTRIBUTES.iter().any(|(.., v)| *v == limit) => {
                Some(Value::Int(unsafe { sqlite3_limit(link.handle(), limit, -1) } as i64))
            }
            _ => None,
        })
    }

    fn last_insert_id(&self, link: &mut SqliteLink, _sequence: Option<&str>) -> Option<String> {
        let id = unsafe { sqlite3_last_insert_rowid(link.handle()) };
        (id != 0).then(|| id.to_string())
    }

    fn quote(&self, _link: &mut SqliteLink, value: &[u8], kind: ParamType) -> Result<String> {
        Ok(match kind {
            ParamType::Lob => {
                let mut result = String::with_capacity(value.len() * 2 + 3);
                result.push_str("X'");
                for byte in value {
                    result.push_str(&format!("{:02X}", byte));
                }
                result.push('\'');
                result
            }
            _ => format!("'{}'", String::from_utf8_lossy(value).replace('\'', "''")),
        })
    }

    fn prepare(&self, link: &mut SqliteLink, sql: &str) -> Result<SqlitePrepared, AdapterError> {
        let db = link.handle();
        let mut statement = CBox::new(ptr::null_mut(), |p: *mut sqlite3_stmt| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                db,
                sql.as_ptr() as *const c_char,
                sql.len() as c_int,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(error_from_db(db));
        }
        if statement.is_null() {
            return Err(AdapterError::new(SQLITE_MISUSE as i64, "The query is empty"));
        }
        if !tail.is_null() {
            let consumed = tail as usize - sql.as_ptr() as usize;
            let remaining = sql.get(consumed..).unwrap_or_default();
            if !remaining.trim().is_empty() {
                return Err(AdapterError::new(
                    SQLITE_MISUSE as i64,
                    format!(
                        "Cannot prepare more than one statement at a time, found `{}` after the first one",
                        truncate_long!(remaining)
                    ),
                ));
            }
        }
        Ok(SqlitePrepared::new(statement))
    }

    fn execute(
        &self,
        link: &mut SqliteLink,
        prepared: &mut SqlitePrepared,
        parameters: &Parameters,
    ) -> Result<Execution, AdapterError> {
        prepared.reset();
        prepared.bind(parameters)?;
        let db = link.handle();
        let before = unsafe { sqlite3_total_changes64(db) };
        prepared.step()?;
        let field_count = prepared.column_count();
        let affected_rows = if field_count == 0 {
            (unsafe { sqlite3_total_changes64(db) } - before).max(0) as u64
        } else {
            0
        };
        Ok(Execution {
            field_count,
            row_count: 0,
            affected_rows,
        })
    }

    fn fetch_row(&self, prepared: &mut SqlitePrepared, limit: usize) -> Result<Vec<Row>, AdapterError> {
        prepared.fetch(limit)
    }

    fn close(&self, prepared: &mut SqlitePrepared) {
        prepared.reset();
    }

    fn begin(&self, link: &mut SqliteLink) -> Result<(), AdapterError> {
        link.exec("BEGIN")
    }

    fn commit(&self, link: &mut SqliteLink) -> Result<(), AdapterError> {
        link.exec("COMMIT")
    }

    fn rollback(&self, link: &mut SqliteLink) -> Result<(), AdapterError> {
        link.exec("ROLLBACK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_flags() {
        assert_eq!(
            SqliteAdapter::open_flags(None).unwrap(),
            SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE
        );
        assert_eq!(
            SqliteAdapter::open_flags(Some("ro")).unwrap(),
            SQLITE_OPEN_URI | SQLITE_OPEN_READONLY
        );
        assert!(SqliteAdapter::open_flags(Some("append")).is_err());
    }

    #[test]
    fn attribute_table() {
        assert_eq!(
            SqliteAdapter.resolve_attribute("SQLITE_LIMIT_LENGTH"),
            Some(SQLITE_LIMIT_LENGTH)
        );
        assert_eq!(SqliteAdapter.resolve_attribute("SQLITE_BUSY_TIMEOUT"), Some(BUSY_TIMEOUT));
        assert_eq!(SqliteAdapter.resolve_attribute("PDO::ATTR_ERRMODE"), None);
    }
}
