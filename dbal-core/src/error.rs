use crate::Error;

/// Error code recorded on the connection for failures raised by dbal itself
/// rather than by the native client (e.g. executing an unprepared statement).
pub const INTERNAL_ERROR_CODE: i64 = -1;

/// Failure reported by the native client library during prepare, execute,
/// fetch or transaction control.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct AdapterError {
    pub code: i64,
    pub message: String,
}

impl AdapterError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Classification of every error produced by dbal.
///
/// Operations return [`crate::Result`]; the concrete kind travels inside the
/// `anyhow::Error` and can be recovered with [`DbError::of`].
///
/// Configuration and protocol errors are always returned as `Err`. Adapter
/// failures of `prepare`, `execute` and `query` are instead recorded on the
/// connection and signaled with `Ok(None)` / `Ok(false)`, see [`ErrorReporting`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    /// Missing or invalid connect parameters, unknown attribute, missing profiler.
    #[error("{0}")]
    Configuration(String),
    /// The adapter could not establish the link.
    #[error("Could not connect: {0}")]
    Connection(String),
    /// Misuse of the prepare / execute / transaction protocol.
    #[error("{0}")]
    Protocol(String),
    /// Failure surfaced by the native client.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// The manager found no eligible driver.
    #[error("{0}")]
    NotFound(String),
    /// Misuse of a result.
    #[error("{0}")]
    State(String),
}

impl DbError {
    /// The dbal error kind carried by `error`, if any.
    pub fn of(error: &Error) -> Option<&DbError> {
        error.downcast_ref::<DbError>()
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Error {
        crate::log_error!(Error::new(DbError::Configuration(message.into())))
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Error {
        crate::log_error!(Error::new(DbError::Protocol(message.into())))
    }

    pub(crate) fn state(message: impl Into<String>) -> Error {
        crate::log_error!(Error::new(DbError::State(message.into())))
    }
}

/// Access to the error state of the last operation on a connection.
pub trait ErrorReporting {
    /// `true` when the last operation left no error behind.
    fn is_successful(&self) -> bool {
        self.error_code() == 0
    }
    /// Native error code of the last failure, 0 when none.
    fn error_code(&self) -> i64;
    /// Native error message of the last failure, empty when none.
    fn error(&self) -> String;
}
