use crate::{Adapter, DbError, Driver, ErrorReporting, Parameters, Result, ResultSet};
use std::{sync::Arc, time::Instant};

/// Registration of a statement in the connection arena, shared by the
/// statement and its results. The prepared handle is released when the last
/// of them goes away.
pub(crate) struct SlotGuard<A: Adapter> {
    pub(crate) driver: Driver<A>,
    pub(crate) key: u64,
}

impl<A: Adapter> Drop for SlotGuard<A> {
    fn drop(&mut self) {
        self.driver.connection().release(self.key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unprepared,
    Prepared,
    Failed,
}

/// One SQL text prepared against a driver, executable many times.
///
/// Preparing is a one shot operation: a second `prepare` fails with a
/// protocol error, whether the first attempt succeeded or not.
pub struct Statement<A: Adapter> {
    handle: Arc<SlotGuard<A>>,
    state: State,
    sql: String,
    execution_time: f64,
}

impl<A: Adapter> Statement<A> {
    pub(crate) fn new(driver: Driver<A>) -> Self {
        let key = driver.connection().register_statement();
        Self {
            handle: Arc::new(SlotGuard { driver, key }),
            state: State::Unprepared,
            sql: String::new(),
            execution_time: 0.0,
        }
    }

    /// Returns `Ok(false)` when the adapter refused the query, its error is
    /// then available on the driver.
    pub fn prepare(&mut self, sql: &str) -> Result<bool> {
        if self.state != State::Unprepared {
            return Err(DbError::protocol(format!(
                "Statement prepared twice, it already holds `{}`",
                crate::truncate_long!(self.sql)
            )));
        }
        self.sql = sql.into();
        let prepared = self
            .handle
            .driver
            .connection()
            .prepare_statement(self.handle.key, sql);
        self.state = match prepared {
            Ok(true) => State::Prepared,
            _ => State::Failed,
        };
        prepared
    }

    pub fn is_prepared(&self) -> bool {
        self.state == State::Prepared
    }

    /// Bind `parameters` and run the statement.
    ///
    /// Returns `Ok(None)` when the adapter failed, the error is recorded on the
    /// driver. Results of a previous execution of this statement become invalid.
    pub fn execute(&mut self, parameters: impl Into<Parameters>) -> Result<Option<ResultSet<A>>> {
        let parameters = parameters.into();
        let mut connection = self.handle.driver.connection();
        if self.state != State::Prepared {
            return Err(connection.protocol_failure("Statement is not prepared"));
        }
        let start = Instant::now();
        let outcome = connection.execute_statement(self.handle.key, &parameters)?;
        drop(connection);
        let Some((execution, generation)) = outcome else {
            return Ok(None);
        };
        self.execution_time = start.elapsed().as_secs_f64();
        log::trace!(
            "Executed in {:.6}s: {}",
            self.execution_time,
            crate::truncate_long!(self.sql)
        );
        Ok(Some(ResultSet::new(
            self.handle.clone(),
            generation,
            execution,
        )))
    }

    /// Seconds taken by the last successful execution, 0 before any.
    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn driver(&self) -> &Driver<A> {
        &self.handle.driver
    }
}

impl<A: Adapter> ErrorReporting for Statement<A> {
    fn error_code(&self) -> i64 {
        self.handle.driver.error_code()
    }
    fn error(&self) -> String {
        self.handle.driver.error()
    }
}
