use crate::{
    Adapter, AdapterError, ColumnRef, DbError, ErrorReporting, Execution, Result, Row, Value,
    statement::SlotGuard,
};
use std::sync::Arc;

/// Rows or counters produced by one execution of a [`crate::Statement`].
///
/// Results are single pass: once `fetch_all` returned, or `fetch_row(n)`
/// returned fewer than `n` rows, any further fetch is a state error. A result
/// also stops being readable when its statement is executed again or another
/// statement executes on the same driver.
pub struct ResultSet<A: Adapter> {
    handle: Arc<SlotGuard<A>>,
    generation: u64,
    execution: Execution,
    exhausted: bool,
    /// Failure of a fetch on this result, executions that fail produce no result.
    error: Option<AdapterError>,
}

impl<A: Adapter> ResultSet<A> {
    pub(crate) fn new(handle: Arc<SlotGuard<A>>, generation: u64, execution: Execution) -> Self {
        Self {
            handle,
            generation,
            execution,
            exhausted: false,
            error: None,
        }
    }

    /// Whether the execution produced columns. Fails once a fetch on this result failed.
    pub fn is_query(&self) -> Result<bool> {
        if !self.is_successful() {
            return Err(DbError::state(format!(
                "Cannot inspect a failed execution: {}",
                self.error()
            )));
        }
        Ok(self.execution.field_count != 0)
    }

    pub fn field_count(&self) -> usize {
        self.execution.field_count
    }

    /// Best effort, 0 when the client does not know the size upfront.
    pub fn row_count(&self) -> u64 {
        self.execution.row_count
    }

    pub fn affected_rows(&self) -> u64 {
        self.execution.affected_rows
    }

    pub fn fetch_all(&mut self) -> Result<Vec<Row>> {
        self.readable()?;
        let rows = self.fetch(None)?;
        self.exhausted = true;
        Ok(rows)
    }

    /// Up to `count` rows, the result is exhausted once fewer are returned.
    pub fn fetch_row(&mut self, count: usize) -> Result<Vec<Row>> {
        self.readable()?;
        let rows = self.fetch(Some(count))?;
        if rows.len() < count {
            self.exhausted = true;
        }
        Ok(rows)
    }

    /// Values of one column over the next `row_count` rows, 0 reads them all.
    ///
    /// Rows lacking the column are skipped.
    pub fn fetch_col(&mut self, column: impl Into<ColumnRef>, row_count: usize) -> Result<Vec<Value>> {
        let column = column.into();
        let rows = if row_count == 0 {
            self.fetch_all()?
        } else {
            self.fetch_row(row_count)?
        };
        Ok(rows
            .iter()
            .filter_map(|row| row.project(&column).cloned())
            .collect())
    }

    fn fetch(&mut self, limit: Option<usize>) -> Result<Vec<Row>> {
        let rows = self
            .handle
            .driver
            .connection()
            .fetch(self.handle.key, self.generation, limit);
        if let Err(error) = &rows {
            if let Some(DbError::Adapter(error)) = DbError::of(error) {
                self.error = Some(error.clone());
            }
        }
        rows
    }

    fn readable(&self) -> Result<()> {
        if !self.is_query()? {
            return Err(DbError::state("Fetching from a statement that returns no rows"));
        }
        if self.exhausted {
            return Err(DbError::state("The result was already fetched"));
        }
        Ok(())
    }
}

impl<A: Adapter> ErrorReporting for ResultSet<A> {
    fn error_code(&self) -> i64 {
        self.error.as_ref().map_or(0, |e| e.code)
    }
    fn error(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }
}
