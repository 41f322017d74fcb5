use crate::{AdapterError, AttributeId, ConnectParameters, ParamType, Parameters, Result, Row, Value};

/// Counters of one successful execution, cached by the [`crate::ResultSet`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Number of columns produced, 0 for statements that do not return rows.
    pub field_count: usize,
    /// Rows in the result when the client knows it upfront, 0 otherwise.
    pub row_count: u64,
    /// Rows modified by an INSERT / UPDATE / DELETE.
    pub affected_rows: u64,
}

/// Native calls a backend must provide.
///
/// The core never looks inside the handles: a `Link` is produced by `connect`
/// and owned by the [`crate::Connection`], a `Prepared` is produced by
/// `prepare` and owned by the connection statement arena. Both are handed
/// back to the adapter on every subsequent call. Dropping a handle must
/// release the native resource.
///
/// # Error contract
/// * `connect`, attribute and quoting failures are plain errors, the core
///   classifies them (`Connection` / `Configuration`).
/// * `prepare`, `execute`, the fetch methods and transaction control return
///   an [`AdapterError`] carrying the native code and message, the core
///   records it on the connection.
///
/// # Single cursor
/// Only one prepared handle per link has a live cursor at a time. Before
/// another handle executes, the core calls `close` on the previous one.
pub trait Adapter: Send + 'static {
    type Link: Send;
    type Prepared: Send;

    /// Static identifier of the backend.
    fn name(&self) -> &'static str;

    /// Name of the backend behind a live link. Multi backend clients override
    /// this to report the actual server flavor.
    fn driver_name(&self, _link: &Self::Link) -> String {
        self.name().into()
    }

    /// Lookup of a symbolic attribute name in the adapter's static table.
    fn resolve_attribute(&self, name: &str) -> Option<AttributeId>;

    fn connect(&self, parameters: &ConnectParameters) -> Result<Self::Link>;
    fn disconnect(&self, link: Self::Link) -> Result<()>;
    /// Round trip to check the link is still usable.
    fn ping(&self, link: &mut Self::Link) -> bool;

    fn set_attribute(&self, link: &mut Self::Link, attribute: AttributeId, value: &Value) -> Result<()>;
    /// Current value on the link, `None` when the client cannot report it.
    fn get_attribute(&self, link: &mut Self::Link, attribute: AttributeId) -> Result<Option<Value>>;

    fn last_insert_id(&self, link: &mut Self::Link, sequence: Option<&str>) -> Option<String>;
    /// Native escaping and quoting. `value` holds the raw bytes for `Lob`,
    /// UTF-8 text for every other kind.
    fn quote(&self, link: &mut Self::Link, value: &[u8], kind: ParamType) -> Result<String>;

    fn prepare(&self, link: &mut Self::Link, sql: &str) -> Result<Self::Prepared, AdapterError>;
    /// Bind `parameters` and run the prepared handle, leaving its cursor on the first row.
    fn execute(
        &self,
        link: &mut Self::Link,
        prepared: &mut Self::Prepared,
        parameters: &Parameters,
    ) -> Result<Execution, AdapterError>;
    /// Up to `limit` rows from the cursor, fewer once it is exhausted.
    fn fetch_row(&self, prepared: &mut Self::Prepared, limit: usize) -> Result<Vec<Row>, AdapterError>;
    fn fetch_all(&self, prepared: &mut Self::Prepared) -> Result<Vec<Row>, AdapterError> {
        self.fetch_row(prepared, usize::MAX)
    }
    /// Release the cursor (and pending result) of a handle, keeping it reusable.
    fn close(&self, prepared: &mut Self::Prepared);

    fn begin(&self, link: &mut Self::Link) -> Result<(), AdapterError>;
    fn commit(&self, link: &mut Self::Link) -> Result<(), AdapterError>;
    fn rollback(&self, link: &mut Self::Link) -> Result<(), AdapterError>;
}
