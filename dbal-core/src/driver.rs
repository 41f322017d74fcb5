use crate::{
    Adapter, Attribute, ConnectParameters, Connect, Connection, DbError, ErrorReporting,
    ManagedDriver, ParamType, Parameters, Profiler, Quote, Result, ResultSet, Statement, Taggable,
    Transactional, Value,
    util::{lock, read, write},
};
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

struct DriverInner<A: Adapter> {
    connection: Mutex<Connection<A>>,
    profiler: Mutex<Option<Profiler>>,
    tags: RwLock<BTreeSet<String>>,
}

/// Entry point of the library: a connection to one database through an [`Adapter`].
///
/// Cloning is cheap and every clone refers to the same connection. Calls
/// through different clones are serialized, the connection itself runs one
/// operation at a time.
///
/// ```rust,ignore
/// let driver = Driver::new(SqliteAdapter, [("path", ":memory:")]);
/// let mut result = driver.query("SELECT ? AS col", [2])?.expect("query failed");
/// assert_eq!(result.fetch_col("col", 1)?, [Value::Int(2)]);
/// ```
pub struct Driver<A: Adapter> {
    inner: Arc<DriverInner<A>>,
}

impl<A: Adapter> Clone for Driver<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: Adapter> Driver<A> {
    pub fn new(adapter: A, parameters: impl Into<ConnectParameters>) -> Self {
        Self::from_connection(Connection::new(adapter, parameters.into()))
    }

    pub fn from_url(adapter: A, url: &str) -> Result<Self> {
        Ok(Self::new(adapter, ConnectParameters::from_url(url)?))
    }

    /// Adopt a link that is already connected.
    pub fn with_link(adapter: A, link: A::Link) -> Self {
        Self::from_connection(Connection::with_link(adapter, link))
    }

    fn from_connection(connection: Connection<A>) -> Self {
        Self {
            inner: Arc::new(DriverInner {
                connection: Mutex::new(connection),
                profiler: Mutex::new(None),
                tags: Default::default(),
            }),
        }
    }

    pub fn with_tag(self, tag: &str) -> Self {
        self.add_tag(tag);
        self
    }

    pub(crate) fn connection(&self) -> MutexGuard<'_, Connection<A>> {
        lock(&self.inner.connection)
    }

    /// Whether both handles refer to the same connection.
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` on the live native link, connecting first if needed.
    pub fn link<R>(&self, f: impl FnOnce(&A, &mut A::Link) -> R) -> Result<R> {
        self.connection().run(f)
    }

    /// Prepare `sql`, `Ok(None)` when the adapter refused it.
    pub fn prepare(&self, sql: &str) -> Result<Option<Statement<A>>> {
        if let Some(profiler) = lock(&self.inner.profiler).as_mut() {
            profiler.set_sql(sql);
        }
        let mut statement = Statement::new(self.clone());
        Ok(statement.prepare(sql)?.then_some(statement))
    }

    /// Prepare and execute `sql` in one step, `Ok(None)` when the adapter failed.
    pub fn query(
        &self,
        sql: &str,
        parameters: impl Into<Parameters>,
    ) -> Result<Option<ResultSet<A>>> {
        let Some(mut statement) = self.prepare(sql)? else {
            return Ok(None);
        };
        let parameters = parameters.into();
        if let Some(profiler) = lock(&self.inner.profiler).as_mut() {
            profiler.set_parameters(parameters.clone());
        }
        let result = statement.execute(parameters)?;
        if result.is_some() {
            if let Some(profiler) = lock(&self.inner.profiler).as_mut() {
                profiler.set_execution_time(statement.execution_time());
            }
        }
        Ok(result)
    }

    /// Run a statement that modifies data, returning the affected rows.
    pub fn execute(&self, sql: &str, parameters: impl Into<Parameters>) -> Result<Option<u64>> {
        Ok(self
            .query(sql, parameters)?
            .map(|result| result.affected_rows()))
    }

    /// `None` when not connected or when the backend cannot tell.
    pub fn last_insert_id(&self, sequence: Option<&str>) -> Option<String> {
        self.connection().last_insert_id(sequence)
    }

    pub fn driver_name(&self) -> String {
        self.connection().driver_name()
    }

    /// Record every query from now on, keeping the current profiler if any.
    pub fn enable_profiling(&self) -> &Self {
        lock(&self.inner.profiler).get_or_insert_with(Profiler::new);
        self
    }

    pub fn set_profiler(&self, profiler: Profiler) -> &Self {
        *lock(&self.inner.profiler) = Some(profiler);
        self
    }

    /// Detach the profiler, returning it.
    pub fn disable_profiling(&self) -> Option<Profiler> {
        lock(&self.inner.profiler).take()
    }

    pub fn is_profiling(&self) -> bool {
        lock(&self.inner.profiler).is_some()
    }

    /// Snapshot of the profiler.
    pub fn profiler(&self) -> Result<Profiler> {
        lock(&self.inner.profiler)
            .clone()
            .ok_or_else(|| DbError::configuration("Profiling is not enabled on this driver"))
    }

    /// The last profiled query with its parameters quoted in place.
    pub fn profiled_sql(&self) -> Result<String> {
        self.profiler()?.interpolate(self)
    }
}

impl<A: Adapter> Connect for Driver<A> {
    fn connect(&self) -> Result<&Self> {
        self.connection().connect()?;
        Ok(self)
    }

    fn disconnect(&self) -> &Self {
        self.connection().disconnect();
        self
    }

    fn is_connected(&self) -> bool {
        self.connection().is_connected()
    }

    fn ping(&self) -> bool {
        self.connection().ping()
    }

    fn set_attribute(
        &self,
        attribute: impl Into<Attribute>,
        value: impl Into<Value>,
    ) -> Result<&Self> {
        self.connection()
            .set_attribute(&attribute.into(), value.into())?;
        Ok(self)
    }

    fn get_attribute(&self, attribute: impl Into<Attribute>) -> Result<Option<Value>> {
        self.connection().get_attribute(&attribute.into())
    }
}

impl<A: Adapter> Transactional for Driver<A> {
    fn in_transaction(&self) -> bool {
        self.connection().in_transaction()
    }

    fn begin(&self) -> Result<&Self> {
        self.connection().begin()?;
        Ok(self)
    }

    fn commit(&self) -> Result<&Self> {
        self.connection().commit()?;
        Ok(self)
    }

    fn rollback(&self) -> Result<&Self> {
        self.connection().rollback()?;
        Ok(self)
    }
}

impl<A: Adapter> ErrorReporting for Driver<A> {
    fn error_code(&self) -> i64 {
        self.connection().error_code()
    }

    fn error(&self) -> String {
        self.connection().error()
    }
}

impl<A: Adapter> Quote for Driver<A> {
    fn quote(&self, value: &Value, hint: Option<ParamType>) -> Result<String> {
        self.connection().quote(value, hint)
    }
}

impl<A: Adapter> Taggable for Driver<A> {
    fn add_tag(&self, tag: &str) {
        write(&self.inner.tags).insert(tag.into());
    }

    fn remove_tag(&self, tag: &str) -> bool {
        write(&self.inner.tags).remove(tag)
    }

    fn has_tag(&self, tag: &str) -> bool {
        read(&self.inner.tags).contains(tag)
    }

    fn tags(&self) -> Vec<String> {
        read(&self.inner.tags).iter().cloned().collect()
    }
}

impl<A: Adapter> ManagedDriver for Driver<A> {
    /// A driver never connected, or disconnected, is not alive.
    fn is_alive(&self) -> bool {
        self.ping()
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(self)
    }
}
