use crate::{
    Adapter, AdapterError, Attribute, AttributeId, ConnectParameters, DbError, Error, Execution,
    INTERNAL_ERROR_CODE, ParamType, Parameters, Result, Row, Value, quote::quote_value,
};
use std::collections::{BTreeMap, HashMap};

/// Arena entry owning the native prepared handle of one statement.
///
/// `generation` moves forward every time the cursor of the handle is
/// replaced or released, results remember the generation they were born in.
struct Slot<P> {
    prepared: Option<P>,
    generation: u64,
}

/// Owner of the native link and of every prepared handle created on it.
///
/// At most one statement holds the cursor of the link: executing (or
/// preparing) another statement closes the cursor of the previous holder,
/// invalidating its results.
pub struct Connection<A: Adapter> {
    adapter: A,
    link: Option<A::Link>,
    parameters: ConnectParameters,
    attributes: BTreeMap<AttributeId, Value>,
    transaction: bool,
    error: Option<AdapterError>,
    statements: HashMap<u64, Slot<A::Prepared>>,
    current: Option<u64>,
    next_key: u64,
}

impl<A: Adapter> Connection<A> {
    pub fn new(adapter: A, parameters: ConnectParameters) -> Self {
        Self {
            adapter,
            link: None,
            parameters,
            attributes: Default::default(),
            transaction: false,
            error: None,
            statements: Default::default(),
            current: None,
            next_key: 0,
        }
    }

    /// Wrap a link established elsewhere. Without connect parameters it
    /// cannot reconnect once disconnected.
    pub fn with_link(adapter: A, link: A::Link) -> Self {
        let mut result = Self::new(adapter, ConnectParameters::new());
        result.link = Some(link);
        result
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn parameters(&self) -> &ConnectParameters {
        &self.parameters
    }

    pub fn connect(&mut self) -> Result<()> {
        if self.link.is_some() {
            return Ok(());
        }
        if self.parameters.is_empty() {
            return Err(DbError::configuration("Missing connect parameters"));
        }
        let mut link = self.adapter.connect(&self.parameters).map_err(|e| {
            crate::log_error!(Error::new(DbError::Connection(format!("{:#}", e))))
        })?;
        for (name, value) in self.parameters.options() {
            match self.adapter.resolve_attribute(&name.to_ascii_uppercase()) {
                Some(id) => {
                    self.attributes.entry(id).or_insert_with(|| value.clone());
                }
                None => log::warn!(
                    "Ignoring the option `{}`, unknown to the {} adapter",
                    name,
                    self.adapter.name()
                ),
            }
        }
        for (attribute, value) in &self.attributes {
            if let Err(e) = self.adapter.set_attribute(&mut link, *attribute, value) {
                log::warn!(
                    "Could not apply the attribute {} while connecting: {:#}",
                    attribute,
                    e
                );
            }
        }
        log::debug!("Connected to {}", self.adapter.driver_name(&link));
        self.link = Some(link);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.transaction = false;
        let Some(link) = self.link.take() else {
            return;
        };
        for slot in self.statements.values_mut() {
            if let Some(mut prepared) = slot.prepared.take() {
                self.adapter.close(&mut prepared);
                slot.generation += 1;
            }
        }
        self.current = None;
        if let Err(e) = self.adapter.disconnect(link) {
            log::warn!("Error while disconnecting from {}: {:#}", self.adapter.name(), e);
        }
        log::debug!("Disconnected from {}", self.adapter.name());
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn ping(&mut self) -> bool {
        match self.link.as_mut() {
            Some(link) => self.adapter.ping(link),
            None => false,
        }
    }

    /// Connect if needed and run `f` on the live link.
    pub fn run<R>(&mut self, f: impl FnOnce(&A, &mut A::Link) -> R) -> Result<R> {
        self.connect()?;
        match self.link.as_mut() {
            Some(link) => Ok(f(&self.adapter, link)),
            None => Err(DbError::protocol("The connection has no link")),
        }
    }

    pub fn set_attribute(&mut self, attribute: &Attribute, value: Value) -> Result<()> {
        let id = attribute.resolve(&self.adapter)?;
        if let Some(link) = self.link.as_mut() {
            self.adapter
                .set_attribute(link, id, &value)
                .map_err(|e| {
                    crate::log_error!(Error::new(DbError::Configuration(format!(
                        "Could not set the attribute {}: {:#}",
                        attribute, e
                    ))))
                })?;
        }
        self.attributes.insert(id, value);
        Ok(())
    }

    pub fn get_attribute(&mut self, attribute: &Attribute) -> Result<Option<Value>> {
        let id = attribute.resolve(&self.adapter)?;
        if let Some(link) = self.link.as_mut() {
            match self.adapter.get_attribute(link, id) {
                Ok(Some(value)) if !value.is_null() => return Ok(Some(value)),
                Ok(..) => {}
                Err(e) => log::warn!("Could not read the attribute {}: {:#}", attribute, e),
            }
        }
        Ok(self.attributes.get(&id).cloned())
    }

    pub fn last_insert_id(&mut self, sequence: Option<&str>) -> Option<String> {
        let link = self.link.as_mut()?;
        self.adapter.last_insert_id(link, sequence)
    }

    pub fn driver_name(&self) -> String {
        match &self.link {
            Some(link) => self.adapter.driver_name(link),
            None => self.adapter.name().into(),
        }
    }

    pub fn quote(&mut self, value: &Value, hint: Option<ParamType>) -> Result<String> {
        self.run(|adapter, link| {
            quote_value(value, hint, |bytes, kind| adapter.quote(link, bytes, kind))
        })?
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction
    }

    pub fn begin(&mut self) -> Result<()> {
        self.connect()?;
        self.transaction = true;
        if let Err(e) = self.run(|adapter, link| adapter.begin(link))? {
            self.transaction = false;
            return Err(self.fail(e));
        }
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        let outcome = match self.link.as_mut() {
            Some(link) => self.adapter.commit(link),
            None => Ok(()),
        };
        self.transaction = false;
        outcome.map_err(|e| self.fail(e))
    }

    pub fn rollback(&mut self) -> Result<()> {
        let outcome = match self.link.as_mut() {
            Some(..) if !self.transaction => {
                return Err(DbError::protocol("Rollback without begin"));
            }
            Some(link) => self.adapter.rollback(link),
            None => Ok(()),
        };
        self.transaction = false;
        outcome.map_err(|e| self.fail(e))
    }

    /// Native code of the last failure, 0 when the last operation succeeded.
    pub fn error_code(&self) -> i64 {
        self.error.as_ref().map_or(0, |e| e.code)
    }

    pub fn error(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }

    pub fn last_error(&self) -> Option<&AdapterError> {
        self.error.as_ref()
    }

    pub fn flush_error(&mut self) {
        self.error = None;
    }

    fn record(&mut self, error: AdapterError) {
        log::error!("{} adapter error: {}", self.adapter.name(), error);
        self.error = Some(error);
    }

    fn fail(&mut self, error: AdapterError) -> Error {
        self.error = Some(error.clone());
        crate::log_error!(Error::new(DbError::Adapter(error)))
    }

    /// Record a misuse of the statement protocol as the connection error.
    pub(crate) fn protocol_failure(&mut self, message: &str) -> Error {
        self.error = Some(AdapterError::new(INTERNAL_ERROR_CODE, message));
        DbError::protocol(message)
    }

    pub(crate) fn register_statement(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        self.statements.insert(
            key,
            Slot {
                prepared: None,
                generation: 0,
            },
        );
        key
    }

    pub(crate) fn prepare_statement(&mut self, key: u64, sql: &str) -> Result<bool> {
        self.flush_error();
        match self.run(|adapter, link| adapter.prepare(link, sql))? {
            Ok(prepared) => {
                log::debug!("Prepared: {}", crate::truncate_long!(sql));
                self.claim(key);
                if let Some(slot) = self.statements.get_mut(&key) {
                    slot.prepared = Some(prepared);
                }
                Ok(true)
            }
            Err(e) => {
                self.record(e);
                Ok(false)
            }
        }
    }

    /// Run the prepared handle of `key`, returning the counters and the
    /// generation its rows belong to. `None` when the adapter failed.
    pub(crate) fn execute_statement(
        &mut self,
        key: u64,
        parameters: &Parameters,
    ) -> Result<Option<(Execution, u64)>> {
        self.flush_error();
        let prepared = self
            .statements
            .get(&key)
            .is_some_and(|slot| slot.prepared.is_some());
        if !prepared || self.link.is_none() {
            return Err(self.protocol_failure("The statement was released by a disconnect"));
        }
        self.claim(key);
        let Self {
            adapter,
            link,
            statements,
            ..
        } = &mut *self;
        let outcome = match (link.as_mut(), statements.get_mut(&key)) {
            (
                Some(link),
                Some(Slot {
                    prepared: Some(prepared),
                    generation,
                }),
            ) => {
                *generation += 1;
                adapter
                    .execute(link, prepared, parameters)
                    .map(|execution| (execution, *generation))
            }
            _ => return Err(DbError::protocol("The statement is not prepared")),
        };
        match outcome {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                self.record(e);
                Ok(None)
            }
        }
    }

    /// Rows from the cursor of `key`, `limit` of `None` reads everything.
    pub(crate) fn fetch(
        &mut self,
        key: u64,
        generation: u64,
        limit: Option<usize>,
    ) -> Result<Vec<Row>> {
        let Self {
            adapter,
            statements,
            ..
        } = &mut *self;
        let prepared = match statements.get_mut(&key) {
            Some(Slot {
                prepared: Some(prepared),
                generation: current,
            }) if *current == generation => prepared,
            _ => {
                return Err(DbError::state(
                    "The result was invalidated by a later execution on the same connection",
                ));
            }
        };
        let rows = match limit {
            Some(limit) => adapter.fetch_row(prepared, limit),
            None => adapter.fetch_all(prepared),
        };
        rows.map_err(|e| self.fail(e))
    }

    pub(crate) fn release(&mut self, key: u64) {
        if self.current == Some(key) {
            self.current = None;
        }
        if let Some(Slot {
            prepared: Some(mut prepared),
            ..
        }) = self.statements.remove(&key)
        {
            self.adapter.close(&mut prepared);
        }
    }

    /// Make `key` the holder of the link cursor, closing the previous one.
    fn claim(&mut self, key: u64) {
        let Some(previous) = self.current.replace(key) else {
            return;
        };
        if previous == key {
            return;
        }
        if let Some(slot) = self.statements.get_mut(&previous) {
            if let Some(prepared) = slot.prepared.as_mut() {
                self.adapter.close(prepared);
            }
            slot.generation += 1;
        }
    }
}

impl<A: Adapter> Drop for Connection<A> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
