use dbal_core::{
    Adapter, AdapterError, AttributeId, ConnectParameters, Error, Execution, ParamKey, ParamType,
    Parameters, Result, Row, RowNames, Value,
};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub const STUB_TIMEOUT: AttributeId = 1;
pub const STUB_MODE: AttributeId = 2;
/// Known to the table but refused by the link, to exercise the replay path.
pub const STUB_READONLY: AttributeId = 3;

/// Observable state of a [`StubAdapter`], shared by all its clones.
#[derive(Debug)]
pub struct StubState {
    pub connects: usize,
    pub disconnects: usize,
    pub closes: usize,
    pub alive: bool,
    pub connect_failure: Option<String>,
    pub prepare_failure: Option<AdapterError>,
    pub execute_failure: Option<AdapterError>,
    pub fetch_failure: Option<AdapterError>,
    pub affected_rows: u64,
    /// Result sets handed out, in order, to the next executions of a `SELECT`.
    pub results: VecDeque<(RowNames, Vec<Vec<Value>>)>,
    /// Operations in the order the core invoked them.
    pub log: Vec<String>,
    last_id: u64,
}

impl Default for StubState {
    fn default() -> Self {
        Self {
            connects: 0,
            disconnects: 0,
            closes: 0,
            alive: true,
            connect_failure: None,
            prepare_failure: None,
            execute_failure: None,
            fetch_failure: None,
            affected_rows: 1,
            results: Default::default(),
            log: Default::default(),
            last_id: 0,
        }
    }
}

/// Scriptable in process adapter, no SQL is interpreted.
///
/// Statements starting with `SELECT` return the next queued result set (an
/// empty one with a single `col` column when none is queued), every other
/// statement affects [`StubState::affected_rows`] rows.
#[derive(Clone, Default)]
pub struct StubAdapter {
    state: Arc<Mutex<StubState>>,
}

pub struct StubLink {
    driver: String,
    attributes: BTreeMap<AttributeId, Value>,
}

pub struct StubPrepared {
    sql: String,
    cursor: Option<(RowNames, VecDeque<Vec<Value>>)>,
}

impl StubAdapter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a result set with the given column labels.
    pub fn push_result(&self, labels: &[&str], rows: Vec<Vec<Value>>) -> &Self {
        let labels: RowNames = labels.iter().map(|v| v.to_string()).collect();
        self.state().results.push_back((labels, rows));
        self
    }

    pub fn set_alive(&self, alive: bool) -> &Self {
        self.state().alive = alive;
        self
    }

    pub fn connects(&self) -> usize {
        self.state().connects
    }

    pub fn disconnects(&self) -> usize {
        self.state().disconnects
    }

    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }
}

impl Adapter for StubAdapter {
    type Link = StubLink;
    type Prepared = StubPrepared;

    fn name(&self) -> &'static str {
        "stub"
    }

    fn driver_name(&self, link: &StubLink) -> String {
        link.driver.clone()
    }

    fn resolve_attribute(&self, name: &str) -> Option<AttributeId> {
        match name {
            "STUB_TIMEOUT" => Some(STUB_TIMEOUT),
            "STUB_MODE" => Some(STUB_MODE),
            "STUB_READONLY" => Some(STUB_READONLY),
            _ => None,
        }
    }

    fn connect(&self, parameters: &ConnectParameters) -> Result<StubLink> {
        let mut state = self.state();
        if let Some(message) = &state.connect_failure {
            return Err(Error::msg(message.clone()));
        }
        state.connects += 1;
        state.log.push("connect".into());
        Ok(StubLink {
            driver: parameters.get("driver").unwrap_or("stub").into(),
            attributes: Default::default(),
        })
    }

    fn disconnect(&self, _link: StubLink) -> Result<()> {
        let mut state = self.state();
        state.disconnects += 1;
        state.log.push("disconnect".into());
        Ok(())
    }

    fn ping(&self, _link: &mut StubLink) -> bool {
        self.state().alive
    }

    fn set_attribute(&self, link: &mut StubLink, attribute: AttributeId, value: &Value) -> Result<()> {
        if attribute == STUB_READONLY {
            return Err(Error::msg("STUB_READONLY cannot be changed on a live link"));
        }
        self.state().log.push(format!("set {} = {}", attribute, value));
        link.attributes.insert(attribute, value.clone());
        Ok(())
    }

    fn get_attribute(&self, link: &mut StubLink, attribute: AttributeId) -> Result<Option<Value>> {
        Ok(link.attributes.get(&attribute).cloned())
    }

    fn last_insert_id(&self, _link: &mut StubLink, _sequence: Option<&str>) -> Option<String> {
        Some(self.state().last_id.to_string())
    }

    fn quote(&self, _link: &mut StubLink, value: &[u8], _kind: ParamType) -> Result<String> {
        let value = String::from_utf8_lossy(value);
        self.state().log.push(format!("quote {}", value));
        Ok(format!(
            "'{}'",
            value.replace('\\', "\\\\").replace('\'', "\\'")
        ))
    }

    fn prepare(&self, _link: &mut StubLink, sql: &str) -> Result<StubPrepared, AdapterError> {
        let mut state = self.state();
        if let Some(error) = state.prepare_failure.clone() {
            return Err(error);
        }
        if sql.trim().is_empty() {
            return Err(AdapterError::new(1065, "Query was empty"));
        }
        state.log.push(format!("prepare {}", sql));
        Ok(StubPrepared {
            sql: sql.into(),
            cursor: None,
        })
    }

    fn execute(
        &self,
        _link: &mut StubLink,
        prepared: &mut StubPrepared,
        parameters: &Parameters,
    ) -> Result<Execution, AdapterError> {
        let mut state = self.state();
        if let Some(error) = state.execute_failure.clone() {
            return Err(error);
        }
        let bound = parameters
            .iter()
            .map(|(key, param)| match key {
                ParamKey::Index(i) => format!("{}={}", i, param.value),
                ParamKey::Name(name) => format!(":{}={}", name, param.value),
            })
            .collect::<Vec<_>>()
            .join(",");
        state.log.push(format!("execute {} [{}]", prepared.sql, bound));
        if prepared.sql.trim_start().to_ascii_uppercase().starts_with("SELECT") {
            let (labels, rows) = state
                .results
                .pop_front()
                .unwrap_or_else(|| (RowNames::from(vec!["col".to_string()]), Vec::new()));
            let execution = Execution {
                field_count: labels.len(),
                row_count: rows.len() as u64,
                affected_rows: 0,
            };
            prepared.cursor = Some((labels, rows.into()));
            Ok(execution)
        } else {
            prepared.cursor = None;
            state.last_id += 1;
            Ok(Execution {
                field_count: 0,
                row_count: 0,
                affected_rows: state.affected_rows,
            })
        }
    }

    fn fetch_row(&self, prepared: &mut StubPrepared, limit: usize) -> Result<Vec<Row>, AdapterError> {
        if let Some(error) = self.state().fetch_failure.clone() {
            return Err(error);
        }
        let Some((labels, rows)) = prepared.cursor.as_mut() else {
            return Ok(Vec::new());
        };
        let count = limit.min(rows.len());
        Ok(rows
            .drain(..count)
            .map(|values| Row::new(labels.clone(), values.into()))
            .collect())
    }

    fn close(&self, prepared: &mut StubPrepared) {
        let mut state = self.state();
        state.closes += 1;
        state.log.push(format!("close {}", prepared.sql));
        prepared.cursor = None;
    }

    fn begin(&self, _link: &mut StubLink) -> Result<(), AdapterError> {
        self.state().log.push("begin".into());
        Ok(())
    }

    fn commit(&self, _link: &mut StubLink) -> Result<(), AdapterError> {
        self.state().log.push("commit".into());
        Ok(())
    }

    fn rollback(&self, _link: &mut StubLink) -> Result<(), AdapterError> {
        self.state().log.push("rollback".into());
        Ok(())
    }
}
