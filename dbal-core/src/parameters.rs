use crate::{ParamType, Value};

/// Placeholder a parameter binds to: positional `?` / `$n` (from 0) or named `:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Index(usize),
    Name(String),
}

impl ParamKey {
    /// Named key without the leading `:`.
    pub fn named(name: &str) -> Self {
        ParamKey::Name(name.trim_start_matches(':').to_owned())
    }
}

/// A value to bind, with an optional explicit type taking precedence over inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub value: Value,
    pub hint: Option<ParamType>,
}

impl Param {
    pub fn kind(&self) -> ParamType {
        ParamType::guess(&self.value, self.hint)
    }
}

/// Parameters of one execution. Positional and named entries may be mixed,
/// adapters dispatch on the key.
///
/// ```rust
/// use dbal_core::{Value, params};
/// let parameters = params![2, "red"];
/// assert_eq!(parameters.positional(1).map(|v| &v.value), Some(&Value::from("red")));
/// let parameters = params! { "area" => "China", ":year" => 2010 };
/// assert_eq!(parameters.named("year").map(|v| &v.value), Some(&Value::Int(2010)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(ParamKey, Param)>,
    positional: usize,
}

impl Parameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append the next positional value.
    pub fn bind(self, value: impl Into<Value>) -> Self {
        self.push_positional(value.into(), None)
    }

    /// Append the next positional value with an explicit type.
    pub fn bind_typed(self, value: impl Into<Value>, kind: ParamType) -> Self {
        self.push_positional(value.into(), Some(kind))
    }

    /// Set a named value, `name` may carry the leading `:`.
    pub fn bind_named(self, name: &str, value: impl Into<Value>) -> Self {
        self.push_named(name, value.into(), None)
    }

    pub fn bind_named_typed(self, name: &str, value: impl Into<Value>, kind: ParamType) -> Self {
        self.push_named(name, value.into(), Some(kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &Param)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn positional(&self, index: usize) -> Option<&Param> {
        self.get(&ParamKey::Index(index))
    }

    pub fn named(&self, name: &str) -> Option<&Param> {
        self.get(&ParamKey::named(name))
    }

    pub fn get(&self, key: &ParamKey) -> Option<&Param> {
        self.entries.iter().find(|(k, ..)| k == key).map(|(.., v)| v)
    }

    fn push_positional(mut self, value: Value, hint: Option<ParamType>) -> Self {
        self.entries
            .push((ParamKey::Index(self.positional), Param { value, hint }));
        self.positional += 1;
        self
    }

    fn push_named(mut self, name: &str, value: Value, hint: Option<ParamType>) -> Self {
        let key = ParamKey::named(name);
        let param = Param { value, hint };
        match self.entries.iter_mut().find(|(k, ..)| *k == key) {
            Some(entry) => entry.1 = param,
            None => self.entries.push((key, param)),
        }
        self
    }
}

impl From<()> for Parameters {
    fn from(_: ()) -> Self {
        Parameters::new()
    }
}

impl<V: Into<Value>, const N: usize> From<[V; N]> for Parameters {
    fn from(values: [V; N]) -> Self {
        values.into_iter().fold(Parameters::new(), |p, v| p.bind(v))
    }
}

impl From<Vec<Value>> for Parameters {
    fn from(values: Vec<Value>) -> Self {
        values.into_iter().fold(Parameters::new(), |p, v| p.bind(v))
    }
}

impl<'a, V: Into<Value>> From<Vec<(&'a str, V)>> for Parameters {
    fn from(values: Vec<(&'a str, V)>) -> Self {
        values
            .into_iter()
            .fold(Parameters::new(), |p, (name, value)| p.bind_named(name, value))
    }
}

/// Builds [`Parameters`]: `params![1, "a"]` for positional placeholders,
/// `params! { "name" => value }` for named ones.
#[macro_export]
macro_rules! params {
    () => {
        $crate::Parameters::new()
    };
    ($($name:literal => $value:expr),+ $(,)?) => {
        $crate::Parameters::new()$(.bind_named($name, $value))+
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Parameters::new()$(.bind($value))+
    };
}
