use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

/// Dynamically typed value moved between Rust and the native client, used
/// both for bound parameters and for the columns of fetched rows.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    Varchar(String),
    Blob(Box<[u8]>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(v) => Some(v),
            _ => None,
        }
    }

    /// Integer view of the value: booleans become 0 / 1, floats are truncated,
    /// text is parsed when it holds a whole integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null | Value::Blob(..) => None,
            Value::Boolean(v) => Some(*v as i64),
            Value::Int(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Varchar(v) => v.trim().parse().ok(),
        }
    }

    /// Text form used when the value must travel as a string: NULL is empty,
    /// booleans are `1` / empty, blobs are decoded lossily.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Boolean(true) => Cow::Borrowed("1"),
            Value::Boolean(false) => Cow::Borrowed(""),
            Value::Int(v) => Cow::Owned(v.to_string()),
            Value::Float(v) => Cow::Owned(v.to_string()),
            Value::Varchar(v) => Cow::Borrowed(v),
            Value::Blob(v) => String::from_utf8_lossy(v),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => f.write_str(if *v { "TRUE" } else { "FALSE" }),
            v => f.write_str(&v.as_text()),
        }
    }
}

macro_rules! impl_from_value {
    ($variant:ident, $as:ty, $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value as $as)
                }
            }
        )+
    };
}

impl_from_value!(Int, i64, i8, i16, i32, i64, u8, u16, u32);
impl_from_value!(Float, f64, f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(value)
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(value: Cow<'_, str>) -> Self {
        Value::Varchar(value.into_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value.into())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Wire type of a bound or quoted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Null,
    Int,
    Str,
    Lob,
    /// Already a SQL fragment, used verbatim.
    Stmt,
    Bool,
}

impl ParamType {
    /// Effective type of `value`: an explicit `hint` always wins, otherwise the
    /// type is inferred from the runtime value.
    pub fn guess(value: &Value, hint: Option<ParamType>) -> ParamType {
        if let Some(hint) = hint {
            return hint;
        }
        match value {
            Value::Null => ParamType::Null,
            Value::Boolean(..) => ParamType::Bool,
            Value::Int(..) => ParamType::Int,
            Value::Blob(..) => ParamType::Lob,
            Value::Float(..) | Value::Varchar(..) => ParamType::Str,
        }
    }
}
