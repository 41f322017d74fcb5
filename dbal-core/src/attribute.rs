use crate::{Adapter, DbError, Result};
use std::fmt::{self, Display, Formatter};

/// Native attribute identifier as understood by an adapter.
pub type AttributeId = i32;

/// Key of a driver attribute: either the adapter constant itself or its
/// symbolic name, resolved through the adapter's static table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Id(AttributeId),
    Name(String),
}

impl Attribute {
    pub fn resolve<A: Adapter>(&self, adapter: &A) -> Result<AttributeId> {
        match self {
            Attribute::Id(id) => Ok(*id),
            Attribute::Name(name) => adapter.resolve_attribute(name).ok_or_else(|| {
                DbError::configuration(format!(
                    "Unknown attribute `{}` for the {} adapter",
                    name,
                    adapter.name()
                ))
            }),
        }
    }
}

impl From<AttributeId> for Attribute {
    fn from(value: AttributeId) -> Self {
        Attribute::Id(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Name(value.into())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::Name(value)
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Id(id) => write!(f, "{}", id),
            Attribute::Name(name) => f.write_str(name),
        }
    }
}
