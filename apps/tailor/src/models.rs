use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Opaque identifier minted by the service for a stored resume or job description.
///
/// The service may hand out numbers or strings. The original JSON kind is preserved so the
/// id can be echoed back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(Number),
    Text(String),
}

impl EntityId {
    /// Converts a raw JSON value into an id. Falsy values (`0`, `""`) and non-scalar
    /// values are not identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(EntityId::Number(n.clone())),
            Value::String(s) if !s.trim().is_empty() => Some(EntityId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n.into())
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}
