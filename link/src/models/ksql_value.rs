use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Decoded value of a single column.
///
/// Every numeric SQL type (`INT`, `BIGINT`, `DOUBLE`, `DECIMAL(p, s)`) is carried
/// as [`KsqlValue::Number`]; callers needing exact integer or decimal
/// semantics can reinterpret using the declared column type from the
/// [`Header`](super::Header).
///
/// # Example
///
/// ```rust
/// use ksql_link::KsqlValue;
/// use serde_json::json;
///
/// let value = KsqlValue::from(json!({"city": "Oslo", "zip": 150}));
/// assert_eq!(value.get("zip").and_then(KsqlValue::as_f64), Some(150.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum KsqlValue {
    #[default]
    Null,
    Bool(bool),
    String(String),
    Number(f64),
    List(Vec<KsqlValue>),
    Map(BTreeMap<String, KsqlValue>),
}

impl KsqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[KsqlValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, KsqlValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&KsqlValue> {
        self.as_map()?.get(key)
    }

    /// Name of the variant, as used when tracing values that did not match
    /// their declared type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

/// Structural conversion that ignores any declared type.
///
/// Numbers that do not fit in an `f64` (which serde_json only produces with
/// arbitrary precision enabled) degrade to [`KsqlValue::Null`].
impl From<JsonValue> for KsqlValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            JsonValue::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            },
        }
    }
}

impl From<bool> for KsqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for KsqlValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for KsqlValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for KsqlValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl Serialize for KsqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::List(items) => items.serialize(serializer),
            Self::Map(entries) => entries.serialize(serializer),
        }
    }
}
