//! Typed values - what an instance stores under a key.

use serde::{Deserialize, Serialize};

/// Errors raised while interpreting values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Kind name outside {string, number, boolean, object}
    #[error("Unknown value kind: {0}")]
    UnknownKind(String),

    /// Value of a kind that cannot be stored
    #[error("Unsupported value type: {0}")]
    UnsupportedType(&'static str),
}

/// Value kind tag used by the type-specific accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// UTF-8 string
    String,
    /// Double-precision number
    Number,
    /// Boolean flag
    Boolean,
    /// JSON-serializable structure
    Object,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 4] = [Kind::String, Kind::Number, Kind::Boolean, Kind::Object];

    /// Lowercase name, as written in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Object => "object",
        }
    }
}

impl Default for Kind {
    fn default() -> Self {
        Kind::String
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(Kind::String),
            "number" => Ok(Kind::Number),
            "boolean" | "bool" => Ok(Kind::Boolean),
            "object" => Ok(Kind::Object),
            _ => Err(CoreError::UnknownKind(s.to_string())),
        }
    }
}

/// A decoded value returned by generic reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String value
    String(String),
    /// Number value
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// Structured value (objects and arrays)
    Object(serde_json::Value),
}

impl Value {
    /// Kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Number(_) => Kind::Number,
            Value::Boolean(_) => Kind::Boolean,
            Value::Object(_) => Kind::Object,
        }
    }

    /// Classify an arbitrary JSON value by its runtime kind.
    ///
    /// Arrays count as objects. `null` has no storable kind, and neither
    /// does a number that does not fit an `f64`.
    pub fn from_json(json: serde_json::Value) -> Result<Self, CoreError> {
        match json {
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or(CoreError::UnsupportedType("number")),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::Null => Err(CoreError::UnsupportedType("null")),
            obj @ (serde_json::Value::Object(_) | serde_json::Value::Array(_)) => {
                Ok(Value::Object(obj))
            }
        }
    }

    /// Convert back into a JSON value. Non-finite numbers become `null`.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s),
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Object(v) => v,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Object(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// A typed payload as handed to a backend for writing.
///
/// Objects are already encoded: the backend only ever sees their JSON text.
/// Serializes as the tagged pair `{"type": "<kind>", "value": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Entry {
    /// String payload
    String(String),
    /// Number payload
    Number(f64),
    /// Boolean payload
    Boolean(bool),
    /// Canonical JSON text of an object
    Object(String),
}

impl Entry {
    /// Kind of this entry.
    pub fn kind(&self) -> Kind {
        match self {
            Entry::String(_) => Kind::String,
            Entry::Number(_) => Kind::Number,
            Entry::Boolean(_) => Kind::Boolean,
            Entry::Object(_) => Kind::Object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse() {
        assert_eq!("number".parse::<Kind>().unwrap(), Kind::Number);
        assert_eq!("Boolean".parse::<Kind>().unwrap(), Kind::Boolean);
        assert_eq!(
            "symbol".parse::<Kind>(),
            Err(CoreError::UnknownKind("symbol".to_string()))
        );
        assert_eq!(Kind::default(), Kind::String);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Kind::Object).unwrap(), "\"object\"");
    }

    #[test]
    fn test_from_json_dispatch() {
        assert_eq!(Value::from_json(json!("a")).unwrap().kind(), Kind::String);
        assert_eq!(Value::from_json(json!(42)).unwrap(), Value::Number(42.0));
        assert_eq!(Value::from_json(json!(true)).unwrap(), Value::Boolean(true));
        assert_eq!(Value::from_json(json!({"a": 1})).unwrap().kind(), Kind::Object);
        // Arrays are objects
        assert_eq!(Value::from_json(json!([1, 2])).unwrap().kind(), Kind::Object);
        assert_eq!(
            Value::from_json(json!(null)),
            Err(CoreError::UnsupportedType("null"))
        );
    }

    #[test]
    fn test_entry_tagged_pair() {
        let entry = Entry::Object("{\"id\":1}".to_string());
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"type": "object", "value": "{\"id\":1}"})
        );
        let back: Entry = serde_json::from_value(json!({"type": "number", "value": 25})).unwrap();
        assert_eq!(back, Entry::Number(25.0));
        assert!(serde_json::from_value::<Entry>(json!({"type": "number", "value": "x"})).is_err());
    }

    #[test]
    fn test_into_json() {
        assert_eq!(Value::Number(2.5).into_json(), json!(2.5));
        assert_eq!(Value::Object(json!({"id": 1})).into_json(), json!({"id": 1}));
        assert_eq!(Value::Number(f64::NAN).into_json(), json!(null));
    }
}
