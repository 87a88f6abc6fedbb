use crate::common::Document;
use std::fmt::{Debug, Display, Formatter};

/// Represents a field value inside a [Document] tree. It can be a simple
/// scalar like [Value::I64] or [Value::String], or a complex value like
/// [Value::Document] or [Value::Array].
///
/// This is the wire representation exchanged with the document store. Field
/// values survive serialization round-trips unchanged; the store itself never
/// interprets them beyond routing and equality.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Default, PartialEq, Debug)]
pub enum Value {
    /// Represents a null or absent value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 32-bit integer value.
    I32(i32),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a string value.
    String(String),
    /// Represents an ordered array of values.
    Array(Vec<Value>),
    /// Represents a nested document value.
    Document(Document),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&i32> {
        match self {
            Value::I32(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&i64> {
        match self {
            Value::I64(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&f64> {
        match self {
            Value::F64(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    /// Renders a scalar value as text. Used for partition key routing and
    /// point-lookup id rendering, where the store expects string form.
    /// Returns `None` for null and structured values.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::I32(i) => Some(i.to_string()),
            Value::I64(i) => Some(i.to_string()),
            Value::F64(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::I32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

impl From<Document> for Value {
    fn from(d: Document) -> Self {
        Value::Document(d)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(a) => {
                write!(f, "[")?;
                for (idx, value) in a.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Document(d) => write!(f, "{}", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_defaults_to_null() {
        let value = Value::default();
        assert!(value.is_null());
    }

    #[test]
    fn test_value_accessors_match_variant() {
        assert_eq!(Value::from(true).as_bool(), Some(&true));
        assert_eq!(Value::from(42).as_i32(), Some(&42));
        assert_eq!(Value::from(42i64).as_i64(), Some(&42i64));
        assert_eq!(Value::from(1.5).as_f64(), Some(&1.5));
        assert_eq!(Value::from("hello").as_string(), Some("hello"));
    }

    #[test]
    fn test_value_accessors_reject_other_variants() {
        assert!(Value::from("hello").as_i32().is_none());
        assert!(Value::from(42).as_string().is_none());
        assert!(Value::Null.as_bool().is_none());
    }

    #[test]
    fn test_as_text_renders_scalars() {
        assert_eq!(Value::from("The Stand").as_text(), Some("The Stand".to_string()));
        assert_eq!(Value::from(42).as_text(), Some("42".to_string()));
        assert_eq!(Value::from(42i64).as_text(), Some("42".to_string()));
        assert_eq!(Value::from(true).as_text(), Some("true".to_string()));
    }

    #[test]
    fn test_as_text_rejects_structured_values() {
        assert!(Value::Null.as_text().is_none());
        assert!(Value::Array(vec![]).as_text().is_none());
        assert!(Value::Document(Document::new()).as_text().is_none());
    }

    #[test]
    fn test_display_renders_array() {
        let value = Value::Array(vec![Value::from(1), Value::from("a")]);
        assert_eq!(format!("{}", value), "[1, \"a\"]");
    }
}
