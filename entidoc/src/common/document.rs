use crate::common::Value;
use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use indexmap::IndexMap;
use std::fmt::{Debug, Display, Formatter};

/// An ordered mapping from field name to [Value], used as the wire
/// representation of an entity inside the document store.
///
/// Field order is insertion order and is preserved across round-trips; some
/// store engines correlate query results positionally, so the order must be
/// stable. Documents are created per request/response and discarded after
/// codec conversion.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Default, PartialEq)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            fields: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Associates the given value with the given field name. An existing
    /// value for the field is replaced in place, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the field name is empty.
    pub fn put<T: Into<Value>>(&mut self, field: &str, value: T) -> EntidocResult<()> {
        if field.is_empty() {
            log::error!("Document field name cannot be empty");
            return Err(EntidocError::new(
                "Document field name cannot be empty",
                ErrorKind::InvalidFieldName,
            ));
        }
        self.fields.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Returns the value associated with the field, or [Value::Null] when
    /// the field is absent.
    pub fn get(&self, field: &str) -> EntidocResult<Value> {
        if field.is_empty() {
            log::error!("Document field name cannot be empty");
            return Err(EntidocError::new(
                "Document field name cannot be empty",
                ErrorKind::InvalidFieldName,
            ));
        }
        Ok(self.fields.get(field).cloned().unwrap_or(Value::Null))
    }

    /// Removes the field from the document. Removing an absent field is a
    /// no-op. Uses a shifting removal so the order of remaining fields is
    /// unchanged.
    pub fn remove(&mut self, field: &str) -> EntidocResult<()> {
        if field.is_empty() {
            log::error!("Document field name cannot be empty");
            return Err(EntidocError::new(
                "Document field name cannot be empty",
                ErrorKind::InvalidFieldName,
            ));
        }
        self.fields.shift_remove(field);
        Ok(())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the field names in insertion order.
    pub fn fields(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::Document(self.clone())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, (field, value)) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{}\": {}", field, value)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Creates a [Document] from field/value pairs.
///
/// ```ignore
/// let doc = doc! {
///     "title": "The Stand",
///     "pages": 1153,
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::common::Document::new()
    };
    ( $( $field:literal : $value:expr ),* $(,)? ) => {{
        let mut document = $crate::common::Document::new();
        $(
            document
                .put($field, $value)
                .expect("document field name must not be empty");
        )*
        document
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("name", "Alice").unwrap();
        doc.put("age", 30).unwrap();
        assert_eq!(doc.get("name").unwrap(), Value::from("Alice"));
        assert_eq!(doc.get("age").unwrap(), Value::from(30));
    }

    #[test]
    fn test_get_missing_field_is_null() {
        let doc = Document::new();
        assert!(doc.get("missing").unwrap().is_null());
    }

    #[test]
    fn test_put_empty_field_name_fails() {
        let mut doc = Document::new();
        let result = doc.put("", "value");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidFieldName);
    }

    #[test]
    fn test_put_replaces_existing_value() {
        let mut doc = doc! { "status": "inactive" };
        doc.put("status", "active").unwrap();
        assert_eq!(doc.get("status").unwrap(), Value::from("active"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove_field() {
        let mut doc = doc! { "a": 1, "b": 2 };
        doc.remove("a").unwrap();
        assert!(!doc.contains("a"));
        assert!(doc.contains("b"));
    }

    #[test]
    fn test_remove_absent_field_is_noop() {
        let mut doc = Document::new();
        assert!(doc.remove("missing").is_ok());
    }

    #[test]
    fn test_field_order_is_insertion_order() {
        let doc = doc! { "z": 1, "a": 2, "m": 3 };
        assert_eq!(doc.fields(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_remove_preserves_order_of_remaining_fields() {
        let mut doc = doc! { "z": 1, "a": 2, "m": 3 };
        doc.remove("a").unwrap();
        assert_eq!(doc.fields(), vec!["z", "m"]);
    }

    #[test]
    fn test_nested_document() {
        let inner = doc! { "zip": "10001" };
        let doc = doc! { "address": inner.clone() };
        let value = doc.get("address").unwrap();
        assert_eq!(value.as_document(), Some(&inner));
    }

    #[test]
    fn test_display_renders_fields_in_order() {
        let doc = doc! { "a": 1, "b": "x" };
        assert_eq!(format!("{}", doc), "{\"a\": 1, \"b\": \"x\"}");
    }
}
