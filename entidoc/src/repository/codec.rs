use crate::common::{Convertible, Document, Value, ETAG_FIELD};
use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use crate::metadata::EntityDescriptor;

/// Converts typed entities to and from the wire document tree, remapping
/// the declared version field to the store's reserved concurrency-token
/// field on the way out and back on the way in.
///
/// Codec operations never mutate the caller's entity; they work on the tree
/// produced by the [Convertible] seam, or on a private copy of an incoming
/// tree.
pub struct DocumentCodec;

impl DocumentCodec {
    /// Serializes an entity to a document tree. If the entity declares a
    /// version property whose persisted name differs from the reserved
    /// concurrency-token field, the version value is moved into the
    /// reserved field and the original field is removed.
    pub fn encode<T>(entity: &T, root: &EntityDescriptor) -> EntidocResult<Document>
    where
        T: Convertible,
    {
        let value = entity.to_value()?;
        let mut document = match value {
            Value::Document(document) => document,
            other => {
                log::error!("Expected Document from entity conversion, got {:?}", other);
                return Err(EntidocError::new(
                    &format!(
                        "Failed to serialize entity '{}': expected a document tree but the conversion produced {}",
                        root.persisted_name(),
                        other
                    ),
                    ErrorKind::ObjectMappingError,
                ));
            }
        };
        Self::map_version_to_etag(root, &mut document)?;
        Ok(document)
    }

    /// Deserializes a document tree into the target type. If a concurrency
    /// token is present in the tree, it is copied into the declared version
    /// field's persisted name first (on a private copy), and the reserved
    /// field is removed when the names differ.
    pub fn decode<R>(tree: &Value, root: &EntityDescriptor) -> EntidocResult<R>
    where
        R: Convertible<Output = R>,
    {
        let document = match tree {
            Value::Document(document) => document,
            other => {
                log::error!("Expected Document result tree, got {:?}", other);
                return Err(EntidocError::new(
                    &format!(
                        "Failed to deserialize result for '{}': expected a document tree but the store returned {}",
                        root.persisted_name(),
                        other
                    ),
                    ErrorKind::ObjectMappingError,
                ));
            }
        };
        let mut copy = document.clone();
        Self::map_etag_to_version(root, &mut copy)?;
        R::from_value(&Value::Document(copy)).map_err(|e| {
            EntidocError::new_with_cause(
                &format!("Failed to deserialize '{}'", root.persisted_name()),
                ErrorKind::ObjectMappingError,
                e,
            )
        })
    }

    fn map_version_to_etag(root: &EntityDescriptor, document: &mut Document) -> EntidocResult<()> {
        if let Some(version) = root.version_property() {
            if version.persisted_name() != ETAG_FIELD {
                let value = document.get(version.persisted_name())?;
                document.remove(version.persisted_name())?;
                if !value.is_null() {
                    document.put(ETAG_FIELD, value)?;
                }
            }
        }
        Ok(())
    }

    fn map_etag_to_version(root: &EntityDescriptor, document: &mut Document) -> EntidocResult<()> {
        let etag = document.get(ETAG_FIELD)?;
        if etag.is_null() {
            return Ok(());
        }
        if let Some(version) = root.version_property() {
            document.put(version.persisted_name(), etag)?;
            if version.persisted_name() != ETAG_FIELD {
                document.remove(ETAG_FIELD)?;
            }
        }
        Ok(())
    }
}
