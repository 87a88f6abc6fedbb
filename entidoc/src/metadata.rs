//! Entity metadata consumed by the repository layer.
//!
//! The metadata describing a persistent type is produced by an external
//! collaborator (an annotation processor or a hand-written registry) and is
//! read-only to this crate: the operations engine only ever inspects it to
//! resolve container identity, partition keys, generated identities and
//! optimistic-lock versions.

use std::sync::Arc;

/// Declared type of an identity property, used when a generated identity
/// value must be synthesized on insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdKind {
    /// String identity; generated values are random UUID strings.
    String,
    /// UUID identity persisted in string form.
    Uuid,
    /// Any other type; generation is not supported and is skipped.
    Other,
}

/// Marker placed on a property to declare it the container partition key.
/// An explicit path overrides the property's persisted name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionKeyMarker {
    path: Option<String>,
}

impl PartitionKeyMarker {
    pub fn new() -> Self {
        PartitionKeyMarker { path: None }
    }

    pub fn with_path(path: &str) -> Self {
        PartitionKeyMarker {
            path: Some(path.to_string()),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// A single mapped property of a persistent entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistentProperty {
    name: String,
    persisted_name: String,
    generated: bool,
    id_kind: IdKind,
    partition_key: Option<PartitionKeyMarker>,
    converter: Option<String>,
}

impl PersistentProperty {
    pub fn new(name: &str) -> Self {
        PersistentProperty {
            name: name.to_string(),
            persisted_name: name.to_string(),
            generated: false,
            id_kind: IdKind::Other,
            partition_key: None,
            converter: None,
        }
    }

    pub fn persisted_as(mut self, persisted_name: &str) -> Self {
        self.persisted_name = persisted_name.to_string();
        self
    }

    pub fn generated(mut self, id_kind: IdKind) -> Self {
        self.generated = true;
        self.id_kind = id_kind;
        self
    }

    pub fn partition_key(mut self, marker: PartitionKeyMarker) -> Self {
        self.partition_key = Some(marker);
        self
    }

    /// Registers a value converter for this property by registry key.
    pub fn converted_by(mut self, converter: &str) -> Self {
        self.converter = Some(converter.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persisted_name(&self) -> &str {
        &self.persisted_name
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn id_kind(&self) -> &IdKind {
        &self.id_kind
    }

    pub fn partition_key_marker(&self) -> Option<&PartitionKeyMarker> {
        self.partition_key.as_ref()
    }

    pub fn converter(&self) -> Option<&str> {
        self.converter.as_deref()
    }
}

/// Container-level annotation values declared on an entity type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerAnnotation {
    name: String,
    partition_key_path: String,
    throughput_request_units: i32,
    throughput_auto_scale: bool,
    auto_create: bool,
}

impl ContainerAnnotation {
    pub fn new() -> Self {
        ContainerAnnotation::default()
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn partition_key_path(mut self, path: &str) -> Self {
        self.partition_key_path = path.to_string();
        self
    }

    pub fn throughput(mut self, request_units: i32, auto_scale: bool) -> Self {
        self.throughput_request_units = request_units;
        self.throughput_auto_scale = auto_scale;
        self
    }

    pub fn auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create = auto_create;
        self
    }

    pub fn name_value(&self) -> &str {
        &self.name
    }

    pub fn partition_key_path_value(&self) -> &str {
        &self.partition_key_path
    }

    pub fn throughput_request_units_value(&self) -> i32 {
        self.throughput_request_units
    }

    pub fn is_throughput_auto_scale(&self) -> bool {
        self.throughput_auto_scale
    }

    pub fn is_auto_create(&self) -> bool {
        self.auto_create
    }
}

/// Runtime metadata for a persistent type: identity, version, mapped
/// properties and container annotation. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    persisted_name: String,
    identity: Option<PersistentProperty>,
    version: Option<PersistentProperty>,
    properties: Vec<PersistentProperty>,
    container: Option<ContainerAnnotation>,
}

impl EntityDescriptor {
    pub fn new(persisted_name: &str) -> Self {
        EntityDescriptor {
            persisted_name: persisted_name.to_string(),
            identity: None,
            version: None,
            properties: Vec::new(),
            container: None,
        }
    }

    pub fn identity(mut self, property: PersistentProperty) -> Self {
        self.identity = Some(property);
        self
    }

    pub fn version(mut self, property: PersistentProperty) -> Self {
        self.version = Some(property);
        self
    }

    pub fn property(mut self, property: PersistentProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn container(mut self, annotation: ContainerAnnotation) -> Self {
        self.container = Some(annotation);
        self
    }

    pub fn build(self) -> Arc<EntityDescriptor> {
        Arc::new(self)
    }

    pub fn persisted_name(&self) -> &str {
        &self.persisted_name
    }

    pub fn identity_property(&self) -> Option<&PersistentProperty> {
        self.identity.as_ref()
    }

    pub fn version_property(&self) -> Option<&PersistentProperty> {
        self.version.as_ref()
    }

    pub fn persistent_properties(&self) -> &[PersistentProperty] {
        &self.properties
    }

    pub fn container_annotation(&self) -> Option<&ContainerAnnotation> {
        self.container.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_defaults() {
        let property = PersistentProperty::new("title");
        assert_eq!(property.name(), "title");
        assert_eq!(property.persisted_name(), "title");
        assert!(!property.is_generated());
        assert!(property.partition_key_marker().is_none());
        assert!(property.converter().is_none());
    }

    #[test]
    fn test_property_persisted_name_override() {
        let property = PersistentProperty::new("created_at").persisted_as("createdAt");
        assert_eq!(property.name(), "created_at");
        assert_eq!(property.persisted_name(), "createdAt");
    }

    #[test]
    fn test_generated_identity() {
        let identity = PersistentProperty::new("id").generated(IdKind::String);
        assert!(identity.is_generated());
        assert_eq!(identity.id_kind(), &IdKind::String);
    }

    #[test]
    fn test_partition_key_marker_path_override() {
        let marker = PartitionKeyMarker::with_path("category");
        assert_eq!(marker.path(), Some("category"));
        assert_eq!(PartitionKeyMarker::new().path(), None);
    }

    #[test]
    fn test_descriptor_builder() {
        let descriptor = EntityDescriptor::new("book")
            .identity(PersistentProperty::new("id").generated(IdKind::String))
            .version(PersistentProperty::new("version"))
            .property(PersistentProperty::new("title"))
            .container(ContainerAnnotation::new().named("books").auto_create(true))
            .build();
        assert_eq!(descriptor.persisted_name(), "book");
        assert!(descriptor.identity_property().is_some());
        assert!(descriptor.version_property().is_some());
        assert_eq!(descriptor.persistent_properties().len(), 1);
        assert!(descriptor.container_annotation().unwrap().is_auto_create());
    }
}
