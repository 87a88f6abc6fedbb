use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use crate::metadata::{EntityDescriptor, PersistentProperty};
use dashmap::DashMap;
use std::sync::Arc;

/// Throughput provisioning mode for a database or container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThroughputMode {
    Manual,
    Autoscale,
}

/// A throughput provisioning request. Absence of a spec means
/// "unthrottled/default".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThroughputSpec {
    mode: ThroughputMode,
    request_units: i32,
}

impl ThroughputSpec {
    pub fn manual(request_units: i32) -> Self {
        ThroughputSpec {
            mode: ThroughputMode::Manual,
            request_units,
        }
    }

    pub fn autoscale(request_units: i32) -> Self {
        ThroughputSpec {
            mode: ThroughputMode::Autoscale,
            request_units,
        }
    }

    pub fn mode(&self) -> &ThroughputMode {
        &self.mode
    }

    pub fn request_units(&self) -> i32 {
        self.request_units
    }
}

/// Container identity derived from entity metadata: name, partition key
/// path, throughput policy and the auto-create flag. Immutable after first
/// computation for a given entity type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerProperties {
    container_name: String,
    partition_key_path: String,
    throughput: Option<ThroughputSpec>,
    auto_create: bool,
}

impl ContainerProperties {
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// The partition key path for the container; may be empty, meaning
    /// "no partition key".
    pub fn partition_key_path(&self) -> &str {
        &self.partition_key_path
    }

    pub fn throughput(&self) -> Option<&ThroughputSpec> {
        self.throughput.as_ref()
    }

    pub fn is_auto_create(&self) -> bool {
        self.auto_create
    }
}

/// Derives [ContainerProperties] from entity metadata, memoized per entity
/// type. The computation is side-effect free, so concurrent first calls may
/// race to compute but exactly one result is kept; later calls hit the
/// cache.
#[derive(Clone, Default)]
pub struct ContainerPropertiesResolver {
    inner: Arc<ResolverInner>,
}

#[derive(Default)]
struct ResolverInner {
    cache: DashMap<String, Option<ContainerProperties>>,
}

impl ContainerPropertiesResolver {
    pub fn new() -> Self {
        ContainerPropertiesResolver::default()
    }

    /// Resolves container properties for the given entity. Returns `None`
    /// when the entity carries no container annotation; the caller falls
    /// back to defaults (container name = persisted name, no partition key).
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] if more than one property
    /// carries a partition key marker. Errors are not cached.
    pub fn resolve(
        &self,
        entity: &EntityDescriptor,
    ) -> EntidocResult<Option<ContainerProperties>> {
        let key = entity.persisted_name();
        if let Some(cached) = self.inner.cache.get(key) {
            return Ok(cached.clone());
        }
        let computed = Self::compute(entity)?;
        let entry = self
            .inner
            .cache
            .entry(key.to_string())
            .or_insert(computed);
        Ok(entry.clone())
    }

    fn compute(entity: &EntityDescriptor) -> EntidocResult<Option<ContainerProperties>> {
        let annotation = match entity.container_annotation() {
            Some(annotation) => annotation,
            None => return Ok(None),
        };

        let mut container_name = annotation.name_value().to_string();
        if container_name.is_empty() {
            container_name = entity.persisted_name().to_string();
        }

        let mut partition_key_path = Self::find_partition_key(entity)?;
        if partition_key_path.is_empty() {
            // not declared on any property; fall back to the container level
            // (which may itself be blank)
            partition_key_path = annotation.partition_key_path_value().to_string();
        }

        let request_units = annotation.throughput_request_units_value();
        let throughput = if request_units > 0 {
            if annotation.is_throughput_auto_scale() {
                Some(ThroughputSpec::autoscale(request_units))
            } else {
                Some(ThroughputSpec::manual(request_units))
            }
        } else {
            None
        };

        Ok(Some(ContainerProperties {
            container_name,
            partition_key_path,
            throughput,
            auto_create: annotation.is_auto_create(),
        }))
    }

    fn find_partition_key(entity: &EntityDescriptor) -> EntidocResult<String> {
        let mut partition_key_path = String::new();
        let identity = entity.identity_property();
        let properties: Vec<&PersistentProperty> = identity
            .into_iter()
            .chain(entity.persistent_properties().iter())
            .collect();
        for property in properties {
            if let Some(marker) = property.partition_key_marker() {
                if !partition_key_path.is_empty() {
                    log::error!(
                        "Multiple partition key markers declared on {}",
                        entity.persisted_name()
                    );
                    return Err(EntidocError::new(
                        &format!(
                            "Multiple partition key markers declared on '{}'. The document store supports only one partition key per container",
                            entity.persisted_name()
                        ),
                        ErrorKind::ConfigurationError,
                    ));
                }
                partition_key_path = match marker.path() {
                    Some(path) if !path.is_empty() => path.to_string(),
                    _ => property.persisted_name().to_string(),
                };
            }
        }
        Ok(partition_key_path)
    }
}
