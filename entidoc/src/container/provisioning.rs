use crate::client::{ContainerClient, ContainerRequest, DatabaseClient, DocumentClient};
use crate::common::NO_PARTITION_KEY_PATH;
use crate::config::DatabaseConfiguration;
use crate::container::{ContainerProperties, ContainerPropertiesResolver};
use crate::errors::EntidocResult;
use crate::metadata::EntityDescriptor;
use dashmap::DashMap;
use std::sync::Arc;

/// Provisions databases and containers with create-if-not-exists semantics
/// and hands out cached container handles per entity type.
///
/// Provisioning is idempotent at the store level, so a lost race between
/// two first callers for the same entity type is harmless; one handle wins
/// the cache.
#[derive(Clone)]
pub struct ContainerProvisioner {
    inner: Arc<ProvisionerInner>,
}

struct ProvisionerInner {
    client: Arc<dyn DocumentClient>,
    resolver: ContainerPropertiesResolver,
    containers: DashMap<String, Arc<dyn ContainerClient>>,
}

impl ContainerProvisioner {
    pub fn new(client: Arc<dyn DocumentClient>, resolver: ContainerPropertiesResolver) -> Self {
        ContainerProvisioner {
            inner: Arc::new(ProvisionerInner {
                client,
                resolver,
                containers: DashMap::new(),
            }),
        }
    }

    pub fn resolver(&self) -> &ContainerPropertiesResolver {
        &self.inner.resolver
    }

    /// Creates the configured database if it does not exist and returns a
    /// handle to it, applying the configured database-level throughput.
    pub fn ensure_database(
        &self,
        config: &DatabaseConfiguration,
    ) -> EntidocResult<Arc<dyn DatabaseClient>> {
        let throughput = config.throughput_spec();
        self.inner
            .client
            .create_database_if_not_exists(config.database_name(), throughput.as_ref())
    }

    /// Eagerly provisions containers for every registered entity marked
    /// auto-create. Called once at initialization; failures are fatal to
    /// startup and are not retried.
    pub fn initialize_containers(
        &self,
        database: &Arc<dyn DatabaseClient>,
        entities: &[Arc<EntityDescriptor>],
    ) -> EntidocResult<()> {
        for entity in entities {
            let auto_create = self
                .inner
                .resolver
                .resolve(entity)?
                .map(|props| props.is_auto_create())
                .unwrap_or(false);
            if auto_create {
                log::debug!("Auto-creating container for entity {}", entity.persisted_name());
                self.container(database, entity)?;
            }
        }
        Ok(())
    }

    /// Returns the container handle for the given entity, creating the
    /// container if needed. Handles are cached per entity type.
    pub fn container(
        &self,
        database: &Arc<dyn DatabaseClient>,
        entity: &EntityDescriptor,
    ) -> EntidocResult<Arc<dyn ContainerClient>> {
        let key = entity.persisted_name();
        if let Some(container) = self.inner.containers.get(key) {
            return Ok(container.clone());
        }
        let properties = self.inner.resolver.resolve(entity)?;
        let request = Self::container_request(entity, properties.as_ref());
        let throughput = properties.as_ref().and_then(|p| p.throughput());
        let container = database.create_container_if_not_exists(&request, throughput)?;
        let entry = self
            .inner
            .containers
            .entry(key.to_string())
            .or_insert(container);
        Ok(entry.clone())
    }

    fn container_request(
        entity: &EntityDescriptor,
        properties: Option<&ContainerProperties>,
    ) -> ContainerRequest {
        let container_name = properties
            .map(|p| p.container_name().to_string())
            .unwrap_or_else(|| entity.persisted_name().to_string());
        let partition_key_path = Self::wire_partition_key_path(properties);
        ContainerRequest::new(&container_name, &partition_key_path)
    }

    fn wire_partition_key_path(properties: Option<&ContainerProperties>) -> String {
        match properties {
            Some(props) if !props.partition_key_path().is_empty() => {
                format!("/{}", props.partition_key_path())
            }
            _ => NO_PARTITION_KEY_PATH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ThroughputMode;
    use crate::metadata::{ContainerAnnotation, PartitionKeyMarker, PersistentProperty};
    use crate::testing::MemoryDocumentClient;

    fn provisioner() -> (MemoryDocumentClient, ContainerProvisioner) {
        let client = MemoryDocumentClient::new();
        let provisioner = ContainerProvisioner::new(
            Arc::new(client.clone()),
            ContainerPropertiesResolver::new(),
        );
        (client, provisioner)
    }

    fn annotated_book() -> Arc<EntityDescriptor> {
        EntityDescriptor::new("book")
            .property(PersistentProperty::new("title").partition_key(PartitionKeyMarker::new()))
            .container(
                ContainerAnnotation::new()
                    .named("books")
                    .throughput(1000, true)
                    .auto_create(true),
            )
            .build()
    }

    #[test]
    fn test_ensure_database_applies_configured_throughput() {
        let (client, provisioner) = provisioner();
        let config = DatabaseConfiguration::new("mydb").throughput(400, false);
        let database = provisioner.ensure_database(&config).unwrap();
        assert_eq!(database.name(), "mydb");
        let throughput = client.database_throughput("mydb").unwrap();
        assert_eq!(throughput.mode(), &ThroughputMode::Manual);
        assert_eq!(throughput.request_units(), 400);
    }

    #[test]
    fn test_ensure_database_is_idempotent() {
        let (_, provisioner) = provisioner();
        let config = DatabaseConfiguration::new("mydb");
        let first = provisioner.ensure_database(&config).unwrap();
        let second = provisioner.ensure_database(&config).unwrap();
        assert_eq!(first.name(), second.name());
    }

    #[test]
    fn test_container_uses_annotation_name_and_wire_path() {
        let (client, provisioner) = provisioner();
        let database = provisioner
            .ensure_database(&DatabaseConfiguration::new("mydb"))
            .unwrap();
        let container = provisioner.container(&database, &annotated_book()).unwrap();
        assert_eq!(container.name(), "books");
        let request = client.container_request("mydb", "books").unwrap();
        assert_eq!(request.partition_key_path(), "/title");
    }

    #[test]
    fn test_container_without_annotation_defaults() {
        let (client, provisioner) = provisioner();
        let database = provisioner
            .ensure_database(&DatabaseConfiguration::new("mydb"))
            .unwrap();
        let plain = EntityDescriptor::new("order").build();
        let container = provisioner.container(&database, &plain).unwrap();
        assert_eq!(container.name(), "order");
        let request = client.container_request("mydb", "order").unwrap();
        assert_eq!(request.partition_key_path(), NO_PARTITION_KEY_PATH);
    }

    #[test]
    fn test_container_handle_is_cached() {
        let (client, provisioner) = provisioner();
        let database = provisioner
            .ensure_database(&DatabaseConfiguration::new("mydb"))
            .unwrap();
        let entity = annotated_book();
        provisioner.container(&database, &entity).unwrap();
        provisioner.container(&database, &entity).unwrap();
        assert_eq!(client.container_create_calls("mydb"), 1);
    }

    #[test]
    fn test_initialize_containers_provisions_auto_create_only() {
        let (client, provisioner) = provisioner();
        let database = provisioner
            .ensure_database(&DatabaseConfiguration::new("mydb"))
            .unwrap();
        let auto = annotated_book();
        let manual = EntityDescriptor::new("order")
            .container(ContainerAnnotation::new().named("orders"))
            .build();
        provisioner
            .initialize_containers(&database, &[auto, manual])
            .unwrap();
        assert!(client.container_request("mydb", "books").is_some());
        assert!(client.container_request("mydb", "orders").is_none());
    }
}
