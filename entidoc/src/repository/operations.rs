use crate::client::{
    ContainerClient, DatabaseClient, DocumentClient, ItemOptions, PartitionKeyValue,
    QueryOptions, QueryParameter, QuerySpec, ValueStream,
};
use crate::common::{
    Convertible, Document, Value, ETAG_FIELD, FIND_ONE_BY_ID_QUERY, ROOT_ID_PARAMETER,
    STATUS_NOT_FOUND, STATUS_NO_CONTENT, STATUS_OK,
};
use crate::config::DatabaseConfiguration;
use crate::container::{ContainerPropertiesResolver, ContainerProvisioner};
use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use crate::metadata::{EntityDescriptor, IdKind};
use crate::query::{PagedQuery, ParameterBinder, PreparedQuery, ResultKind};
use crate::repository::{DocumentCodec, ObjectStream};
use std::sync::Arc;
use uuid::Uuid;

/// Wraps an entity instance to insert, plus its declared root type.
pub struct InsertOperation<T> {
    entity: T,
    root: Arc<EntityDescriptor>,
}

impl<T> InsertOperation<T> {
    pub fn new(entity: T, root: Arc<EntityDescriptor>) -> Self {
        InsertOperation { entity, root }
    }
}

/// Wraps an entity instance to replace, plus its declared root type.
pub struct UpdateOperation<T> {
    entity: T,
    root: Arc<EntityDescriptor>,
}

impl<T> UpdateOperation<T> {
    pub fn new(entity: T, root: Arc<EntityDescriptor>) -> Self {
        UpdateOperation { entity, root }
    }
}

/// Wraps an entity instance to delete, plus its declared root type.
pub struct DeleteOperation<T> {
    entity: T,
    root: Arc<EntityDescriptor>,
}

impl<T> DeleteOperation<T> {
    pub fn new(entity: T, root: Arc<EntityDescriptor>) -> Self {
        DeleteOperation { entity, root }
    }
}

/// The repository operations facade: point lookups, prepared-query
/// execution, streaming reads and single-document mutations against the
/// resolved container of each entity type.
///
/// All operations are synchronous, blocking calls on the invoking thread;
/// concurrency comes entirely from callers invoking the facade
/// concurrently. Cloning the facade shares the underlying state.
#[derive(Clone)]
pub struct RepositoryOperations {
    inner: Arc<RepositoryOperationsInner>,
}

struct RepositoryOperationsInner {
    database: Arc<dyn DatabaseClient>,
    provisioner: ContainerProvisioner,
    binder: ParameterBinder,
}

impl RepositoryOperations {
    /// Provisions the configured database, eagerly creates containers for
    /// every registered entity marked auto-create, and returns the facade.
    /// Provisioning failures are fatal to initialization and not retried.
    pub fn initialize(
        client: Arc<dyn DocumentClient>,
        config: &DatabaseConfiguration,
        entities: &[Arc<EntityDescriptor>],
        binder: ParameterBinder,
    ) -> EntidocResult<Self> {
        let provisioner = ContainerProvisioner::new(client, ContainerPropertiesResolver::new());
        let database = provisioner.ensure_database(config)?;
        provisioner.initialize_containers(&database, entities)?;
        Ok(RepositoryOperations {
            inner: Arc::new(RepositoryOperationsInner {
                database,
                provisioner,
                binder,
            }),
        })
    }

    /// Finds a single entity by its identity value using the canonical
    /// point-lookup query. Absence is a result, never an error: an empty
    /// result set and a store-reported not-found status both yield `None`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::NonUniqueResult] if the store returns more than one
    /// document for the id (a data corruption signal);
    /// [ErrorKind::InvalidId] for unsupported id value types.
    pub fn find_one_by_id<T>(
        &self,
        root: &Arc<EntityDescriptor>,
        id: &Value,
    ) -> EntidocResult<Option<T>>
    where
        T: Convertible<Output = T>,
    {
        let container = self.container(root)?;
        let parameter =
            QueryParameter::new(ROOT_ID_PARAMETER, Value::String(string_id_value(id)?));
        let spec = QuerySpec::new(FIND_ONE_BY_ID_QUERY, vec![parameter]);
        let result = Self::execute_query(container.as_ref(), &spec, &QueryOptions::new())
            .and_then(Self::unique_result);
        match result {
            Ok(Some(value)) => Ok(Some(DocumentCodec::decode::<T>(&value, root)?)),
            Ok(None) => Ok(None),
            Err(e) if e.status() == Some(STATUS_NOT_FOUND) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Executes a prepared query expected to yield at most one result.
    pub fn find_one<R>(&self, query: &PreparedQuery) -> EntidocResult<Option<R>>
    where
        R: Convertible<Output = R>,
    {
        let container = self.container(query.root())?;
        let spec = self.query_spec(query)?;
        let options = QueryOptions::new().partition_key(query.partition_key_hint(spec.parameters()));
        let items = Self::execute_query(container.as_ref(), &spec, &options)?;
        match Self::unique_result(items)? {
            Some(value) => Self::convert_element(&value, query),
            None => Ok(None),
        }
    }

    /// Returns true iff the query yields at least one element. No further
    /// materialization happens.
    pub fn exists(&self, query: &PreparedQuery) -> EntidocResult<bool> {
        let container = self.container(query.root())?;
        let spec = self.query_spec(query)?;
        let options = QueryOptions::new().partition_key(query.partition_key_hint(spec.parameters()));
        let mut items = Self::execute_query(container.as_ref(), &spec, &options)?;
        match items.next() {
            None => Ok(false),
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(EntidocError::new_with_cause(
                "Error retrieving next query result",
                ErrorKind::DataAccessError,
                e,
            )),
        }
    }

    /// Executes a prepared query as a lazy, single-pass stream of typed
    /// results. Each element is deserialized on demand.
    pub fn find_stream<R>(&self, query: &PreparedQuery) -> EntidocResult<ObjectStream<R>>
    where
        R: Convertible<Output = R>,
    {
        let container = self.container(query.root())?;
        let spec = self.query_spec(query)?;
        let options = QueryOptions::new().partition_key(query.partition_key_hint(spec.parameters()));
        let items = Self::execute_query(container.as_ref(), &spec, &options)?;
        Ok(ObjectStream::new(
            items,
            query.root().clone(),
            query.result_kind_value().clone(),
        ))
    }

    /// Executes a prepared query and materializes all results.
    pub fn find_all<R>(&self, query: &PreparedQuery) -> EntidocResult<Vec<R>>
    where
        R: Convertible<Output = R>,
    {
        self.find_stream(query)?.collect()
    }

    /// Inserts an entity. If the identity is declared generated and absent,
    /// a fresh identifier is synthesized before the create call; the
    /// returned entity carries it.
    pub fn persist<T>(&self, operation: InsertOperation<T>) -> EntidocResult<T>
    where
        T: Convertible<Output = T>,
    {
        let InsertOperation { entity, root } = operation;
        let container = self.container(&root)?;
        let mut tree = DocumentCodec::encode(&entity, &root)?;
        let synthesized = Self::generate_identity(&root, &mut tree)?;
        let partition_key = self.partition_key_for(&root, &tree)?;
        let options = Self::versioned_options(&root, &tree)?;
        container.create_item(&tree, &partition_key, &options)?;
        if synthesized {
            DocumentCodec::decode::<T>(&tree.to_value(), &root)
        } else {
            Ok(entity)
        }
    }

    /// Replaces an entity via upsert, applying the concurrency-token
    /// precondition when a version value is present.
    ///
    /// # Errors
    ///
    /// [ErrorKind::DataAccessError] carrying the store's status code when
    /// the response is not the expected success status (including a lost
    /// optimistic-lock race, status 412).
    pub fn update<T>(&self, operation: UpdateOperation<T>) -> EntidocResult<T>
    where
        T: Convertible<Output = T>,
    {
        let UpdateOperation { entity, root } = operation;
        let container = self.container(&root)?;
        let tree = DocumentCodec::encode(&entity, &root)?;
        let options = Self::versioned_options(&root, &tree)?;
        let response = container.upsert_item(&tree, &options)?;
        if response.status_code() == STATUS_OK {
            // the store response carries no item body to deserialize
            Ok(entity)
        } else {
            log::error!(
                "Failed to update entity '{}': status {}",
                root.persisted_name(),
                response.status_code()
            );
            Err(EntidocError::new(
                &format!(
                    "Failed to update entity '{}': unexpected status {}",
                    root.persisted_name(),
                    response.status_code()
                ),
                ErrorKind::DataAccessError,
            )
            .with_status(response.status_code()))
        }
    }

    /// Deletes an entity, deriving its identity and partition key from the
    /// encoded tree and applying the concurrency-token precondition.
    /// Returns 1 if the store reports a no-content success, else 0; the
    /// zero case is ambiguous between "not found" and "precondition
    /// failed" at the count level, but the status can be observed on the
    /// recorded response by the client collaborator.
    pub fn delete<T>(&self, operation: DeleteOperation<T>) -> EntidocResult<usize>
    where
        T: Convertible,
    {
        let DeleteOperation { entity, root } = operation;
        let container = self.container(&root)?;
        let tree = DocumentCodec::encode(&entity, &root)?;
        let partition_key = self.partition_key_for(&root, &tree)?;
        let options = Self::versioned_options(&root, &tree)?;
        let response = container.delete_item(&tree, &partition_key, &options)?;
        if response.status_code() == STATUS_NO_CONTENT {
            Ok(1)
        } else {
            Ok(0)
        }
    }

    /// Batch delete is not supported by this engine generation.
    pub fn delete_all<T>(&self, _operations: Vec<DeleteOperation<T>>) -> EntidocResult<usize>
    where
        T: Convertible,
    {
        Self::unsupported("Batch delete")
    }

    /// Arbitrary update-by-query is not supported: the document store has
    /// no in-place partial-update-by-query primitive.
    pub fn execute_update(&self, _query: &PreparedQuery) -> EntidocResult<usize> {
        Self::unsupported("Update by query")
    }

    /// Paged retrieval is not supported by this engine generation.
    pub fn find_all_paged<R>(&self, _query: &PagedQuery) -> EntidocResult<Vec<R>> {
        Self::unsupported("Paged retrieval")
    }

    /// Paged counting is not supported by this engine generation.
    pub fn count(&self, _query: &PagedQuery) -> EntidocResult<u64> {
        Self::unsupported("Paged count")
    }

    /// Page construction is not supported by this engine generation.
    pub fn find_page<R>(&self, _query: &PagedQuery) -> EntidocResult<Vec<R>> {
        Self::unsupported("Page retrieval")
    }

    fn unsupported<T>(what: &str) -> EntidocResult<T> {
        Err(EntidocError::new(
            &format!("{} is not supported by this engine", what),
            ErrorKind::UnsupportedOperation,
        ))
    }

    fn container(&self, root: &EntityDescriptor) -> EntidocResult<Arc<dyn ContainerClient>> {
        self.inner.provisioner.container(&self.inner.database, root)
    }

    fn query_spec(&self, query: &PreparedQuery) -> EntidocResult<QuerySpec> {
        let parameters = self.inner.binder.bind(query)?;
        Ok(QuerySpec::new(query.text(), parameters))
    }

    fn execute_query(
        container: &dyn ContainerClient,
        spec: &QuerySpec,
        options: &QueryOptions,
    ) -> EntidocResult<ValueStream> {
        Self::log_query(spec);
        container.query_items(spec, options).map_err(|e| {
            EntidocError::new_with_cause("Error executing query", ErrorKind::DataAccessError, e)
        })
    }

    fn unique_result(mut items: ValueStream) -> EntidocResult<Option<Value>> {
        let first = match items.next() {
            None => return Ok(None),
            Some(Err(e)) => return Err(e),
            Some(Ok(value)) => value,
        };
        if items.next().is_some() {
            log::error!("Query expected to yield at most one document yielded more");
            return Err(EntidocError::new(
                "Query expected to yield at most one result yielded more than one",
                ErrorKind::NonUniqueResult,
            ));
        }
        Ok(Some(first))
    }

    fn convert_element<R>(value: &Value, query: &PreparedQuery) -> EntidocResult<Option<R>>
    where
        R: Convertible<Output = R>,
    {
        match query.result_kind_value() {
            ResultKind::Entity | ResultKind::DtoProjection => {
                Ok(Some(DocumentCodec::decode::<R>(value, query.root())?))
            }
            ResultKind::Scalar => Ok(R::convert_value(value)),
        }
    }

    /// Synthesizes a generated identity on the encoded tree when absent.
    /// Unsupported identity types are logged and left unset.
    fn generate_identity(root: &EntityDescriptor, tree: &mut Document) -> EntidocResult<bool> {
        let identity = match root.identity_property() {
            Some(identity) if identity.is_generated() => identity,
            _ => return Ok(false),
        };
        let current = tree.get(identity.persisted_name())?;
        let absent = current.is_null()
            || current.as_string().map(|s| s.is_empty()).unwrap_or(false);
        if !absent {
            return Ok(false);
        }
        match identity.id_kind() {
            IdKind::String | IdKind::Uuid => {
                tree.put(identity.persisted_name(), Uuid::new_v4().to_string())?;
                Ok(true)
            }
            IdKind::Other => {
                log::warn!(
                    "Unexpected identity type for auto-generated value on '{}'",
                    root.persisted_name()
                );
                Ok(false)
            }
        }
    }

    /// Derives the partition key from the encoded tree at the resolved
    /// partition key path. An absent path or value means "no partition
    /// key". Only top-level paths are supported.
    fn partition_key_for(
        &self,
        root: &EntityDescriptor,
        tree: &Document,
    ) -> EntidocResult<PartitionKeyValue> {
        let properties = self.inner.provisioner.resolver().resolve(root)?;
        let path = match properties {
            Some(props) if !props.partition_key_path().is_empty() => {
                props.partition_key_path().to_string()
            }
            _ => return Ok(PartitionKeyValue::None),
        };
        Ok(tree
            .get(&path)?
            .as_text()
            .map(PartitionKeyValue::Key)
            .unwrap_or(PartitionKeyValue::None))
    }

    /// Applies the concurrency-token precondition when the entity declares
    /// a version property and the encoded tree carries a token value.
    fn versioned_options(root: &EntityDescriptor, tree: &Document) -> EntidocResult<ItemOptions> {
        let mut options = ItemOptions::new();
        if root.version_property().is_some() {
            if let Some(etag) = tree.get(ETAG_FIELD)?.as_text() {
                options = options.if_match_etag(&etag);
            }
        }
        Ok(options)
    }

    fn log_query(spec: &QuerySpec) {
        log::debug!("Executing query: {}", spec.text());
        for parameter in spec.parameters() {
            log::debug!(
                "Parameter: name={}, value={}",
                parameter.name(),
                parameter.value()
            );
        }
    }
}

/// Renders an identity value to its canonical string form for the
/// point-lookup query. Ids must be strings (non-empty), integers, or UUIDs
/// in string form.
fn string_id_value(id: &Value) -> EntidocResult<String> {
    match id {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::String(_) => {
            log::error!("Id value cannot be an empty string");
            Err(EntidocError::new(
                "Id value cannot be an empty string",
                ErrorKind::InvalidId,
            ))
        }
        Value::I32(i) => Ok(i.to_string()),
        Value::I64(i) => Ok(i.to_string()),
        other => {
            log::error!("Unsupported id value type: {}", other);
            Err(EntidocError::new(
                "Type of id value must be a string, an integer, or a UUID string",
                ErrorKind::InvalidId,
            ))
        }
    }
}
