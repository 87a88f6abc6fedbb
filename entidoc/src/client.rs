//! The document client seam.
//!
//! The repository layer never talks to the wire itself; it drives these
//! traits, implemented by the underlying document-database client. All
//! calls are blocking round-trips; timeouts, retries and cancellation are
//! the client implementation's concern.

use crate::common::{Document, Value};
use crate::container::ThroughputSpec;
use crate::errors::EntidocResult;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A forward-only stream of raw result values from a query. Entity rows
/// arrive as [Value::Document]; scalar projections as bare scalars.
pub type ValueStream = Box<dyn Iterator<Item = EntidocResult<Value>>>;

/// A named, bound query parameter. The name carries the query-syntax prefix
/// (e.g. `@title`).
#[derive(Clone, Debug, PartialEq)]
pub struct QueryParameter {
    name: String,
    value: Value,
}

impl QueryParameter {
    pub fn new(name: &str, value: Value) -> Self {
        QueryParameter {
            name: name.to_string(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Query text plus bound parameters, in binding order.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySpec {
    text: String,
    parameters: Vec<QueryParameter>,
}

impl QuerySpec {
    pub fn new(text: &str, parameters: Vec<QueryParameter>) -> Self {
        QuerySpec {
            text: text.to_string(),
            parameters,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }
}

/// Partition key routing value for an item operation or a query hint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PartitionKeyValue {
    /// No partition key targeting; the store fans out as needed.
    #[default]
    None,
    /// Route to the partition owning the given key value.
    Key(String),
}

/// Options for query execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    partition_key: PartitionKeyValue,
}

impl QueryOptions {
    pub fn new() -> Self {
        QueryOptions::default()
    }

    pub fn partition_key(mut self, partition_key: PartitionKeyValue) -> Self {
        self.partition_key = partition_key;
        self
    }

    pub fn partition_key_value(&self) -> &PartitionKeyValue {
        &self.partition_key
    }
}

/// Options for single-item mutations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemOptions {
    if_match_etag: Option<String>,
}

impl ItemOptions {
    pub fn new() -> Self {
        ItemOptions::default()
    }

    /// Sets the optimistic-concurrency precondition: the mutation only
    /// applies if the stored document still carries this concurrency token.
    pub fn if_match_etag(mut self, etag: &str) -> Self {
        self.if_match_etag = Some(etag.to_string());
        self
    }

    pub fn if_match_etag_value(&self) -> Option<&str> {
        self.if_match_etag.as_deref()
    }
}

/// Status-code-bearing response from a single-item mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemResponse {
    status_code: u16,
}

impl ItemResponse {
    pub fn new(status_code: u16) -> Self {
        ItemResponse { status_code }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

/// Wire-level container creation request. The partition key path is in
/// slash-prefixed form (`/title`), or `/null` when the entity declares no
/// partition key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRequest {
    container_name: String,
    partition_key_path: String,
}

impl ContainerRequest {
    pub fn new(container_name: &str, partition_key_path: &str) -> Self {
        ContainerRequest {
            container_name: container_name.to_string(),
            partition_key_path: partition_key_path.to_string(),
        }
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn partition_key_path(&self) -> &str {
        &self.partition_key_path
    }
}

/// Entry point to the document store.
pub trait DocumentClient: Send + Sync {
    /// Idempotent create-if-not-exists for a database. The caller cannot
    /// distinguish "already existed" from "just created".
    fn create_database_if_not_exists(
        &self,
        name: &str,
        throughput: Option<&ThroughputSpec>,
    ) -> EntidocResult<Arc<dyn DatabaseClient>>;
}

/// Handle to a provisioned database.
pub trait DatabaseClient: Send + Sync {
    fn name(&self) -> &str;

    /// Idempotent create-if-not-exists for a container.
    fn create_container_if_not_exists(
        &self,
        request: &ContainerRequest,
        throughput: Option<&ThroughputSpec>,
    ) -> EntidocResult<Arc<dyn ContainerClient>>;
}

/// Handle to a provisioned container.
pub trait ContainerClient: Send + Sync {
    fn name(&self) -> &str;

    /// Executes a parametrized query, returning a lazily-consumed stream of
    /// raw values. A store-side not-found condition surfaces as an error
    /// with status 404; callers decide whether that means absence.
    fn query_items(&self, spec: &QuerySpec, options: &QueryOptions) -> EntidocResult<ValueStream>;

    fn create_item(
        &self,
        item: &Document,
        partition_key: &PartitionKeyValue,
        options: &ItemOptions,
    ) -> EntidocResult<ItemResponse>;

    fn upsert_item(&self, item: &Document, options: &ItemOptions) -> EntidocResult<ItemResponse>;

    fn delete_item(
        &self,
        item: &Document,
        partition_key: &PartitionKeyValue,
        options: &ItemOptions,
    ) -> EntidocResult<ItemResponse>;
}

impl Debug for dyn ContainerClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContainerClient({})", self.name())
    }
}
