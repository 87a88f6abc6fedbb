//! In-memory document store used across the test suite. Implements the
//! client seam with recorded calls so tests can assert on routing,
//! preconditions and provisioning requests.

use crate::client::{
    ContainerClient, ContainerRequest, DatabaseClient, DocumentClient, ItemOptions, ItemResponse,
    PartitionKeyValue, QueryOptions, QuerySpec, ValueStream,
};
use crate::common::{
    Document, Value, ETAG_FIELD, ID_FIELD, ROOT_ID_PARAMETER, STATUS_CREATED, STATUS_NOT_FOUND,
    STATUS_NO_CONTENT, STATUS_OK, STATUS_PRECONDITION_FAILED,
};
use crate::container::ThroughputSpec;
use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[ctor::ctor]
fn init() {
    colog::init();
}

/// A single recorded item mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    Create {
        partition_key: PartitionKeyValue,
        etag: Option<String>,
    },
    Upsert {
        etag: Option<String>,
    },
    Delete {
        partition_key: PartitionKeyValue,
        etag: Option<String>,
    },
}

#[derive(Clone)]
pub struct MemoryDocumentClient {
    inner: Arc<MemoryStore>,
}

#[derive(Default)]
struct MemoryStore {
    databases: DashMap<String, Arc<MemoryDatabase>>,
}

struct MemoryDatabase {
    name: String,
    throughput: Option<ThroughputSpec>,
    containers: DashMap<String, Arc<MemoryContainer>>,
    requests: DashMap<String, (ContainerRequest, Option<ThroughputSpec>)>,
    create_calls: AtomicUsize,
}

#[derive(Default)]
struct MemoryContainer {
    name: String,
    items: Mutex<Vec<Document>>,
    calls: Mutex<Vec<RecordedCall>>,
    query_failure: Mutex<Option<u16>>,
    stream_failure: Mutex<Option<u16>>,
}

impl MemoryDocumentClient {
    pub fn new() -> Self {
        MemoryDocumentClient {
            inner: Arc::new(MemoryStore::default()),
        }
    }

    pub fn database_throughput(&self, database: &str) -> Option<ThroughputSpec> {
        self.inner
            .databases
            .get(database)
            .and_then(|db| db.throughput.clone())
    }

    pub fn container_request(&self, database: &str, container: &str) -> Option<ContainerRequest> {
        self.inner
            .databases
            .get(database)
            .and_then(|db| db.requests.get(container).map(|r| r.0.clone()))
    }

    pub fn container_throughput(&self, database: &str, container: &str) -> Option<ThroughputSpec> {
        self.inner
            .databases
            .get(database)
            .and_then(|db| db.requests.get(container).and_then(|r| r.1.clone()))
    }

    pub fn container_create_calls(&self, database: &str) -> usize {
        self.inner
            .databases
            .get(database)
            .map(|db| db.create_calls.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn recorded_calls(&self, database: &str, container: &str) -> Vec<RecordedCall> {
        self.container(database, container).calls.lock().clone()
    }

    /// Places a document directly into container storage, bypassing the
    /// mutation path.
    pub fn seed(&self, database: &str, container: &str, document: Document) {
        self.container(database, container).items.lock().push(document);
    }

    /// Makes every subsequent query against the container fail with the
    /// given status code.
    pub fn fail_query(&self, database: &str, container: &str, status: u16) {
        *self.container(database, container).query_failure.lock() = Some(status);
    }

    /// Makes queries against the container succeed but yield a single
    /// errored element with the given status code.
    pub fn fail_stream(&self, database: &str, container: &str, status: u16) {
        *self.container(database, container).stream_failure.lock() = Some(status);
    }

    fn container(&self, database: &str, container: &str) -> Arc<MemoryContainer> {
        self.inner
            .databases
            .get(database)
            .and_then(|db| db.containers.get(container).map(|c| c.clone()))
            .unwrap_or_else(|| panic!("no container '{}' in database '{}'", container, database))
    }
}

impl DocumentClient for MemoryDocumentClient {
    fn create_database_if_not_exists(
        &self,
        name: &str,
        throughput: Option<&ThroughputSpec>,
    ) -> EntidocResult<Arc<dyn DatabaseClient>> {
        let database = self
            .inner
            .databases
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MemoryDatabase {
                    name: name.to_string(),
                    throughput: throughput.cloned(),
                    containers: DashMap::new(),
                    requests: DashMap::new(),
                    create_calls: AtomicUsize::new(0),
                })
            })
            .clone();
        Ok(database)
    }
}

impl DatabaseClient for MemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_container_if_not_exists(
        &self,
        request: &ContainerRequest,
        throughput: Option<&ThroughputSpec>,
    ) -> EntidocResult<Arc<dyn ContainerClient>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.insert(
            request.container_name().to_string(),
            (request.clone(), throughput.cloned()),
        );
        let container = self
            .containers
            .entry(request.container_name().to_string())
            .or_insert_with(|| {
                Arc::new(MemoryContainer {
                    name: request.container_name().to_string(),
                    ..MemoryContainer::default()
                })
            })
            .clone();
        Ok(container)
    }
}

impl MemoryContainer {
    /// Builds the error a real client implementation would raise for the
    /// given store status.
    fn store_error(message: &str, status: u16) -> EntidocError {
        let kind = if status == STATUS_NOT_FOUND {
            ErrorKind::NotFound
        } else {
            ErrorKind::ClientError
        };
        EntidocError::new(&format!("{} with status {}", message, status), kind).with_status(status)
    }

    fn id_of(document: &Document) -> Option<String> {
        document.get(ID_FIELD).ok().and_then(|v| v.as_text())
    }

    fn stored_etag(&self, id: &str) -> Option<String> {
        self.items
            .lock()
            .iter()
            .find(|d| Self::id_of(d).as_deref() == Some(id))
            .and_then(|d| d.get(ETAG_FIELD).ok().and_then(|v| v.as_text()))
    }

    /// True when the precondition holds against the stored document, or no
    /// precondition was requested.
    fn precondition_holds(&self, id: &str, options: &ItemOptions) -> bool {
        match options.if_match_etag_value() {
            None => true,
            Some(expected) => self.stored_etag(id).as_deref() == Some(expected),
        }
    }
}

impl ContainerClient for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_items(&self, spec: &QuerySpec, _options: &QueryOptions) -> EntidocResult<ValueStream> {
        if let Some(status) = *self.query_failure.lock() {
            return Err(Self::store_error("Simulated query failure", status));
        }
        if let Some(status) = *self.stream_failure.lock() {
            return Ok(Box::new(std::iter::once(Err(Self::store_error(
                "Simulated stream failure",
                status,
            )))));
        }
        let id_filter = spec
            .parameters()
            .iter()
            .find(|p| p.name() == ROOT_ID_PARAMETER)
            .and_then(|p| p.value().as_text());
        let results: Vec<EntidocResult<Value>> = self
            .items
            .lock()
            .iter()
            .filter(|d| match &id_filter {
                Some(id) => Self::id_of(d).as_deref() == Some(id.as_str()),
                None => true,
            })
            .map(|d| Ok(Value::Document(d.clone())))
            .collect();
        Ok(Box::new(results.into_iter()))
    }

    fn create_item(
        &self,
        item: &Document,
        partition_key: &PartitionKeyValue,
        options: &ItemOptions,
    ) -> EntidocResult<ItemResponse> {
        self.calls.lock().push(RecordedCall::Create {
            partition_key: partition_key.clone(),
            etag: options.if_match_etag_value().map(str::to_string),
        });
        self.items.lock().push(item.clone());
        Ok(ItemResponse::new(STATUS_CREATED))
    }

    fn upsert_item(&self, item: &Document, options: &ItemOptions) -> EntidocResult<ItemResponse> {
        self.calls.lock().push(RecordedCall::Upsert {
            etag: options.if_match_etag_value().map(str::to_string),
        });
        let id = match Self::id_of(item) {
            Some(id) => id,
            None => return Ok(ItemResponse::new(STATUS_NOT_FOUND)),
        };
        if !self.precondition_holds(&id, options) {
            return Ok(ItemResponse::new(STATUS_PRECONDITION_FAILED));
        }
        let mut items = self.items.lock();
        match items
            .iter_mut()
            .find(|d| Self::id_of(d).as_deref() == Some(id.as_str()))
        {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(ItemResponse::new(STATUS_OK))
    }

    fn delete_item(
        &self,
        item: &Document,
        partition_key: &PartitionKeyValue,
        options: &ItemOptions,
    ) -> EntidocResult<ItemResponse> {
        self.calls.lock().push(RecordedCall::Delete {
            partition_key: partition_key.clone(),
            etag: options.if_match_etag_value().map(str::to_string),
        });
        let id = match Self::id_of(item) {
            Some(id) => id,
            None => return Ok(ItemResponse::new(STATUS_NOT_FOUND)),
        };
        if !self.precondition_holds(&id, options) {
            return Ok(ItemResponse::new(STATUS_PRECONDITION_FAILED));
        }
        let mut items = self.items.lock();
        let position = items
            .iter()
            .position(|d| Self::id_of(d).as_deref() == Some(id.as_str()));
        match position {
            Some(position) => {
                items.remove(position);
                Ok(ItemResponse::new(STATUS_NO_CONTENT))
            }
            None => Ok(ItemResponse::new(STATUS_NOT_FOUND)),
        }
    }
}
