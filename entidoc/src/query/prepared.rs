use crate::client::{PartitionKeyValue, QueryParameter};
use crate::common::Value;
use crate::metadata::{EntityDescriptor, PersistentProperty};
use crate::query::parameter_name;
use std::sync::Arc;

/// Shape of a query's declared result, resolved once per prepared query and
/// dispatched per element during streaming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultKind {
    /// The root entity type.
    Entity,
    /// A data-transfer projection over a subset/transform of entity fields.
    DtoProjection,
    /// A bare scalar projection (count, single field, ...).
    Scalar,
}

/// How a declared parameter obtains its bound value.
#[derive(Clone, Debug)]
pub enum BindingKind {
    /// A literal value bound by the caller.
    Value(Value),
    /// A collection-valued binding, passed through as one multi-valued
    /// parameter (never flattened into repeated scalars).
    Many(Vec<Value>),
    /// An auto-populated runtime property (generated timestamp, ...),
    /// resolved via the auto-population service with the previous value.
    AutoPopulate {
        property: PersistentProperty,
        previous: Option<Value>,
    },
    /// A property-attached value converter produces the persisted form.
    ConvertProperty {
        property: PersistentProperty,
        value: Value,
    },
    /// An ad-hoc converter referenced by registry key, without an
    /// associated property (used for expression parameters).
    ConvertAdHoc { converter: String, value: Value },
}

/// A declared parameter binding of a prepared query.
#[derive(Clone, Debug)]
pub struct ParameterBinding {
    name: String,
    kind: BindingKind,
}

impl ParameterBinding {
    pub fn new(name: &str, kind: BindingKind) -> Self {
        ParameterBinding {
            name: name.to_string(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &BindingKind {
        &self.kind
    }
}

/// A query template plus parameter bindings and result-shape metadata,
/// produced by an external query-planning collaborator and supplied per
/// call. The core never builds query text itself.
#[derive(Clone, Debug)]
pub struct PreparedQuery {
    text: String,
    root: Arc<EntityDescriptor>,
    result_kind: ResultKind,
    bindings: Vec<ParameterBinding>,
    partition_key_param: Option<String>,
}

impl PreparedQuery {
    pub fn new(text: &str, root: Arc<EntityDescriptor>) -> Self {
        PreparedQuery {
            text: text.to_string(),
            root,
            result_kind: ResultKind::Entity,
            bindings: Vec::new(),
            partition_key_param: None,
        }
    }

    pub fn result_kind(mut self, result_kind: ResultKind) -> Self {
        self.result_kind = result_kind;
        self
    }

    pub fn binding(mut self, binding: ParameterBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Designates the binding whose resolved value routes the query to a
    /// single partition. An optimization hint, not a correctness
    /// requirement.
    pub fn partition_key_param(mut self, name: &str) -> Self {
        self.partition_key_param = Some(name.to_string());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &Arc<EntityDescriptor> {
        &self.root
    }

    pub fn result_kind_value(&self) -> &ResultKind {
        &self.result_kind
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    /// Extracts the partition key hint from the already-bound parameters,
    /// if a partition-key-bearing parameter role is declared.
    pub(crate) fn partition_key_hint(&self, parameters: &[QueryParameter]) -> PartitionKeyValue {
        let role = match &self.partition_key_param {
            Some(role) => parameter_name(role),
            None => return PartitionKeyValue::None,
        };
        parameters
            .iter()
            .find(|p| p.name() == role)
            .and_then(|p| p.value().as_text())
            .map(PartitionKeyValue::Key)
            .unwrap_or(PartitionKeyValue::None)
    }
}

/// A page-oriented query over an entity type. Paged execution is not
/// implemented by this engine generation; the facade fails fast when given
/// one (callers must never receive silently-empty results).
#[derive(Clone, Debug)]
pub struct PagedQuery {
    root: Arc<EntityDescriptor>,
    page: usize,
    size: usize,
}

impl PagedQuery {
    pub fn new(root: Arc<EntityDescriptor>, page: usize, size: usize) -> Self {
        PagedQuery { root, page, size }
    }

    pub fn root(&self) -> &Arc<EntityDescriptor> {
        &self.root
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
