use crate::client::QueryParameter;
use crate::common::{Value, PARAMETER_PREFIX};
use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use crate::metadata::PersistentProperty;
use crate::query::{BindingKind, PreparedQuery};
use std::sync::Arc;

/// Resolves generated/auto-populated parameter values at bind time.
pub trait AutoPopulationService: Send + Sync {
    fn populate(
        &self,
        property: &PersistentProperty,
        previous: Option<&Value>,
    ) -> EntidocResult<Value>;
}

/// Converts a typed value into its persisted representation.
pub trait ValueConverter: Send + Sync {
    fn to_persisted(&self, value: &Value) -> EntidocResult<Value>;
}

/// Looks up value converters by registry key.
pub trait ConverterRegistry: Send + Sync {
    fn converter(&self, name: &str) -> EntidocResult<Arc<dyn ValueConverter>>;
}

/// Prefixes a placeholder name with the document query syntax marker,
/// unless already prefixed.
pub(crate) fn parameter_name(name: &str) -> String {
    if name.starts_with(PARAMETER_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", PARAMETER_PREFIX, name)
    }
}

/// Converts a prepared query's declared bindings into wire-level query
/// parameters, in declaration order. Order is stable and matches the
/// query's adjacency even though lookup is logically name-based.
#[derive(Clone, Default)]
pub struct ParameterBinder {
    auto_population: Option<Arc<dyn AutoPopulationService>>,
    converters: Option<Arc<dyn ConverterRegistry>>,
}

impl ParameterBinder {
    pub fn new() -> Self {
        ParameterBinder::default()
    }

    pub fn with_auto_population(mut self, service: Arc<dyn AutoPopulationService>) -> Self {
        self.auto_population = Some(service);
        self
    }

    pub fn with_converters(mut self, registry: Arc<dyn ConverterRegistry>) -> Self {
        self.converters = Some(registry);
        self
    }

    pub fn bind(&self, query: &PreparedQuery) -> EntidocResult<Vec<QueryParameter>> {
        let mut parameters = Vec::with_capacity(query.bindings().len());
        for binding in query.bindings() {
            let value = match binding.kind() {
                BindingKind::Value(value) => value.clone(),
                BindingKind::Many(values) => Value::Array(values.clone()),
                BindingKind::AutoPopulate { property, previous } => self
                    .auto_population_service()?
                    .populate(property, previous.as_ref())?,
                BindingKind::ConvertProperty { property, value } => match property.converter() {
                    Some(converter) => self.converter(converter)?.to_persisted(value)?,
                    None => value.clone(),
                },
                BindingKind::ConvertAdHoc { converter, value } => {
                    self.converter(converter)?.to_persisted(value)?
                }
            };
            parameters.push(QueryParameter::new(&parameter_name(binding.name()), value));
        }
        Ok(parameters)
    }

    fn auto_population_service(&self) -> EntidocResult<&Arc<dyn AutoPopulationService>> {
        self.auto_population.as_ref().ok_or_else(|| {
            log::error!("Auto-populated binding without an auto-population service");
            EntidocError::new(
                "Query declares an auto-populated parameter but no auto-population service is configured",
                ErrorKind::ConfigurationError,
            )
        })
    }

    fn converter(&self, name: &str) -> EntidocResult<Arc<dyn ValueConverter>> {
        let registry = self.converters.as_ref().ok_or_else(|| {
            log::error!("Converter binding without a converter registry");
            EntidocError::new(
                "Query declares a converted parameter but no converter registry is configured",
                ErrorKind::ConfigurationError,
            )
        })?;
        registry.converter(name)
    }
}
