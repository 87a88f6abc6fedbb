//! Database configuration consumed once at initialization.

use crate::container::ThroughputSpec;

/// Configuration for the target database: its name and an optional
/// database-level throughput override applied at provisioning time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfiguration {
    database_name: String,
    throughput_request_units: Option<i32>,
    throughput_auto_scale: bool,
}

impl DatabaseConfiguration {
    pub fn new(database_name: &str) -> Self {
        DatabaseConfiguration {
            database_name: database_name.to_string(),
            throughput_request_units: None,
            throughput_auto_scale: false,
        }
    }

    pub fn throughput(mut self, request_units: i32, auto_scale: bool) -> Self {
        self.throughput_request_units = Some(request_units);
        self.throughput_auto_scale = auto_scale;
        self
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Builds the throughput spec for database provisioning, or `None` when
    /// no override is configured.
    pub fn throughput_spec(&self) -> Option<ThroughputSpec> {
        match self.throughput_request_units {
            Some(units) => {
                if self.throughput_auto_scale {
                    Some(ThroughputSpec::autoscale(units))
                } else {
                    Some(ThroughputSpec::manual(units))
                }
            }
            None => None,
        }
    }
}
