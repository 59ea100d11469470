//! Named data source descriptor.
//!
//! # Responsibility
//! - Identify one external store by a unique name.
//! - Carry opaque connection parameters for the factory that opens it.
//!
//! # Invariants
//! - `name` is the registry key; re-registering a name replaces the record.
//! - Parameters are interpreted only by storage backends, never by the registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Connection descriptor registered under a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    /// Backend-specific connection parameters (for SQLite: `path`).
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl DataSource {
    /// Creates a data source with no connection parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Returns this data source with one parameter set.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Looks up one connection parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
