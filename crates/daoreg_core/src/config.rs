//! Startup configuration for a `Manager`.
//!
//! # Responsibility
//! - Describe the data sources to register, loaded from JSON.
//! - Reject configurations that would silently shadow a data source.
//!
//! # Invariants
//! - A validated config has unique, non-empty, trimmed data source names.
//! - Factories are code, not config; they are registered after construction.

use crate::model::data_source::DataSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Configuration loading/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidDataSourceName(String),
    DuplicateDataSource(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::InvalidDataSourceName(value) => {
                write!(f, "data source name is invalid: `{value}`")
            }
            Self::DuplicateDataSource(value) => {
                write!(f, "data source declared more than once: {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidDataSourceName(_) | Self::DuplicateDataSource(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Data sources registered when a `Manager` is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
}

impl ManagerConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for source in &self.data_sources {
            let name = source.name.as_str();
            if name.is_empty() || name.trim() != name {
                return Err(ConfigError::InvalidDataSourceName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateDataSource(name.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ManagerConfig};

    #[test]
    fn parses_sources_with_params() {
        let config = ManagerConfig::from_json_str(
            r#"{"data_sources":[
                {"name":"db1","params":{"path":":memory:"}},
                {"name":"db2"}
            ]}"#,
        )
        .expect("config should parse");

        assert_eq!(config.data_sources.len(), 2);
        assert_eq!(config.data_sources[0].param("path"), Some(":memory:"));
        assert!(config.data_sources[1].params.is_empty());
    }

    #[test]
    fn empty_document_yields_no_sources() {
        let config = ManagerConfig::from_json_str("{}").expect("empty object should parse");
        assert!(config.data_sources.is_empty());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = ManagerConfig::from_json_str(
            r#"{"data_sources":[{"name":"db1"},{"name":"db1"}]}"#,
        )
        .expect_err("duplicates must be rejected");
        assert!(matches!(err, ConfigError::DuplicateDataSource(name) if name == "db1"));
    }

    #[test]
    fn rejects_blank_or_padded_names() {
        for raw in [r#"{"data_sources":[{"name":""}]}"#, r#"{"data_sources":[{"name":" db1"}]}"#] {
            let err = ManagerConfig::from_json_str(raw).expect_err("bad name must be rejected");
            assert!(matches!(err, ConfigError::InvalidDataSourceName(_)));
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ManagerConfig::from_json_str("{").expect_err("truncated json must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
