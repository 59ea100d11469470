//! Data access object registry.
//! Maps names to data sources and DAO factories and coordinates one
//! transaction's lifecycle across every DAO created within it.

pub mod config;
pub mod context;
pub mod dao;
pub mod error;
pub mod logging;
pub mod manager;
pub mod model;
pub mod sqlite;

pub use config::{ConfigError, ManagerConfig};
pub use context::{Context, ContextId};
pub use dao::{DataAccessObject, Factory, Transaction};
pub use error::{DaoError, DaoResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use manager::Manager;
pub use model::data_source::DataSource;
pub use sqlite::{sqlite_source, SqliteFactory, SqliteTransaction};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
