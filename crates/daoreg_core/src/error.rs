//! Error types shared by the registry, contexts and storage backends.
//!
//! # Responsibility
//! - Name every failure a transaction lifecycle call can surface.
//! - Keep backend transport errors (`rusqlite`) reachable through `source()`.
//!
//! # Invariants
//! - Factory construction errors reach callers unchanged.
//! - Commit/rollback failures always carry the DAO name they came from.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DaoResult<T> = Result<T, DaoError>;

/// Errors surfaced by registry lookups, DAO construction and transaction
/// lifecycle calls.
#[derive(Debug)]
pub enum DaoError {
    /// `create_dao` was called with a name no factory declared.
    UnregisteredFactory(String),
    /// A factory could not build the requested DAO.
    Construction { dao: String, message: String },
    /// A factory referenced a data source that is not registered.
    MissingDataSource(String),
    /// A data source lacks a connection parameter the backend needs.
    MissingParameter { source: String, param: &'static str },
    /// The factory produced an instance of a different type than requested.
    UnexpectedDaoType(String),
    /// First commit failure; later DAOs were not committed.
    Commit { dao: String, source: Box<DaoError> },
    /// Last rollback failure after every DAO was attempted.
    Rollback { dao: String, source: Box<DaoError> },
    /// Commit or rollback on a transaction that already finished.
    TransactionFinished,
    Db(rusqlite::Error),
}

impl Display for DaoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnregisteredFactory(name) => {
                write!(f, "no factory for data access object {name}")
            }
            Self::Construction { dao, message } => {
                write!(f, "failed to construct data access object {dao}: {message}")
            }
            Self::MissingDataSource(name) => write!(f, "data source not registered: {name}"),
            Self::MissingParameter { source, param } => {
                write!(f, "data source {source} is missing parameter `{param}`")
            }
            Self::UnexpectedDaoType(name) => {
                write!(f, "data access object {name} has an unexpected type")
            }
            Self::Commit { dao, source } => {
                write!(f, "commit failed for data access object {dao}: {source}")
            }
            Self::Rollback { dao, source } => {
                write!(f, "rollback failed for data access object {dao}: {source}")
            }
            Self::TransactionFinished => write!(f, "transaction already committed or rolled back"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DaoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Commit { source, .. } | Self::Rollback { source, .. } => Some(source.as_ref()),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DaoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}
