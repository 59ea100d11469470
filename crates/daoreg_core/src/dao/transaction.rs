//! Transactional resource contract and the context tracking entry.

use crate::error::DaoResult;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Transactional resource handle wrapped by every DAO.
///
/// Calls take `&self` so the DAO and its context can share one handle.
/// Whether a second `commit`/`rollback` is an error is up to the
/// implementation.
pub trait Transaction {
    fn commit(&self) -> DaoResult<()>;
    fn rollback(&self) -> DaoResult<()>;
}

/// Context entry for one DAO created inside a transaction.
#[derive(Clone)]
pub struct DataAccessObject {
    name: String,
    tx: Rc<dyn Transaction>,
}

impl DataAccessObject {
    pub fn new(name: impl Into<String>, tx: Rc<dyn Transaction>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shared transactional resource.
    pub fn tx(&self) -> &dyn Transaction {
        self.tx.as_ref()
    }

    /// True when both entries wrap the same resource handle.
    pub(crate) fn shares_tx(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tx, &other.tx)
    }
}

impl Debug for DataAccessObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccessObject")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
