//! SQLite factory: one connection and transaction per DAO.

use super::transaction::SqliteTransaction;
use crate::context::Context;
use crate::dao::{Factory, Transaction};
use crate::error::{DaoError, DaoResult};
use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Builds a DAO instance over an open SQLite transaction.
pub type SqliteDaoConstructor = fn(Rc<SqliteTransaction>) -> Box<dyn Any>;

/// Factory for DAOs stored in one SQLite data source.
#[derive(Debug, Clone)]
pub struct SqliteFactory {
    source_name: String,
    constructors: BTreeMap<String, SqliteDaoConstructor>,
}

impl SqliteFactory {
    /// Creates a factory bound to the data source registered as `source_name`.
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            constructors: BTreeMap::new(),
        }
    }

    /// Declares one DAO name and how to build it.
    pub fn with_dao(mut self, name: impl Into<String>, constructor: SqliteDaoConstructor) -> Self {
        self.constructors.insert(name.into(), constructor);
        self
    }
}

impl Factory for SqliteFactory {
    fn data_access_objects(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    fn new_data_access_object(&self, ctx: &mut Context, name: &str) -> DaoResult<Box<dyn Any>> {
        let Some(constructor) = self.constructors.get(name) else {
            return Err(DaoError::Construction {
                dao: name.to_string(),
                message: format!("not declared by factory for {}", self.source_name),
            });
        };
        let source = ctx
            .source(&self.source_name)
            .ok_or_else(|| DaoError::MissingDataSource(self.source_name.clone()))?;

        let tx = Rc::new(SqliteTransaction::begin(source)?);
        ctx.track(name, Rc::clone(&tx) as Rc<dyn Transaction>);
        Ok(constructor(tx))
    }
}
