//! Per-transaction context.
//!
//! # Responsibility
//! - Track every DAO created inside one transaction by name.
//! - Give factories read-only access to the registered data sources.
//!
//! # Invariants
//! - At most one live DAO per name; tracking a name again replaces the entry.
//! - Iteration order is ascending DAO name.
//! - The data source view is the one registered when the context started.
//! - A context is `!Send`: one thread, one transaction at a time.

use crate::dao::{DataAccessObject, Transaction};
use crate::model::data_source::DataSource;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// Correlation id used in lifecycle log events.
pub type ContextId = Uuid;

pub(crate) type SourceMap = BTreeMap<String, Arc<DataSource>>;

/// Holder of the active transaction and the DAOs spawned within it.
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    sources: Arc<SourceMap>,
    daos: BTreeMap<String, DataAccessObject>,
}

impl Context {
    pub(crate) fn new(sources: Arc<SourceMap>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sources,
            daos: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Returns the data source registered under `name`, if any.
    pub fn source(&self, name: &str) -> Option<&DataSource> {
        self.sources.get(name).map(Arc::as_ref)
    }

    /// Records a DAO's transactional resource so commit/rollback reach it.
    ///
    /// Factories call this from `new_data_access_object`. Returns the entry
    /// that was replaced, if the name was already tracked.
    pub fn track(
        &mut self,
        name: impl Into<String>,
        tx: Rc<dyn Transaction>,
    ) -> Option<DataAccessObject> {
        let name = name.into();
        self.daos.insert(name.clone(), DataAccessObject::new(name, tx))
    }

    pub fn len(&self) -> usize {
        self.daos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daos.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.daos.contains_key(name)
    }

    /// Returns tracked DAO names in iteration order.
    pub fn dao_names(&self) -> Vec<String> {
        self.daos.keys().cloned().collect()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&DataAccessObject> {
        self.daos.get(name)
    }

    /// Drops the entry for `name` without touching its resource.
    pub(crate) fn untrack(&mut self, name: &str) -> Option<DataAccessObject> {
        self.daos.remove(name)
    }

    /// Puts back an entry previously returned by `get`/`untrack`.
    pub(crate) fn restore(&mut self, entry: DataAccessObject) {
        self.daos.insert(entry.name().to_string(), entry);
    }

    pub(crate) fn daos(&self) -> impl Iterator<Item = &DataAccessObject> {
        self.daos.values()
    }

    pub(crate) fn clear(&mut self) {
        self.daos = BTreeMap::new();
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, SourceMap};
    use crate::dao::Transaction;
    use crate::error::DaoResult;
    use crate::model::data_source::DataSource;
    use std::rc::Rc;
    use std::sync::Arc;

    struct NoopTx;

    impl Transaction for NoopTx {
        fn commit(&self) -> DaoResult<()> {
            Ok(())
        }

        fn rollback(&self) -> DaoResult<()> {
            Ok(())
        }
    }

    fn context_with_source(name: &str) -> Context {
        let mut sources = SourceMap::new();
        sources.insert(name.to_string(), Arc::new(DataSource::new(name)));
        Context::new(Arc::new(sources))
    }

    #[test]
    fn tracking_same_name_twice_keeps_one_entry() {
        let mut ctx = context_with_source("db1");
        assert!(ctx.track("users", Rc::new(NoopTx)).is_none());
        let replaced = ctx
            .track("users", Rc::new(NoopTx))
            .expect("second track should replace first");

        assert_eq!(replaced.name(), "users");
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn dao_names_are_sorted() {
        let mut ctx = context_with_source("db1");
        ctx.track("orders", Rc::new(NoopTx));
        ctx.track("accounts", Rc::new(NoopTx));
        ctx.track("users", Rc::new(NoopTx));

        assert_eq!(ctx.dao_names(), vec!["accounts", "orders", "users"]);
    }

    #[test]
    fn source_lookup_returns_none_for_unknown_name() {
        let ctx = context_with_source("db1");
        assert_eq!(ctx.source("db1").map(|s| s.name.as_str()), Some("db1"));
        assert!(ctx.source("db2").is_none());
    }

    #[test]
    fn clear_empties_and_allows_reuse() {
        let mut ctx = context_with_source("db1");
        ctx.track("users", Rc::new(NoopTx));
        ctx.clear();
        assert!(ctx.is_empty());

        ctx.track("users", Rc::new(NoopTx));
        assert!(ctx.contains("users"));
    }

    #[test]
    fn each_context_gets_a_distinct_id() {
        let a = context_with_source("db1");
        let b = context_with_source("db1");
        assert_ne!(a.id(), b.id());
    }
}
