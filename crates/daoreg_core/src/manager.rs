//! DAO registry and transaction lifecycle coordinator.
//!
//! # Responsibility
//! - Map names to data sources and to the factories that build DAOs.
//! - Drive start/commit/rollback/end across every DAO tracked by a context.
//!
//! # Invariants
//! - Registration is last-write-wins per name and never fails.
//! - Commit stops at the first failing DAO; later DAOs are left untouched.
//! - Rollback attempts every DAO and reports the last failure.
//! - End never touches transactional resources.
//!
//! # See also
//! - `Factory` for the DAO tracking obligation.

use crate::config::{ConfigError, ManagerConfig};
use crate::context::{Context, SourceMap};
use crate::dao::{DataAccessObject, Factory};
use crate::error::{DaoError, DaoResult};
use crate::model::data_source::DataSource;
use log::{debug, error, info, warn};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of data sources and factories.
///
/// Build it once at startup, register everything through `&mut self`, then
/// share it read-only for per-transaction calls.
#[derive(Default)]
pub struct Manager {
    sources: Arc<SourceMap>,
    factories: BTreeMap<String, Arc<dyn Factory>>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager with every configured data source registered.
    ///
    /// # Errors
    /// - Any `ConfigError` from `ManagerConfig::validate`; configs built in
    ///   code are checked the same way as loaded ones.
    pub fn with_config(config: ManagerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut manager = Self::new();
        for source in config.data_sources {
            manager.register_data_source(source);
        }
        Ok(manager)
    }

    /// Registers `source` under its name, replacing any previous entry.
    ///
    /// Contexts already started keep the data sources they started with.
    pub fn register_data_source(&mut self, source: DataSource) {
        debug!(
            "event=register_data_source module=manager status=ok name={}",
            source.name
        );
        Arc::make_mut(&mut self.sources).insert(source.name.clone(), Arc::new(source));
    }

    /// Binds every DAO name declared by `factory` to it.
    pub fn register_factory(&mut self, factory: Arc<dyn Factory>) {
        for name in factory.data_access_objects() {
            if self.factories.contains_key(name.as_str()) {
                debug!(
                    "event=register_factory module=manager status=replaced dao={}",
                    name
                );
            }
            self.factories.insert(name, Arc::clone(&factory));
        }
    }

    pub fn source(&self, name: &str) -> Option<&DataSource> {
        self.sources.get(name).map(Arc::as_ref)
    }

    /// Returns sorted data source names.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Returns sorted DAO names that have a bound factory.
    pub fn factory_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Starts a new transaction context.
    ///
    /// Always succeeds today; the `Result` leaves room for eager resource
    /// acquisition.
    pub fn start_transaction(&self) -> DaoResult<Context> {
        let ctx = Context::new(Arc::clone(&self.sources));
        info!(
            "event=tx_start module=manager status=ok context_id={}",
            ctx.id()
        );
        Ok(ctx)
    }

    /// Creates the DAO registered under `name` inside `ctx`.
    ///
    /// # Errors
    /// - `UnregisteredFactory` when no factory declared `name`.
    /// - Any factory construction error, unchanged.
    pub fn create_dao(&self, ctx: &mut Context, name: &str) -> DaoResult<Box<dyn Any>> {
        let Some(factory) = self.factories.get(name) else {
            warn!(
                "event=dao_create module=manager status=error context_id={} dao={} error_code=unregistered_factory",
                ctx.id(),
                name
            );
            return Err(DaoError::UnregisteredFactory(name.to_string()));
        };

        match factory.new_data_access_object(ctx, name) {
            Ok(dao) => {
                if ctx.contains(name) {
                    debug!(
                        "event=dao_create module=manager status=ok context_id={} dao={}",
                        ctx.id(),
                        name
                    );
                } else {
                    warn!(
                        "event=dao_create module=manager status=untracked context_id={} dao={}",
                        ctx.id(),
                        name
                    );
                }
                Ok(dao)
            }
            Err(err) => {
                error!(
                    "event=dao_create module=manager status=error context_id={} dao={} error={}",
                    ctx.id(),
                    name,
                    err
                );
                Err(err)
            }
        }
    }

    /// Creates the DAO registered under `name` and downcasts it to `T`.
    ///
    /// On `UnexpectedDaoType` the entry the factory tracked during this call
    /// is rolled back and removed, and any entry it replaced is put back, so
    /// `ctx` looks as it did before the call.
    pub fn create_typed_dao<T: Any>(&self, ctx: &mut Context, name: &str) -> DaoResult<T> {
        let previous = ctx.get(name).cloned();
        let dao = self.create_dao(ctx, name)?;
        match dao.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(_) => {
                self.discard_new_entry(ctx, name, previous);
                Err(DaoError::UnexpectedDaoType(name.to_string()))
            }
        }
    }

    fn discard_new_entry(
        &self,
        ctx: &mut Context,
        name: &str,
        previous: Option<DataAccessObject>,
    ) {
        let created_now = match (ctx.get(name), previous.as_ref()) {
            (Some(current), Some(previous)) => !current.shares_tx(previous),
            (Some(_), None) => true,
            (None, _) => false,
        };
        if created_now {
            if let Some(entry) = ctx.untrack(name) {
                if let Err(err) = entry.tx().rollback() {
                    warn!(
                        "event=dao_discard module=manager status=error context_id={} dao={} error={}",
                        ctx.id(),
                        name,
                        err
                    );
                }
            }
        }
        if let Some(previous) = previous {
            ctx.restore(previous);
        }
    }

    /// Commits every tracked DAO, stopping at the first failure.
    ///
    /// DAOs after the failing one are neither committed nor rolled back;
    /// callers decide whether to follow up with `rollback_transaction`.
    pub fn commit_transaction(&self, ctx: &Context) -> DaoResult<()> {
        for dao in ctx.daos() {
            if let Err(err) = dao.tx().commit() {
                error!(
                    "event=tx_commit module=manager status=error context_id={} dao={} error={}",
                    ctx.id(),
                    dao.name(),
                    err
                );
                return Err(DaoError::Commit {
                    dao: dao.name().to_string(),
                    source: Box::new(err),
                });
            }
        }

        info!(
            "event=tx_commit module=manager status=ok context_id={} dao_count={}",
            ctx.id(),
            ctx.len()
        );
        Ok(())
    }

    /// Rolls back every tracked DAO and returns the last failure, if any.
    pub fn rollback_transaction(&self, ctx: &Context) -> DaoResult<()> {
        let mut last_error = None;

        for dao in ctx.daos() {
            if let Err(err) = dao.tx().rollback() {
                error!(
                    "event=tx_rollback module=manager status=error context_id={} dao={} error={}",
                    ctx.id(),
                    dao.name(),
                    err
                );
                last_error = Some(DaoError::Rollback {
                    dao: dao.name().to_string(),
                    source: Box::new(err),
                });
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => {
                info!(
                    "event=tx_rollback module=manager status=ok context_id={} dao_count={}",
                    ctx.id(),
                    ctx.len()
                );
                Ok(())
            }
        }
    }

    /// Forgets every DAO tracked by `ctx`, leaving it reusable.
    pub fn end_transaction(&self, ctx: &mut Context) {
        debug!(
            "event=tx_end module=manager status=ok context_id={} dao_count={}",
            ctx.id(),
            ctx.len()
        );
        ctx.clear();
    }
}
