//! SQLite storage backend.
//!
//! # Responsibility
//! - Open one SQLite connection per DAO with an explicit `BEGIN`.
//! - Provide a factory that maps DAO names to constructors over that
//!   connection.
//!
//! # Invariants
//! - Connections handed to DAOs have `foreign_keys=ON` and a busy timeout.
//! - Every DAO built by `SqliteFactory` is tracked in its context.

mod factory;
mod transaction;

pub use factory::{SqliteDaoConstructor, SqliteFactory};
pub use transaction::{sqlite_source, SqliteTransaction, MEMORY_PATH, PATH_PARAM};
