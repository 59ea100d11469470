//! SQLite-backed transactional resource.

use crate::dao::Transaction;
use crate::error::{DaoError, DaoResult};
use crate::model::data_source::DataSource;
use log::{error, info};
use rusqlite::Connection;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Data source parameter holding the database file path.
pub const PATH_PARAM: &str = "path";
/// `path` value that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds a SQLite data source descriptor.
pub fn sqlite_source(name: impl Into<String>, path: impl Into<String>) -> DataSource {
    DataSource::new(name).with_param(PATH_PARAM, path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
}

/// One SQLite connection with an open transaction.
///
/// Finishing twice (commit after commit, rollback after commit, ...)
/// returns `DaoError::TransactionFinished`. Dropping an active transaction
/// lets SQLite discard its changes.
#[derive(Debug)]
pub struct SqliteTransaction {
    source_name: String,
    conn: Connection,
    state: Cell<TxState>,
}

impl SqliteTransaction {
    /// Opens the database described by `source` and begins a transaction.
    ///
    /// # Errors
    /// - `MissingParameter` when `source` has no `path`.
    /// - `Db` when the database cannot be opened or configured.
    pub fn begin(source: &DataSource) -> DaoResult<Self> {
        let path = source
            .param(PATH_PARAM)
            .ok_or_else(|| DaoError::MissingParameter {
                source: source.name.clone(),
                param: PATH_PARAM,
            })?;
        let mode = if path == MEMORY_PATH { "memory" } else { "file" };
        let started_at = Instant::now();

        let opened = if path == MEMORY_PATH {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        };

        match opened.and_then(|conn| bootstrap_connection(&conn).map(|()| conn)) {
            Ok(conn) => {
                info!(
                    "event=tx_begin module=sqlite status=ok mode={} source={} duration_ms={}",
                    mode,
                    source.name,
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    source_name: source.name.clone(),
                    conn,
                    state: Cell::new(TxState::Active),
                })
            }
            Err(err) => {
                error!(
                    "event=tx_begin module=sqlite status=error mode={} source={} duration_ms={} error={}",
                    mode,
                    source.name,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Connection for DAO domain queries; statements run inside the open
    /// transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// True while this handle's transaction is still open on the connection.
    ///
    /// SQLite can end a transaction on its own (`INSERT OR ROLLBACK`,
    /// `RAISE(ROLLBACK)`, some failed COMMITs); the connection is then back
    /// in autocommit mode and the transaction counts as finished.
    pub fn is_active(&self) -> bool {
        self.state.get() == TxState::Active && !self.conn.is_autocommit()
    }

    fn finish(&self, sql: &str, next: TxState) -> DaoResult<()> {
        if !self.is_active() {
            if self.state.get() == TxState::Active {
                self.state.set(TxState::RolledBack);
            }
            return Err(DaoError::TransactionFinished);
        }
        if let Err(err) = self.conn.execute_batch(sql) {
            // A failed COMMIT (e.g. SQLITE_BUSY) may keep the transaction open.
            if self.conn.is_autocommit() {
                self.state.set(TxState::RolledBack);
            }
            return Err(err.into());
        }
        self.state.set(next);
        Ok(())
    }
}

impl Transaction for SqliteTransaction {
    fn commit(&self) -> DaoResult<()> {
        self.finish("COMMIT;", TxState::Committed)
    }

    fn rollback(&self) -> DaoResult<()> {
        self.finish("ROLLBACK;", TxState::RolledBack)
    }
}

fn bootstrap_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("BEGIN;")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{sqlite_source, SqliteTransaction, MEMORY_PATH};
    use crate::dao::Transaction;
    use crate::error::DaoError;
    use crate::model::data_source::DataSource;

    #[test]
    fn begin_requires_path_param() {
        let err = SqliteTransaction::begin(&DataSource::new("db1"))
            .expect_err("missing path must fail");
        assert!(matches!(
            err,
            DaoError::MissingParameter { ref source, param: "path" } if source == "db1"
        ));
    }

    #[test]
    fn begin_opens_active_transaction() {
        let tx = SqliteTransaction::begin(&sqlite_source("db1", MEMORY_PATH))
            .expect("in-memory begin should succeed");
        assert!(tx.is_active());
        assert!(!tx.connection().is_autocommit());
        assert_eq!(tx.source_name(), "db1");
    }

    #[test]
    fn second_finish_reports_transaction_finished() {
        let tx = SqliteTransaction::begin(&sqlite_source("db1", MEMORY_PATH))
            .expect("in-memory begin should succeed");
        tx.commit().expect("first commit should succeed");
        assert!(!tx.is_active());

        assert!(matches!(tx.commit(), Err(DaoError::TransactionFinished)));
        assert!(matches!(tx.rollback(), Err(DaoError::TransactionFinished)));
    }

    #[test]
    fn rollback_discards_uncommitted_rows() {
        let tx = SqliteTransaction::begin(&sqlite_source("db1", MEMORY_PATH))
            .expect("in-memory begin should succeed");
        tx.connection()
            .execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1);")
            .expect("statements should run inside transaction");
        tx.rollback().expect("rollback should succeed");

        let exists: i64 = tx
            .connection()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 't');",
                [],
                |row| row.get(0),
            )
            .expect("schema query should succeed");
        assert_eq!(exists, 0);
    }

    #[test]
    fn transaction_ended_by_sqlite_counts_as_finished() {
        let tx = SqliteTransaction::begin(&sqlite_source("db1", MEMORY_PATH))
            .expect("in-memory begin should succeed");
        tx.connection()
            .execute_batch("CREATE TABLE k (id INTEGER PRIMARY KEY); INSERT INTO k VALUES (1);")
            .expect("statements should run inside transaction");
        tx.connection()
            .execute_batch("INSERT OR ROLLBACK INTO k VALUES (1);")
            .expect_err("duplicate key must abort the transaction");

        assert!(!tx.is_active());
        assert!(matches!(tx.commit(), Err(DaoError::TransactionFinished)));
        assert!(matches!(tx.rollback(), Err(DaoError::TransactionFinished)));
    }
}
