//! Single write connection behind a mutex. Writes are serialized.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use kvchain_core::config::StorageConfig;
use kvchain_core::errors::KvResult;

use super::pragmas::apply_pragmas;
use crate::sqlite_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, config: &StorageConfig) -> KvResult<Self> {
        let conn = Connection::open(path).map_err(|e| sqlite_err("open write connection", e))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> KvResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| sqlite_err("open in-memory connection", e))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    ///
    /// A panic inside a previous closure poisons the lock. Scope guards have
    /// already rolled back by then, so the lock is recovered; a transaction
    /// left open outside any scope is rolled back before reuse.
    pub fn with_conn<F, T>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&Connection) -> KvResult<T>,
    {
        let guard = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.conn.clear_poison();
                let guard = poisoned.into_inner();
                tracing::warn!("write connection recovered after a panic");
                if !guard.is_autocommit() {
                    guard
                        .execute_batch("ROLLBACK")
                        .map_err(|e| sqlite_err("rollback abandoned transaction", e))?;
                }
                guard
            }
        };
        f(&guard)
    }
}
