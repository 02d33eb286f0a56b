//! Scoped, nestable transactions.
//!
//! The outermost scope is a `BEGIN IMMEDIATE` transaction so the write lock
//! is taken up front; nested scopes are savepoints. A scope commits when its
//! closure returns `Ok` and rolls back on `Err` or unwind. Rolling back a
//! nested scope leaves its siblings and the enclosing scope intact.

use rusqlite::Connection;

use kvchain_core::errors::KvResult;

use crate::sqlite_err;

/// Handle to an open transaction scope, valid only inside its closure.
pub struct TxScope<'c> {
    conn: &'c Connection,
    depth: u32,
}

impl<'c> TxScope<'c> {
    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    /// 0 for the outermost transaction.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Run `f` inside a savepoint nested in this scope.
    pub fn nested<T, F>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&TxScope<'_>) -> KvResult<T>,
    {
        let depth = self.depth + 1;
        self.conn
            .execute_batch(&format!("SAVEPOINT {}", savepoint_name(depth)))
            .map_err(|e| sqlite_err("savepoint", e))?;
        run_scope(self.conn, depth, f)
    }
}

/// Run `f` in a new outermost transaction on `conn`.
pub fn with_transaction<T, F>(conn: &Connection, f: F) -> KvResult<T>
where
    F: FnOnce(&TxScope<'_>) -> KvResult<T>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| sqlite_err("begin immediate", e))?;
    run_scope(conn, 0, f)
}

fn run_scope<T, F>(conn: &Connection, depth: u32, f: F) -> KvResult<T>
where
    F: FnOnce(&TxScope<'_>) -> KvResult<T>,
{
    let guard = ScopeGuard {
        conn,
        depth,
        finished: false,
    };
    let scope = TxScope { conn, depth };
    match f(&scope) {
        Ok(value) => {
            guard.commit()?;
            Ok(value)
        }
        Err(e) => {
            guard.rollback();
            Err(e)
        }
    }
}

fn savepoint_name(depth: u32) -> String {
    format!("kvchain_sp_{depth}")
}

/// Rolls the scope back on drop unless it was explicitly finished.
struct ScopeGuard<'c> {
    conn: &'c Connection,
    depth: u32,
    finished: bool,
}

impl ScopeGuard<'_> {
    fn commit(mut self) -> KvResult<()> {
        self.finished = true;
        let sql = if self.depth == 0 {
            "COMMIT".to_string()
        } else {
            format!("RELEASE {}", savepoint_name(self.depth))
        };
        if let Err(e) = self.conn.execute_batch(&sql) {
            self.undo();
            return Err(sqlite_err("commit", e));
        }
        Ok(())
    }

    fn rollback(mut self) {
        self.finished = true;
        self.undo();
    }

    fn undo(&self) {
        let sql = if self.depth == 0 {
            "ROLLBACK".to_string()
        } else {
            let name = savepoint_name(self.depth);
            format!("ROLLBACK TO {name}; RELEASE {name}")
        };
        if let Err(e) = self.conn.execute_batch(&sql) {
            // The caller already holds the error that triggered the rollback.
            tracing::warn!(depth = self.depth, error = %e, "rollback failed");
        }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.undo();
        }
    }
}
