//! Pool of read connections (concurrent, never blocked by the writer via WAL).

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use kvchain_core::config::StorageConfig;
use kvchain_core::constants::MAX_READ_POOL_SIZE;
use kvchain_core::errors::KvResult;

use super::pragmas::apply_read_pragmas;
use crate::sqlite_err;

/// A round-robin pool of read-only SQLite connections.
pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &Path, config: &StorageConfig) -> KvResult<Self> {
        let size = config.read_pool_size.clamp(1, MAX_READ_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| sqlite_err("open read connection", e))?;
            apply_read_pragmas(&conn, config)?;
            connections.push(Mutex::new(conn));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Execute a closure with the next read connection.
    pub fn with_conn<F, T>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&Connection) -> KvResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let slot = &self.connections[idx];
        // Read connections hold no transaction state, so a poisoned slot is reusable.
        let guard = slot.lock().unwrap_or_else(|poisoned| {
            slot.clear_poison();
            poisoned.into_inner()
        });
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}
