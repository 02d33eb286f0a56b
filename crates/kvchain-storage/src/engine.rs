//! StorageEngine: owns the connection pool, runs migrations, and implements
//! the log storage traits over SQLite.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use kvchain_core::config::StorageConfig;
use kvchain_core::cursor::ReplicationCursor;
use kvchain_core::entry::LogEntry;
use kvchain_core::errors::{KvError, KvResult};
use kvchain_core::traits::{ILogStorage, IReadOnlyLogStorage};
use kvchain_core::value::{load_value, LogicalValue};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{cursor_ops, entry_ops, maintenance};
use crate::scoped::ScopedLog;
use crate::transaction::{with_transaction, TxScope};

/// The storage backend. Safe to share across threads.
pub struct StorageEngine {
    pool: ConnectionPool,
    config: StorageConfig,
}

impl StorageEngine {
    /// Open a file-backed engine at `path` with default settings.
    pub fn open(path: &Path) -> KvResult<Self> {
        let config = StorageConfig {
            db_path: path.display().to_string(),
            ..StorageConfig::default()
        };
        Self::open_with_config(&config)
    }

    /// Open the file-backed engine described by `config`.
    pub fn open_with_config(config: &StorageConfig) -> KvResult<Self> {
        let pool = ConnectionPool::open(Path::new(&config.db_path), config)?;
        let engine = Self {
            pool,
            config: config.clone(),
        };
        tracing::info!(db_path = %config.db_path, "opened storage engine");
        Ok(engine)
    }

    /// Open an in-memory engine. All reads go through the writer.
    pub fn open_in_memory() -> KvResult<Self> {
        let config = StorageConfig {
            db_path: ":memory:".to_string(),
            wal_mode: false,
            ..StorageConfig::default()
        };
        let pool = ConnectionPool::open_in_memory(&config)?;
        let engine = Self { pool, config };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> KvResult<()> {
        self.pool.writer.with_conn(migrations::run_migrations)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn is_in_memory(&self) -> bool {
        self.pool.db_path.is_none()
    }

    /// Run `f` in a new outermost transaction on the write connection.
    pub fn with_write_scope<T, F>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&TxScope<'_>) -> KvResult<T>,
    {
        self.pool.writer.with_conn(|conn| with_transaction(conn, f))
    }

    /// Read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&Connection) -> KvResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }

    /// The key as seen by `machine_id`.
    pub fn load(&self, key: &str, machine_id: &str) -> KvResult<LogicalValue> {
        load_value(self, key, machine_id)
    }

    /// Retained rows, live and superseded.
    pub fn retained_count(&self) -> KvResult<usize> {
        self.with_reader(maintenance::retained_count)
    }
}

impl IReadOnlyLogStorage for StorageEngine {
    fn has(&self, entry_id: &str) -> KvResult<bool> {
        self.with_reader(|conn| entry_ops::has_live(conn, entry_id))
    }

    fn is_known(&self, entry_id: &str) -> KvResult<bool> {
        self.with_reader(|conn| entry_ops::is_known(conn, entry_id))
    }

    fn has_successor(&self, entry_id: &str) -> KvResult<bool> {
        self.with_reader(|conn| entry_ops::has_successor(conn, entry_id))
    }

    fn get_by_entry_id(&self, entry_id: &str) -> KvResult<LogEntry> {
        self.with_reader(|conn| entry_ops::get_live(conn, entry_id))?
            .ok_or_else(|| KvError::NotFound {
                entry_id: entry_id.to_string(),
            })
    }

    fn get_by_key(&self, key: &str) -> KvResult<Vec<LogEntry>> {
        self.with_reader(|conn| entry_ops::get_by_key(conn, key))
    }

    fn head_for(&self, key: &str, machine_id: &str) -> KvResult<Option<LogEntry>> {
        self.with_reader(|conn| entry_ops::head_for(conn, key, machine_id))
    }

    fn all_entries(&self) -> KvResult<Vec<LogEntry>> {
        self.with_reader(entry_ops::all_live)
    }

    fn all_cursors(&self) -> KvResult<Vec<ReplicationCursor>> {
        self.with_reader(cursor_ops::all_cursors)
    }

    fn cursor(&self, machine_id: &str) -> KvResult<Option<ReplicationCursor>> {
        self.with_reader(|conn| cursor_ops::get_cursor(conn, machine_id))
    }

    fn log_history(&self) -> KvResult<Vec<LogEntry>> {
        self.with_reader(entry_ops::history)
    }

    fn log_history_since(&self, cursors: &[ReplicationCursor]) -> KvResult<Vec<LogEntry>> {
        self.with_reader(|conn| entry_ops::history_since(conn, cursors))
    }
}

impl ILogStorage for StorageEngine {
    fn add(&self, entry: &LogEntry) -> KvResult<()> {
        self.with_write_scope(|tx| entry_ops::admit(tx.conn(), entry))
    }

    fn replace(&self, old_entry_id: &str, new_entry: &LogEntry) -> KvResult<()> {
        self.with_write_scope(|tx| entry_ops::supersede(tx.conn(), old_entry_id, new_entry))
    }

    fn with_transaction(
        &self,
        f: &mut dyn FnMut(&dyn ILogStorage) -> KvResult<()>,
    ) -> KvResult<()> {
        self.with_write_scope(|tx| f(&ScopedLog::new(tx)))
    }

    fn reclaim(&self, before: DateTime<Utc>) -> KvResult<usize> {
        self.with_write_scope(|tx| maintenance::reclaim(tx.conn(), before))
    }
}
