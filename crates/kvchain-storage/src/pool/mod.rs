//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use kvchain_core::config::StorageConfig;
use kvchain_core::errors::KvResult;

use crate::migrations;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// The single write connection plus, for file-backed databases, a read pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` in memory: a second in-memory connection would be a separate database.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open the writer, migrate, then open the read pool for the given database file.
    pub fn open(path: &Path, config: &StorageConfig) -> KvResult<Self> {
        let writer = WriteConnection::open(path, config)?;
        writer.with_conn(migrations::run_migrations)?;
        let readers = ReadPool::open(path, config)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> KvResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory(config)?,
            readers: None,
            db_path: None,
        })
    }
}
