use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DB_FILENAME;

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Enable WAL journal mode.
    pub wal_mode: bool,
    /// Busy timeout in milliseconds. Expiry surfaces as a transient error.
    pub busy_timeout_ms: u32,
    /// Page cache size (negative = KB).
    pub cache_size: i64,
    /// Memory-mapped I/O size in bytes.
    pub mmap_size: u64,
    /// Number of read connections in the pool.
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_FILENAME.to_string(),
            wal_mode: true,
            busy_timeout_ms: 5000,
            cache_size: -16000,
            mmap_size: 64 * 1024 * 1024,
            read_pool_size: 4,
        }
    }
}
