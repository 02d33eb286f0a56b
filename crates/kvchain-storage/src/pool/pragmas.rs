//! PRAGMA configuration applied to every SQLite connection.

use rusqlite::Connection;

use kvchain_core::config::StorageConfig;
use kvchain_core::errors::KvResult;

use crate::sqlite_err;

/// Apply write-side pragmas derived from `config`.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> KvResult<()> {
    let journal_mode = if config.wal_mode { "WAL" } else { "DELETE" };
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {journal_mode};
        PRAGMA synchronous = NORMAL;
        PRAGMA mmap_size = {mmap};
        PRAGMA cache_size = {cache};
        PRAGMA busy_timeout = {busy};
        PRAGMA foreign_keys = ON;
        ",
        mmap = config.mmap_size,
        cache = config.cache_size,
        busy = config.busy_timeout_ms,
    ))
    .map_err(|e| sqlite_err("apply pragmas", e))
}

/// Apply read-only pragmas to a read connection.
/// Skips write-side settings (journal_mode, synchronous).
pub fn apply_read_pragmas(conn: &Connection, config: &StorageConfig) -> KvResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA query_only = ON;
        PRAGMA mmap_size = {mmap};
        PRAGMA cache_size = {cache};
        PRAGMA busy_timeout = {busy};
        PRAGMA temp_store = MEMORY;
        ",
        mmap = config.mmap_size,
        cache = config.cache_size,
        busy = config.busy_timeout_ms,
    ))
    .map_err(|e| sqlite_err("apply read pragmas", e))
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> KvResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| sqlite_err("read journal_mode", e))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
