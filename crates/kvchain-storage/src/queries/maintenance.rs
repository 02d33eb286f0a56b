//! Reclamation of superseded entries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use kvchain_core::errors::KvResult;

use super::format_ts;
use crate::sqlite_err;

/// Physically delete superseded rows removed before `before`.
///
/// Live heads are never purged, deleted and discarded ones included: a
/// tombstone is the floor of its lineage, and without it an older entry
/// still held by a peer would be admitted again as a fresh root.
pub fn reclaim(conn: &Connection, before: DateTime<Utc>) -> KvResult<usize> {
    let cutoff = format_ts(&before);
    let purged = conn
        .execute(
            "DELETE FROM log_entries WHERE removed_at IS NOT NULL AND removed_at < ?1",
            params![cutoff],
        )
        .map_err(|e| sqlite_err("reclaim entries", e))?;
    tracing::info!(purged, cutoff = %cutoff, "reclaimed superseded entries");
    Ok(purged)
}

/// Count of retained rows, live and superseded.
pub fn retained_count(conn: &Connection) -> KvResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM log_entries", [], |row| row.get(0))
        .map_err(|e| sqlite_err("count entries", e))?;
    Ok(count as usize)
}
