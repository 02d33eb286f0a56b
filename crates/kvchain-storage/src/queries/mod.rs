//! SQL operations over log entries and replication cursors.

pub mod cursor_ops;
pub mod entry_ops;
pub mod maintenance;

use chrono::{DateTime, SecondsFormat, Utc};

use kvchain_core::errors::{KvError, KvResult, StorageError};

/// Fixed-width RFC 3339 so stored timestamps compare lexicographically.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(table: &str, raw: &str) -> KvResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            KvError::StorageError(StorageError::CorruptRow {
                table: table.to_string(),
                details: format!("bad timestamp {raw:?}: {e}"),
            })
        })
}
