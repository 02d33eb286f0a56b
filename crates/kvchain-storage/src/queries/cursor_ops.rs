//! Replication cursor upsert and lookup.

use rusqlite::{params, Connection, OptionalExtension, Row};

use kvchain_core::cursor::ReplicationCursor;
use kvchain_core::errors::KvResult;

use crate::sqlite_err;

/// Create the machine's cursor or advance it. A cursor never moves back to
/// a lower chain number.
pub fn upsert_cursor(conn: &Connection, cursor: &ReplicationCursor) -> KvResult<()> {
    conn.execute(
        "INSERT INTO replication_cursors (machine_id, log_offset, chain_number, entry_id)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(machine_id) DO UPDATE SET
            log_offset = excluded.log_offset,
            chain_number = excluded.chain_number,
            entry_id = excluded.entry_id,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE excluded.chain_number >= replication_cursors.chain_number",
        params![
            cursor.machine_id,
            cursor.log_offset,
            cursor.chain_number,
            cursor.entry_id
        ],
    )
    .map_err(|e| sqlite_err("upsert cursor", e))?;
    Ok(())
}

pub fn get_cursor(conn: &Connection, machine_id: &str) -> KvResult<Option<ReplicationCursor>> {
    conn.query_row(
        "SELECT machine_id, log_offset, chain_number, entry_id
         FROM replication_cursors WHERE machine_id = ?1",
        params![machine_id],
        row_to_cursor,
    )
    .optional()
    .map_err(|e| sqlite_err("get cursor", e))
}

pub fn all_cursors(conn: &Connection) -> KvResult<Vec<ReplicationCursor>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT machine_id, log_offset, chain_number, entry_id
             FROM replication_cursors ORDER BY machine_id",
        )
        .map_err(|e| sqlite_err("prepare cursor query", e))?;
    let rows = stmt
        .query_map([], row_to_cursor)
        .map_err(|e| sqlite_err("query cursors", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| sqlite_err("read cursor row", e))
}

fn row_to_cursor(row: &Row<'_>) -> rusqlite::Result<ReplicationCursor> {
    Ok(ReplicationCursor {
        machine_id: row.get(0)?,
        log_offset: row.get(1)?,
        chain_number: row.get(2)?,
        entry_id: row.get(3)?,
    })
}
