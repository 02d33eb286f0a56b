//! Insert, supersede, and lookup of log entries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use kvchain_core::cursor::ReplicationCursor;
use kvchain_core::entry::LogEntry;
use kvchain_core::errors::{KvError, KvResult, MergeError};
use kvchain_core::tally::ChangeTally;

use super::cursor_ops::upsert_cursor;
use super::{format_ts, parse_ts};
use crate::sqlite_err;

const ENTRY_COLUMNS: &str = "entry_id, previous_entry_id, key, value, origin_machine,
    previous_machine, log_offset, chain_number, previous_chain_number,
    change_tally, deleted, discarded, created_at";

/// Admit the root of a new lineage and advance its machine's cursor.
/// Must run inside a transaction scope.
///
/// A (key, origin machine) pair has at most one live head: a root for a
/// lineage that already has one is `DivergentLineage`, and an entry with a
/// predecessor must go through [`supersede`].
pub fn admit(conn: &Connection, entry: &LogEntry) -> KvResult<()> {
    if is_known(conn, &entry.entry_id)? {
        return Err(KvError::DuplicateEntry {
            entry_id: entry.entry_id.clone(),
        });
    }
    if let Some(previous_entry_id) = &entry.previous_entry_id {
        return Err(KvError::ChainLinkMismatch {
            old_entry_id: previous_entry_id.clone(),
            entry_id: entry.entry_id.clone(),
            reason: "only a lineage root can be added; extensions replace their predecessor"
                .to_string(),
        });
    }
    if let Some(head) = head_for(conn, &entry.key, &entry.origin_machine)? {
        return Err(MergeError::DivergentLineage {
            key: entry.key.clone(),
            machine_id: entry.origin_machine.clone(),
            head_entry_id: head.entry_id,
            entry_id: entry.entry_id.clone(),
        }
        .into());
    }
    insert_entry(conn, entry)?;
    upsert_cursor(conn, &ReplicationCursor::at(entry))?;
    tracing::debug!(
        entry_id = %entry.entry_id,
        key = %entry.key,
        machine_id = %entry.origin_machine,
        chain_number = entry.chain_number,
        "admitted entry"
    );
    Ok(())
}

/// Supersede the live head `old_entry_id` with `new_entry` and advance the cursor.
/// Must run inside a transaction scope.
pub fn supersede(conn: &Connection, old_entry_id: &str, new_entry: &LogEntry) -> KvResult<()> {
    let old = get_live(conn, old_entry_id)?.ok_or_else(|| KvError::NotFound {
        entry_id: old_entry_id.to_string(),
    })?;
    if is_known(conn, &new_entry.entry_id)? {
        return Err(KvError::DuplicateEntry {
            entry_id: new_entry.entry_id.clone(),
        });
    }
    new_entry.check_extends(&old)?;

    mark_removed(conn, old_entry_id)?;
    insert_entry(conn, new_entry)?;
    upsert_cursor(conn, &ReplicationCursor::at(new_entry))?;
    tracing::debug!(
        old_entry_id = %old_entry_id,
        entry_id = %new_entry.entry_id,
        key = %new_entry.key,
        machine_id = %new_entry.origin_machine,
        chain_number = new_entry.chain_number,
        "extended lineage"
    );
    Ok(())
}

fn insert_entry(conn: &Connection, entry: &LogEntry) -> KvResult<()> {
    conn.execute(
        "INSERT INTO log_entries (
            entry_id, previous_entry_id, key, value, origin_machine,
            previous_machine, log_offset, chain_number, previous_chain_number,
            change_tally, deleted, discarded, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            entry.entry_id,
            entry.previous_entry_id,
            entry.key,
            entry.value,
            entry.origin_machine,
            entry.previous_machine,
            entry.log_offset,
            entry.chain_number,
            entry.previous_chain_number,
            entry.change_tally.to_json()?,
            entry.deleted,
            entry.discarded,
            format_ts(&entry.created_at),
        ],
    )
    .map_err(|e| sqlite_err("insert entry", e))?;
    Ok(())
}

fn mark_removed(conn: &Connection, entry_id: &str) -> KvResult<()> {
    conn.execute(
        "UPDATE log_entries SET removed_at = ?2 WHERE entry_id = ?1 AND removed_at IS NULL",
        params![entry_id, format_ts(&Utc::now())],
    )
    .map_err(|e| sqlite_err("remove entry", e))?;
    Ok(())
}

pub fn has_live(conn: &Connection, entry_id: &str) -> KvResult<bool> {
    exists(
        conn,
        "SELECT 1 FROM log_entries WHERE entry_id = ?1 AND removed_at IS NULL",
        entry_id,
    )
}

pub fn is_known(conn: &Connection, entry_id: &str) -> KvResult<bool> {
    exists(conn, "SELECT 1 FROM log_entries WHERE entry_id = ?1", entry_id)
}

pub fn has_successor(conn: &Connection, entry_id: &str) -> KvResult<bool> {
    exists(
        conn,
        "SELECT 1 FROM log_entries WHERE previous_entry_id = ?1 LIMIT 1",
        entry_id,
    )
}

fn exists(conn: &Connection, sql: &str, param: &str) -> KvResult<bool> {
    let found = conn
        .query_row(sql, params![param], |_| Ok(()))
        .optional()
        .map_err(|e| sqlite_err("existence check", e))?;
    Ok(found.is_some())
}

pub fn get_live(conn: &Connection, entry_id: &str) -> KvResult<Option<LogEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM log_entries WHERE entry_id = ?1 AND removed_at IS NULL"
    );
    let raw = conn
        .query_row(&sql, params![entry_id], RawEntry::from_row)
        .optional()
        .map_err(|e| sqlite_err("get entry", e))?;
    raw.map(RawEntry::into_entry).transpose()
}

pub fn get_by_key(conn: &Connection, key: &str) -> KvResult<Vec<LogEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM log_entries
         WHERE key = ?1 AND removed_at IS NULL ORDER BY seq"
    );
    query_entries(conn, &sql, params![key])
}

pub fn head_for(conn: &Connection, key: &str, machine_id: &str) -> KvResult<Option<LogEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM log_entries
         WHERE key = ?1 AND origin_machine = ?2 AND removed_at IS NULL
         ORDER BY seq DESC LIMIT 1"
    );
    Ok(query_entries(conn, &sql, params![key, machine_id])?.pop())
}

pub fn all_live(conn: &Connection) -> KvResult<Vec<LogEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM log_entries WHERE removed_at IS NULL ORDER BY seq");
    query_entries(conn, &sql, [])
}

/// Every retained row in admission order.
pub fn history(conn: &Connection) -> KvResult<Vec<LogEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM log_entries ORDER BY seq");
    query_entries(conn, &sql, [])
}

/// History rows past the given cursors, in admission order. Machines
/// without a cursor are returned in full.
pub fn history_since(
    conn: &Connection,
    cursors: &[ReplicationCursor],
) -> KvResult<Vec<LogEntry>> {
    if cursors.is_empty() {
        return history(conn);
    }
    let predicate = (0..cursors.len())
        .map(|i| {
            format!(
                "(origin_machine != ?{} OR chain_number > ?{})",
                2 * i + 1,
                2 * i + 2
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ");
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM log_entries WHERE {predicate} ORDER BY seq");

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(cursors.len() * 2);
    for cursor in cursors {
        params.push(&cursor.machine_id);
        params.push(&cursor.chain_number);
    }
    query_entries(conn, &sql, params.as_slice())
}

fn query_entries<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> KvResult<Vec<LogEntry>> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| sqlite_err("prepare entry query", e))?;
    let rows = stmt
        .query_map(params, RawEntry::from_row)
        .map_err(|e| sqlite_err("query entries", e))?;
    let mut entries = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| sqlite_err("read entry row", e))?;
        entries.push(raw.into_entry()?);
    }
    Ok(entries)
}

/// Row as stored; decoded into a `LogEntry` outside the rusqlite callback
/// so tally and timestamp failures surface as `KvError`.
struct RawEntry {
    entry_id: String,
    previous_entry_id: Option<String>,
    key: String,
    value: String,
    origin_machine: String,
    previous_machine: Option<String>,
    log_offset: i64,
    chain_number: i64,
    previous_chain_number: i64,
    change_tally: String,
    deleted: bool,
    discarded: bool,
    created_at: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            entry_id: row.get(0)?,
            previous_entry_id: row.get(1)?,
            key: row.get(2)?,
            value: row.get(3)?,
            origin_machine: row.get(4)?,
            previous_machine: row.get(5)?,
            log_offset: row.get(6)?,
            chain_number: row.get(7)?,
            previous_chain_number: row.get(8)?,
            change_tally: row.get(9)?,
            deleted: row.get(10)?,
            discarded: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    fn into_entry(self) -> KvResult<LogEntry> {
        Ok(LogEntry {
            change_tally: ChangeTally::from_json(&self.change_tally)?,
            created_at: parse_ts("log_entries", &self.created_at)?,
            entry_id: self.entry_id,
            previous_entry_id: self.previous_entry_id,
            key: self.key,
            value: self.value,
            origin_machine: self.origin_machine,
            previous_machine: self.previous_machine,
            log_offset: self.log_offset,
            chain_number: self.chain_number,
            previous_chain_number: self.previous_chain_number,
            deleted: self.deleted,
            discarded: self.discarded,
        })
    }
}
