//! v001: log entries and replication cursors.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS log_entries (
    seq                    INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id               TEXT NOT NULL UNIQUE,
    previous_entry_id      TEXT,
    key                    TEXT NOT NULL,
    value                  TEXT NOT NULL,
    origin_machine         TEXT NOT NULL,
    previous_machine       TEXT,
    log_offset             INTEGER NOT NULL,
    chain_number           INTEGER NOT NULL,
    previous_chain_number  INTEGER NOT NULL,
    change_tally           TEXT NOT NULL DEFAULT '{}',
    deleted                INTEGER NOT NULL DEFAULT 0,
    discarded              INTEGER NOT NULL DEFAULT 0,
    created_at             TEXT NOT NULL,
    admitted_at            TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    removed_at             TEXT
);

CREATE INDEX IF NOT EXISTS idx_log_entries_key ON log_entries(key);
CREATE INDEX IF NOT EXISTS idx_log_entries_previous ON log_entries(previous_entry_id);
CREATE INDEX IF NOT EXISTS idx_log_entries_lineage ON log_entries(key, origin_machine);
CREATE INDEX IF NOT EXISTS idx_log_entries_removed ON log_entries(removed_at);

CREATE TABLE IF NOT EXISTS replication_cursors (
    machine_id    TEXT PRIMARY KEY,
    log_offset    INTEGER NOT NULL,
    chain_number  INTEGER NOT NULL,
    entry_id      TEXT NOT NULL,
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";
