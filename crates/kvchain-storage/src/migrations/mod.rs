//! Schema migrations using PRAGMA user_version.

pub mod v001_initial_schema;

use rusqlite::Connection;

use kvchain_core::errors::{KvError, KvResult, StorageError};

const MIGRATIONS: &[(&str, u32)] = &[(v001_initial_schema::MIGRATION_SQL, 1)];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> KvResult<()> {
    let current = current_version(conn)?;

    for (sql, version) in MIGRATIONS {
        if current < *version {
            conn.execute_batch(sql).map_err(|e| migration_err(*version, e))?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| migration_err(*version, e))?;
            tracing::info!(version = version, "applied migration");
        }
    }
    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> KvResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| migration_err(0, e))
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|(_, v)| *v).unwrap_or(0)
}

fn migration_err(version: u32, e: rusqlite::Error) -> KvError {
    KvError::StorageError(StorageError::MigrationFailed {
        version,
        reason: e.to_string(),
    })
}
