//! # kvchain-storage
//!
//! SQLite backend for the replicated log. One serialized write connection
//! admits entries inside `BEGIN IMMEDIATE` transactions (nested scopes use
//! savepoints); file-backed databases serve reads from a WAL read pool.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod scoped;
pub mod transaction;

pub use engine::StorageEngine;
pub use scoped::ScopedLog;
pub use transaction::{with_transaction, TxScope};

use kvchain_core::errors::{KvError, StorageError};

/// Wrap a message as a generic SQLite storage error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> KvError {
    KvError::StorageError(StorageError::SqliteError {
        message: message.into(),
    })
}

/// Map a rusqlite error, classifying busy/locked as transient.
pub(crate) fn sqlite_err(context: &str, e: rusqlite::Error) -> KvError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = e {
        if matches!(
            failure.code,
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        ) {
            return KvError::StorageError(StorageError::Busy {
                message: format!("{context}: {e}"),
            });
        }
    }
    to_storage_err(format!("{context}: {e}"))
}
