use super::{ConfigError, MergeError, StorageError};

/// Top-level error for every log, reader, and merge operation.
///
/// Domain variants carry enough context (entry id, key, machine id) for the
/// caller to retry or report. Backend failures are wrapped in [`StorageError`].
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("duplicate entry: {entry_id} is already admitted")]
    DuplicateEntry { entry_id: String },

    #[error("entry not found: {entry_id}")]
    NotFound { entry_id: String },

    #[error("no main version for key {key:?} on machine {machine_id}")]
    NoMainVersion { key: String, machine_id: String },

    #[error(
        "missing chain predecessor for entry {entry_id} (key {key:?}, machine {machine_id}): \
         {previous_entry_id} was never admitted"
    )]
    MissingChainPredecessor {
        entry_id: String,
        previous_entry_id: String,
        key: String,
        machine_id: String,
    },

    #[error("chain link mismatch extending {old_entry_id} with {entry_id}: {reason}")]
    ChainLinkMismatch {
        old_entry_id: String,
        entry_id: String,
        reason: String,
    },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("merge error: {0}")]
    MergeError(#[from] MergeError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl KvError {
    /// Backend busy/timeout; the caller may retry the whole call.
    pub fn is_transient(&self) -> bool {
        matches!(self, KvError::StorageError(StorageError::Busy { .. }))
    }

    /// A `NotFound` from a chain extension: the head moved, re-read and retry.
    pub fn is_stale_head(&self) -> bool {
        matches!(self, KvError::NotFound { .. })
    }
}

impl From<serde_json::Error> for KvError {
    fn from(e: serde_json::Error) -> Self {
        KvError::SerializationError(e.to_string())
    }
}
