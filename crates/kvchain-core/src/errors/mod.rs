//! Error taxonomy for the replicated log.

pub mod config_error;
pub mod kv_error;
pub mod merge_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use kv_error::KvError;
pub use merge_error::MergeError;
pub use storage_error::StorageError;

/// Result alias used across the workspace.
pub type KvResult<T> = Result<T, KvError>;
