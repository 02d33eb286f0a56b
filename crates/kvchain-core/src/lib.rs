//! # kvchain-core
//!
//! Foundation crate for the kvchain replicated key-value log.
//! Defines the log entry model, replication cursors, the multi-version
//! reader, the storage traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod cursor;
pub mod entry;
pub mod errors;
pub mod tally;
pub mod traits;
pub mod tracing;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use config::KvConfig;
pub use cursor::ReplicationCursor;
pub use entry::LogEntry;
pub use errors::{KvError, KvResult};
pub use tally::ChangeTally;
pub use traits::{ILogStorage, IReadOnlyLogStorage};
pub use value::LogicalValue;
