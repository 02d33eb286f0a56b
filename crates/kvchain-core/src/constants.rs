/// Initial `log_offset` of a machine's log stream; the header precedes the first record.
pub const LOG_HEADER_SIZE: i64 = 32;

/// Chain number recorded as the predecessor of a lineage root.
pub const ROOT_CHAIN_NUMBER: i64 = 0;

/// Marker printed after the main value when unresolved branches exist.
pub const BRANCH_MARKER: &str = "(*)";

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "KVCHAIN_LOG";

/// Environment variable overriding `storage.db_path`.
pub const DB_PATH_ENV_VAR: &str = "KVCHAIN_DB_PATH";

/// Environment variable overriding `replica.machine_id`.
pub const MACHINE_ID_ENV_VAR: &str = "KVCHAIN_MACHINE_ID";

/// Default database file name.
pub const DEFAULT_DB_FILENAME: &str = "kvchain.db";

/// Maximum number of read connections in the pool.
pub const MAX_READ_POOL_SIZE: usize = 8;
