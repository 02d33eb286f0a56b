use chrono::{DateTime, Utc};

use crate::cursor::ReplicationCursor;
use crate::entry::LogEntry;
use crate::errors::KvResult;

/// Read access to a log: the query surface used by readers, merges, and peers.
///
/// "Live" entries are those not superseded by a chain extension. Superseded
/// entries stay retained (and known) until reclamation.
pub trait IReadOnlyLogStorage {
    /// A live entry with this id exists.
    fn has(&self, entry_id: &str) -> KvResult<bool>;
    /// This id was ever admitted and not yet reclaimed, live or superseded.
    fn is_known(&self, entry_id: &str) -> KvResult<bool>;
    /// Some retained entry names `entry_id` as its predecessor.
    fn has_successor(&self, entry_id: &str) -> KvResult<bool>;
    /// Live entry by id; `NotFound` when absent.
    fn get_by_entry_id(&self, entry_id: &str) -> KvResult<LogEntry>;
    /// Live entries for `key`, deleted and discarded ones included.
    fn get_by_key(&self, key: &str) -> KvResult<Vec<LogEntry>>;
    /// Live head of the (key, machine) lineage.
    fn head_for(&self, key: &str, machine_id: &str) -> KvResult<Option<LogEntry>>;
    fn all_entries(&self) -> KvResult<Vec<LogEntry>>;
    fn all_cursors(&self) -> KvResult<Vec<ReplicationCursor>>;
    fn cursor(&self, machine_id: &str) -> KvResult<Option<ReplicationCursor>>;
    /// Every retained entry, superseded included, in admission order.
    fn log_history(&self) -> KvResult<Vec<LogEntry>>;
    /// History entries past the given cursors. Machines without a cursor
    /// are transferred in full.
    fn log_history_since(&self, cursors: &[ReplicationCursor]) -> KvResult<Vec<LogEntry>>;
}

/// Transactional admission over a log.
pub trait ILogStorage: IReadOnlyLogStorage {
    /// Admit a new lineage head and upsert its machine's cursor, atomically.
    fn add(&self, entry: &LogEntry) -> KvResult<()>;
    /// Supersede `old_entry_id` with `new_entry` and upsert the cursor, atomically.
    fn replace(&self, old_entry_id: &str, new_entry: &LogEntry) -> KvResult<()>;
    /// Run `f` in a transaction scope. Nested calls open nested scopes; an
    /// error from `f` rolls back only the scope it was returned from.
    fn with_transaction(
        &self,
        f: &mut dyn FnMut(&dyn ILogStorage) -> KvResult<()>,
    ) -> KvResult<()>;
    /// Physically purge entries superseded before `before`. Live heads,
    /// tombstones included, are kept as the floor of their lineage.
    fn reclaim(&self, before: DateTime<Utc>) -> KvResult<usize>;
}
