//! Log view bound to an open transaction scope.

use chrono::{DateTime, Utc};

use kvchain_core::cursor::ReplicationCursor;
use kvchain_core::entry::LogEntry;
use kvchain_core::errors::{KvError, KvResult};
use kvchain_core::traits::{ILogStorage, IReadOnlyLogStorage};

use crate::queries::{cursor_ops, entry_ops, maintenance};
use crate::transaction::TxScope;

/// Reads see the scope's uncommitted writes; every write opens a nested
/// savepoint so a failed admission leaves the enclosing scope untouched.
pub struct ScopedLog<'s, 'c> {
    scope: &'s TxScope<'c>,
}

impl<'s, 'c> ScopedLog<'s, 'c> {
    pub fn new(scope: &'s TxScope<'c>) -> Self {
        Self { scope }
    }
}

impl IReadOnlyLogStorage for ScopedLog<'_, '_> {
    fn has(&self, entry_id: &str) -> KvResult<bool> {
        entry_ops::has_live(self.scope.conn(), entry_id)
    }

    fn is_known(&self, entry_id: &str) -> KvResult<bool> {
        entry_ops::is_known(self.scope.conn(), entry_id)
    }

    fn has_successor(&self, entry_id: &str) -> KvResult<bool> {
        entry_ops::has_successor(self.scope.conn(), entry_id)
    }

    fn get_by_entry_id(&self, entry_id: &str) -> KvResult<LogEntry> {
        entry_ops::get_live(self.scope.conn(), entry_id)?.ok_or_else(|| KvError::NotFound {
            entry_id: entry_id.to_string(),
        })
    }

    fn get_by_key(&self, key: &str) -> KvResult<Vec<LogEntry>> {
        entry_ops::get_by_key(self.scope.conn(), key)
    }

    fn head_for(&self, key: &str, machine_id: &str) -> KvResult<Option<LogEntry>> {
        entry_ops::head_for(self.scope.conn(), key, machine_id)
    }

    fn all_entries(&self) -> KvResult<Vec<LogEntry>> {
        entry_ops::all_live(self.scope.conn())
    }

    fn all_cursors(&self) -> KvResult<Vec<ReplicationCursor>> {
        cursor_ops::all_cursors(self.scope.conn())
    }

    fn cursor(&self, machine_id: &str) -> KvResult<Option<ReplicationCursor>> {
        cursor_ops::get_cursor(self.scope.conn(), machine_id)
    }

    fn log_history(&self) -> KvResult<Vec<LogEntry>> {
        entry_ops::history(self.scope.conn())
    }

    fn log_history_since(&self, cursors: &[ReplicationCursor]) -> KvResult<Vec<LogEntry>> {
        entry_ops::history_since(self.scope.conn(), cursors)
    }
}

impl ILogStorage for ScopedLog<'_, '_> {
    fn add(&self, entry: &LogEntry) -> KvResult<()> {
        self.scope.nested(|tx| entry_ops::admit(tx.conn(), entry))
    }

    fn replace(&self, old_entry_id: &str, new_entry: &LogEntry) -> KvResult<()> {
        self.scope
            .nested(|tx| entry_ops::supersede(tx.conn(), old_entry_id, new_entry))
    }

    fn with_transaction(
        &self,
        f: &mut dyn FnMut(&dyn ILogStorage) -> KvResult<()>,
    ) -> KvResult<()> {
        self.scope.nested(|tx| f(&ScopedLog::new(tx)))
    }

    fn reclaim(&self, before: DateTime<Utc>) -> KvResult<usize> {
        self.scope.nested(|tx| maintenance::reclaim(tx.conn(), before))
    }
}
