//! Outcome of one merge, reported per lineage.

use kvchain_core::entry::LogEntry;
use kvchain_core::errors::KvError;

/// A foreign entry that could not join the local log.
#[derive(Debug)]
pub struct LineageRejection {
    pub key: String,
    pub machine_id: String,
    pub entry_id: String,
    pub error: KvError,
}

/// What a merge admitted, skipped, and rejected.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Admitted entry ids, in admission order.
    pub admitted: Vec<String>,
    /// Candidates already present locally (or already superseded locally).
    pub skipped: usize,
    pub rejected: Vec<LineageRejection>,
    /// Deferral passes used.
    pub passes: usize,
}

impl MergeReport {
    /// Nothing was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Nothing was admitted; a repeated merge of the same log reports this.
    pub fn is_noop(&self) -> bool {
        self.admitted.is_empty() && self.rejected.is_empty()
    }

    /// Rejections whose predecessor never arrived.
    pub fn missing_predecessors(&self) -> impl Iterator<Item = &LineageRejection> {
        self.rejected
            .iter()
            .filter(|r| matches!(r.error, KvError::MissingChainPredecessor { .. }))
    }

    pub(crate) fn reject(&mut self, entry: &LogEntry, error: KvError) {
        tracing::warn!(
            entry_id = %entry.entry_id,
            key = %entry.key,
            machine_id = %entry.origin_machine,
            error = %error,
            "merge rejected entry"
        );
        self.rejected.push(LineageRejection {
            key: entry.key.clone(),
            machine_id: entry.origin_machine.clone(),
            entry_id: entry.entry_id.clone(),
            error,
        });
    }
}
