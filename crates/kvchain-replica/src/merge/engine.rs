//! Merge orchestrator: imports a foreign log into the local one.
//!
//! Candidates are taken from the remote history in admission order and
//! classified against the local log:
//! - extension of a live local head → `replace`
//! - lineage root with no local head for its (key, machine) → `add`
//! - predecessor not yet present → deferred to the next pass
//! - anything else → rejected for that lineage
//!
//! The merge runs in one outer transaction and each admission in its own
//! nested scope, so a rejected lineage never rolls back its siblings. Only
//! backend failures abort (and roll back) the whole merge.

use std::collections::HashSet;

use kvchain_core::config::ReplicaConfig;
use kvchain_core::entry::LogEntry;
use kvchain_core::errors::{KvError, KvResult, MergeError};
use kvchain_core::traits::{ILogStorage, IReadOnlyLogStorage};

use super::report::MergeReport;

enum Admission {
    Extend(String),
    Root,
    Defer,
    Reject(KvError),
}

/// Stateless apart from its pass limit.
pub struct MergeEngine {
    max_passes: usize,
}

impl MergeEngine {
    pub fn new(max_passes: usize) -> Self {
        Self {
            max_passes: max_passes.max(1),
        }
    }

    pub fn from_config(config: &ReplicaConfig) -> Self {
        Self::new(config.max_merge_passes)
    }

    /// Merge the full history of `remote` into `local`.
    pub fn merge(
        &self,
        local: &dyn ILogStorage,
        remote: &dyn IReadOnlyLogStorage,
    ) -> KvResult<MergeReport> {
        let candidates = remote.log_history()?;
        self.merge_entries(local, candidates)
    }

    /// Merge only remote entries past `local`'s cursors.
    ///
    /// Cursors only advance, so an entry of a machine that was rejected while
    /// a later one from the same machine was admitted is not retried here; a
    /// full [`MergeEngine::merge`] picks it up.
    pub fn merge_incremental(
        &self,
        local: &dyn ILogStorage,
        remote: &dyn IReadOnlyLogStorage,
    ) -> KvResult<MergeReport> {
        let cursors = local.all_cursors()?;
        let candidates = remote.log_history_since(&cursors)?;
        self.merge_entries(local, candidates)
    }

    /// Merge an already transferred entry set into `local`.
    pub fn merge_entries(
        &self,
        local: &dyn ILogStorage,
        candidates: Vec<LogEntry>,
    ) -> KvResult<MergeReport> {
        let mut report = MergeReport::default();
        local.with_transaction(&mut |tx: &dyn ILogStorage| {
            report = self.run(tx, &candidates)?;
            Ok(())
        })?;
        tracing::info!(
            admitted = report.admitted.len(),
            skipped = report.skipped,
            rejected = report.rejected.len(),
            passes = report.passes,
            "merge finished"
        );
        Ok(report)
    }

    fn run(&self, tx: &dyn ILogStorage, candidates: &[LogEntry]) -> KvResult<MergeReport> {
        let mut report = MergeReport::default();
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for entry in candidates {
            if !seen.insert(entry.entry_id.as_str()) {
                continue;
            }
            if tx.is_known(&entry.entry_id)? || tx.has_successor(&entry.entry_id)? {
                report.skipped += 1;
                continue;
            }
            pending.push(entry);
        }

        while !pending.is_empty() && report.passes < self.max_passes {
            report.passes += 1;
            let before = pending.len();
            let mut deferred = Vec::new();

            for entry in pending {
                let outcome = match classify(tx, entry)? {
                    Admission::Extend(old_entry_id) => tx.replace(&old_entry_id, entry),
                    Admission::Root => tx.add(entry),
                    Admission::Defer => {
                        deferred.push(entry);
                        continue;
                    }
                    Admission::Reject(error) => Err(error),
                };
                match outcome {
                    Ok(()) => report.admitted.push(entry.entry_id.clone()),
                    Err(error) if is_lineage_error(&error) => report.reject(entry, error),
                    Err(error) => return Err(error),
                }
            }

            let progressed = deferred.len() < before;
            pending = deferred;
            if !progressed {
                break;
            }
        }

        for entry in pending {
            report.reject(entry, missing_predecessor(entry));
        }
        Ok(report)
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::from_config(&ReplicaConfig::default())
    }
}

fn classify(tx: &dyn ILogStorage, entry: &LogEntry) -> KvResult<Admission> {
    let Some(previous_entry_id) = entry.previous_entry_id.as_deref() else {
        return Ok(match tx.head_for(&entry.key, &entry.origin_machine)? {
            Some(head) => Admission::Reject(divergent(entry, &head)),
            None => Admission::Root,
        });
    };

    if tx.has(previous_entry_id)? {
        let predecessor = tx.get_by_entry_id(previous_entry_id)?;
        // Taking over another machine's head must not create a second head
        // for the incoming machine's own lineage.
        if predecessor.origin_machine != entry.origin_machine {
            if let Some(head) = tx.head_for(&entry.key, &entry.origin_machine)? {
                return Ok(Admission::Reject(divergent(entry, &head)));
            }
        }
        return Ok(Admission::Extend(previous_entry_id.to_string()));
    }

    if tx.is_known(previous_entry_id)? {
        return Ok(Admission::Reject(
            MergeError::ForkedLineage {
                entry_id: entry.entry_id.clone(),
                previous_entry_id: previous_entry_id.to_string(),
            }
            .into(),
        ));
    }

    Ok(Admission::Defer)
}

fn divergent(entry: &LogEntry, head: &LogEntry) -> KvError {
    MergeError::DivergentLineage {
        key: entry.key.clone(),
        machine_id: entry.origin_machine.clone(),
        head_entry_id: head.entry_id.clone(),
        entry_id: entry.entry_id.clone(),
    }
    .into()
}

fn missing_predecessor(entry: &LogEntry) -> KvError {
    KvError::MissingChainPredecessor {
        entry_id: entry.entry_id.clone(),
        previous_entry_id: entry.previous_entry_id.clone().unwrap_or_default(),
        key: entry.key.clone(),
        machine_id: entry.origin_machine.clone(),
    }
}

/// Errors confined to one lineage. Everything else aborts the merge.
fn is_lineage_error(error: &KvError) -> bool {
    matches!(
        error,
        KvError::DuplicateEntry { .. }
            | KvError::NotFound { .. }
            | KvError::ChainLinkMismatch { .. }
            | KvError::MissingChainPredecessor { .. }
            | KvError::MergeError(_)
    )
}
