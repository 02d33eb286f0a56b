//! Multi-version reader: folds a key's lineage heads into one logical value.
//!
//! The reading machine's own head is the main version; every other head is
//! an unresolved branch.
//!
//! # Examples
//!
//! ```
//! use kvchain_core::{LogEntry, LogicalValue};
//!
//! let mine = LogEntry::root("k", "v2", "machine-a", 2, 32);
//! let theirs = LogEntry::root("k", "vB", "machine-b", 1, 32);
//!
//! let value = LogicalValue::from_heads(vec![theirs, mine], "machine-a").unwrap();
//! assert_eq!(value.main.value, "v2");
//! assert_eq!(value.to_string(), "v2(*) vB");
//! ```

use std::fmt;

use crate::constants::BRANCH_MARKER;
use crate::entry::LogEntry;
use crate::errors::{KvError, KvResult};
use crate::traits::IReadOnlyLogStorage;

/// A key's value as seen by one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalValue {
    /// Head of the reading machine's own lineage.
    pub main: LogEntry,
    /// Heads of other lineages, in input order.
    pub branches: Vec<LogEntry>,
}

impl LogicalValue {
    /// Reconstruct the value seen by `machine_id` from the current lineage heads.
    ///
    /// `heads` must already be restricted to current heads; superseded entries
    /// would otherwise surface as branches. Fails with `NoMainVersion` when no
    /// head was authored by `machine_id`, even if other machines' heads exist.
    pub fn from_heads(heads: Vec<LogEntry>, machine_id: &str) -> KvResult<Self> {
        let main_idx = heads
            .iter()
            .position(|e| e.origin_machine == machine_id)
            .ok_or_else(|| KvError::NoMainVersion {
                key: heads.first().map(|e| e.key.clone()).unwrap_or_default(),
                machine_id: machine_id.to_string(),
            })?;

        let mut heads = heads;
        let main = heads.remove(main_idx);
        let branches = heads
            .into_iter()
            .filter(|e| e.entry_id != main.entry_id)
            .collect();
        Ok(Self { main, branches })
    }

    pub fn key(&self) -> &str {
        &self.main.key
    }

    /// True when unresolved concurrent writes exist.
    pub fn is_conflicted(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Main followed by branches.
    pub fn versions(&self) -> impl Iterator<Item = &LogEntry> {
        std::iter::once(&self.main).chain(self.branches.iter())
    }

    pub fn branch_values(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.value.as_str()).collect()
    }
}

/// Canonical conflict display: `main`, then `(*)` and each branch value
/// space-separated when branches exist.
impl fmt::Display for LogicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.main.value)?;
        if self.is_conflicted() {
            f.write_str(BRANCH_MARKER)?;
        }
        for branch in &self.branches {
            write!(f, " {}", branch.value)?;
        }
        Ok(())
    }
}

/// Load `key` from `storage` as seen by `machine_id`.
///
/// Deleted and discarded heads are invisible, so a key whose local head is a
/// tombstone reads as `NoMainVersion`.
pub fn load_value(
    storage: &dyn IReadOnlyLogStorage,
    key: &str,
    machine_id: &str,
) -> KvResult<LogicalValue> {
    let heads: Vec<LogEntry> = storage
        .get_by_key(key)?
        .into_iter()
        .filter(LogEntry::visible)
        .collect();
    LogicalValue::from_heads(heads, machine_id).map_err(|e| match e {
        KvError::NoMainVersion { machine_id, .. } => KvError::NoMainVersion {
            key: key.to_string(),
            machine_id,
        },
        other => other,
    })
}
