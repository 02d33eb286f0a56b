//! The immutable, chain-linked log entry.
//!
//! Each entry records one mutation of one key by one machine. Entries of the
//! same (key, origin machine) pair form a lineage linked through
//! `previous_entry_id`; the entry without an admitted successor is the head.
//!
//! # Examples
//!
//! ```
//! use kvchain_core::LogEntry;
//!
//! let root = LogEntry::root("k", "v1", "machine-a", 1, 32);
//! let next = root.successor("v2", "machine-a", 2, 96);
//!
//! assert!(root.is_root());
//! assert_eq!(next.previous_entry_id.as_deref(), Some(root.entry_id.as_str()));
//! assert_eq!(next.change_tally.changes("machine-a"), 2);
//! assert!(next.check_extends(&root).is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ROOT_CHAIN_NUMBER;
use crate::errors::{KvError, KvResult};
use crate::tally::ChangeTally;

/// One mutation of one key, linked to the entry it supersedes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Globally unique handle. Never reused, never overwritten.
    pub entry_id: String,
    /// Entry this one supersedes; `None` for a lineage root.
    pub previous_entry_id: Option<String>,
    pub key: String,
    pub value: String,
    /// Machine that authored this entry.
    pub origin_machine: String,
    /// Origin machine of the predecessor.
    pub previous_machine: Option<String>,
    /// Position in the origin machine's log stream. Used to resume replay only.
    pub log_offset: i64,
    /// Per-machine monotone sequence number.
    pub chain_number: i64,
    pub previous_chain_number: i64,
    pub change_tally: ChangeTally,
    pub deleted: bool,
    pub discarded: bool,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// Build the first entry of a new lineage.
    pub fn root(
        key: impl Into<String>,
        value: impl Into<String>,
        machine_id: impl Into<String>,
        chain_number: i64,
        log_offset: i64,
    ) -> Self {
        let machine_id = machine_id.into();
        let mut entry = Self {
            entry_id: String::new(),
            previous_entry_id: None,
            key: key.into(),
            value: value.into(),
            change_tally: ChangeTally::new().with_change(&machine_id, 1),
            origin_machine: machine_id,
            previous_machine: None,
            log_offset,
            chain_number,
            previous_chain_number: ROOT_CHAIN_NUMBER,
            deleted: false,
            discarded: false,
            created_at: Utc::now(),
        };
        entry.entry_id = entry.compute_entry_id();
        entry
    }

    /// Build the entry that supersedes `self`, authored by `machine_id`.
    pub fn successor(
        &self,
        value: impl Into<String>,
        machine_id: impl Into<String>,
        chain_number: i64,
        log_offset: i64,
    ) -> Self {
        let machine_id = machine_id.into();
        let mut entry = Self {
            entry_id: String::new(),
            previous_entry_id: Some(self.entry_id.clone()),
            key: self.key.clone(),
            value: value.into(),
            change_tally: self.change_tally.with_change(&machine_id, 1),
            origin_machine: machine_id,
            previous_machine: Some(self.origin_machine.clone()),
            log_offset,
            chain_number,
            previous_chain_number: self.chain_number,
            deleted: false,
            discarded: false,
            created_at: Utc::now(),
        };
        entry.entry_id = entry.compute_entry_id();
        entry
    }

    /// Build a successor that marks the key deleted.
    pub fn tombstone(
        &self,
        machine_id: impl Into<String>,
        chain_number: i64,
        log_offset: i64,
    ) -> Self {
        let mut entry = self.successor(String::new(), machine_id, chain_number, log_offset);
        entry.deleted = true;
        entry.entry_id = entry.compute_entry_id();
        entry
    }

    /// BLAKE3 digest over the identifying fields.
    pub fn compute_entry_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for part in [
            self.origin_machine.as_str(),
            &self.chain_number.to_string(),
            self.key.as_str(),
            self.previous_entry_id.as_deref().unwrap_or(""),
            self.value.as_str(),
            if self.deleted { "deleted" } else { "live" },
            &self.created_at.timestamp_nanos_opt().unwrap_or_default().to_string(),
        ] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Not deleted and not discarded.
    pub fn visible(&self) -> bool {
        !self.deleted && !self.discarded
    }

    /// First entry of its lineage.
    pub fn is_root(&self) -> bool {
        self.previous_entry_id.is_none()
    }

    /// The (key, origin machine) pair this entry belongs to.
    pub fn lineage(&self) -> (&str, &str) {
        (&self.key, &self.origin_machine)
    }

    /// Size of the record in the origin machine's log stream.
    pub fn encoded_len(&self) -> KvResult<i64> {
        let bytes = serde_json::to_vec(self)?;
        Ok(bytes.len() as i64)
    }

    /// Verify that `self` is a valid chain extension of `old`.
    pub fn check_extends(&self, old: &LogEntry) -> KvResult<()> {
        let mismatch = |reason: String| KvError::ChainLinkMismatch {
            old_entry_id: old.entry_id.clone(),
            entry_id: self.entry_id.clone(),
            reason,
        };

        if self.key != old.key {
            return Err(mismatch(format!("key {:?} != {:?}", self.key, old.key)));
        }
        if self.previous_entry_id.as_deref() != Some(old.entry_id.as_str()) {
            return Err(mismatch(format!(
                "previous_entry_id is {:?}",
                self.previous_entry_id
            )));
        }
        if self.previous_chain_number != old.chain_number {
            return Err(mismatch(format!(
                "previous_chain_number {} != {}",
                self.previous_chain_number, old.chain_number
            )));
        }
        if self.previous_machine.as_deref() != Some(old.origin_machine.as_str()) {
            return Err(mismatch(format!(
                "previous_machine {:?} != {}",
                self.previous_machine, old.origin_machine
            )));
        }
        if self.origin_machine == old.origin_machine && self.chain_number <= old.chain_number {
            return Err(mismatch(format!(
                "chain_number {} does not advance past {}",
                self.chain_number, old.chain_number
            )));
        }
        Ok(())
    }
}
