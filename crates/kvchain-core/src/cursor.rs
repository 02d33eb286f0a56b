//! Per-machine replication bookmark.

use serde::{Deserialize, Serialize};

use crate::constants::LOG_HEADER_SIZE;
use crate::entry::LogEntry;

/// Replay progress for one machine: the last admitted record of its log.
///
/// Updated in the same transaction as the admission it tracks and never moves
/// backwards (the chain number is monotone per machine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationCursor {
    pub machine_id: String,
    pub log_offset: i64,
    pub chain_number: i64,
    pub entry_id: String,
}

impl ReplicationCursor {
    /// A cursor positioned before the first record of `machine_id`'s log.
    pub fn new(machine_id: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            log_offset: LOG_HEADER_SIZE,
            chain_number: 0,
            entry_id: String::new(),
        }
    }

    /// The cursor position after admitting `entry`.
    pub fn at(entry: &LogEntry) -> Self {
        Self {
            machine_id: entry.origin_machine.clone(),
            log_offset: entry.log_offset,
            chain_number: entry.chain_number,
            entry_id: entry.entry_id.clone(),
        }
    }

    /// True if `entry` is past this cursor and still needs transferring.
    pub fn is_behind(&self, entry: &LogEntry) -> bool {
        entry.origin_machine == self.machine_id && entry.chain_number > self.chain_number
    }
}
