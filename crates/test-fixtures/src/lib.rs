//! Entry builders and store helpers shared by the kvchain test suites.
//!
//! Helpers panic on failure; they are for tests only.

use kvchain_core::constants::LOG_HEADER_SIZE;
use kvchain_core::entry::LogEntry;
use kvchain_core::traits::{ILogStorage, IReadOnlyLogStorage};
use kvchain_storage::StorageEngine;

/// A fresh in-memory engine.
pub fn memory_engine() -> StorageEngine {
    StorageEngine::open_in_memory().expect("open in-memory engine")
}

/// A machine id unlikely to collide across test cases.
pub fn unique_machine(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// Lineage root at chain number 1.
pub fn root(key: &str, value: &str, machine: &str) -> LogEntry {
    LogEntry::root(key, value, machine, 1, LOG_HEADER_SIZE + 64)
}

/// Successor of `prev` authored by `prev`'s own machine.
pub fn next(prev: &LogEntry, value: &str) -> LogEntry {
    prev.successor(
        value,
        prev.origin_machine.as_str(),
        prev.chain_number + 1,
        prev.log_offset + 64,
    )
}

/// A lineage of `values.len()` entries for (key, machine), root first.
pub fn chain(key: &str, machine: &str, values: &[&str]) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::with_capacity(values.len());
    for value in values {
        let entry = match entries.last() {
            Some(prev) => next(prev, value),
            None => root(key, value, machine),
        };
        entries.push(entry);
    }
    entries
}

/// Admit `entries` as one lineage: first via `add`, the rest via `replace`.
pub fn admit_chain(storage: &dyn ILogStorage, entries: &[LogEntry]) {
    let mut prev: Option<&LogEntry> = None;
    for entry in entries {
        match prev {
            Some(p) => storage.replace(&p.entry_id, entry).expect("replace"),
            None => storage.add(entry).expect("add"),
        }
        prev = Some(entry);
    }
}

/// Live (key, machine, value) triples, sorted. Compares stores by content.
pub fn head_set(storage: &dyn IReadOnlyLogStorage) -> Vec<(String, String, String)> {
    let mut heads: Vec<_> = storage
        .all_entries()
        .expect("all entries")
        .into_iter()
        .map(|e| (e.key, e.origin_machine, e.value))
        .collect();
    heads.sort();
    heads
}

/// Every retained entry id, sorted.
pub fn known_ids(storage: &dyn IReadOnlyLogStorage) -> Vec<String> {
    let mut ids: Vec<_> = storage
        .log_history()
        .expect("log history")
        .into_iter()
        .map(|e| e.entry_id)
        .collect();
    ids.sort();
    ids
}
