//! Error classification, messages, and tracing setup.

use kvchain_core::errors::{ConfigError, MergeError, StorageError};
use kvchain_core::KvError;

#[test]
fn busy_is_transient() {
    let busy = KvError::from(StorageError::Busy {
        message: "locked".to_string(),
    });
    assert!(busy.is_transient());
}

#[test]
fn domain_errors_are_not_transient() {
    let errors = [
        KvError::DuplicateEntry {
            entry_id: "e".to_string(),
        },
        KvError::NotFound {
            entry_id: "e".to_string(),
        },
        KvError::from(StorageError::SqliteError {
            message: "syntax".to_string(),
        }),
        KvError::from(StorageError::CorruptRow {
            table: "log_entries".to_string(),
            details: "bad timestamp".to_string(),
        }),
        KvError::from(ConfigError::FileNotFound {
            path: "kv.toml".to_string(),
        }),
    ];
    assert!(errors.iter().all(|e| !e.is_transient()));
}

#[test]
fn only_not_found_is_stale_head() {
    assert!(KvError::NotFound {
        entry_id: "e".to_string()
    }
    .is_stale_head());
    assert!(!KvError::DuplicateEntry {
        entry_id: "e".to_string()
    }
    .is_stale_head());
}

#[test]
fn messages_carry_context() {
    let missing = KvError::MissingChainPredecessor {
        entry_id: "e2".to_string(),
        previous_entry_id: "e1".to_string(),
        key: "k".to_string(),
        machine_id: "b".to_string(),
    };
    let text = missing.to_string();
    assert!(text.contains("e2") && text.contains("e1") && text.contains("\"k\""));

    let forked = KvError::from(MergeError::ForkedLineage {
        entry_id: "e3".to_string(),
        previous_entry_id: "e1".to_string(),
    });
    assert!(forked.to_string().starts_with("merge error: forked lineage"));
}

#[test]
fn tracing_init_is_idempotent() {
    kvchain_core::tracing::init_tracing_with_filter("kvchain_core=debug");
    kvchain_core::tracing::init_tracing();
    kvchain_core::tracing::init_tracing();
}
