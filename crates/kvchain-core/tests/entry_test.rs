//! Log entry construction, chain-link validation, and change tallies.

use kvchain_core::constants::{LOG_HEADER_SIZE, ROOT_CHAIN_NUMBER};
use kvchain_core::{ChangeTally, KvError, LogEntry, ReplicationCursor};

#[test]
fn root_has_no_predecessor() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    assert!(root.is_root());
    assert!(root.visible());
    assert_eq!(root.previous_machine, None);
    assert_eq!(root.previous_chain_number, ROOT_CHAIN_NUMBER);
    assert_eq!(root.change_tally.changes("a"), 1);
    assert_eq!(root.entry_id, root.compute_entry_id());
}

#[test]
fn successor_links_to_predecessor() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    let next = root.successor("v2", "a", 2, 160);

    assert_eq!(next.key, "k");
    assert_eq!(next.previous_entry_id.as_deref(), Some(root.entry_id.as_str()));
    assert_eq!(next.previous_machine.as_deref(), Some("a"));
    assert_eq!(next.previous_chain_number, 1);
    assert_ne!(next.entry_id, root.entry_id);
    next.check_extends(&root).unwrap();
}

#[test]
fn cross_machine_successor_carries_both_tallies() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    let taken = root.successor("vB", "b", 1, 96);

    assert_eq!(taken.change_tally.changes("a"), 1);
    assert_eq!(taken.change_tally.changes("b"), 1);
    assert_eq!(taken.change_tally.total(), 2);
    // Chain numbers are per machine, so b may restart at 1.
    taken.check_extends(&root).unwrap();
}

#[test]
fn tombstone_is_invisible() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    let gone = root.tombstone("a", 2, 160);

    assert!(gone.deleted);
    assert!(!gone.visible());
    assert!(gone.value.is_empty());
    assert_eq!(gone.entry_id, gone.compute_entry_id());
    gone.check_extends(&root).unwrap();
}

#[test]
fn entry_ids_differ_for_identical_content() {
    let first = LogEntry::root("k", "v", "a", 1, 96);
    let second = LogEntry::root("k", "v", "b", 1, 96);
    assert_ne!(first.entry_id, second.entry_id);
}

#[test]
fn check_extends_rejects_wrong_predecessor() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    let other = LogEntry::root("k", "v9", "a", 5, 96);
    let next = root.successor("v2", "a", 2, 160);

    let err = next.check_extends(&other).unwrap_err();
    assert!(matches!(err, KvError::ChainLinkMismatch { .. }), "{err}");
}

#[test]
fn check_extends_rejects_key_change() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    let mut next = root.successor("v2", "a", 2, 160);
    next.key = "other".to_string();

    assert!(matches!(
        next.check_extends(&root),
        Err(KvError::ChainLinkMismatch { .. })
    ));
}

#[test]
fn check_extends_rejects_non_advancing_chain_number() {
    let root = LogEntry::root("k", "v1", "a", 3, 96);
    let next = root.successor("v2", "a", 3, 160);

    let err = next.check_extends(&root).unwrap_err();
    assert!(err.to_string().contains("does not advance"), "{err}");
}

#[test]
fn check_extends_rejects_wrong_previous_machine() {
    let root = LogEntry::root("k", "v1", "a", 1, 96);
    let mut next = root.successor("v2", "a", 2, 160);
    next.previous_machine = Some("b".to_string());

    assert!(next.check_extends(&root).is_err());
}

#[test]
fn encoded_len_tracks_value_size() {
    let short = LogEntry::root("k", "v", "a", 1, 96);
    let long = LogEntry::root("k", "v".repeat(100), "a", 1, 96);
    assert!(short.encoded_len().unwrap() > 0);
    assert!(long.encoded_len().unwrap() > short.encoded_len().unwrap());
}

#[test]
fn cursor_starts_past_header_and_follows_entries() {
    let cursor = ReplicationCursor::new("a");
    assert_eq!(cursor.log_offset, LOG_HEADER_SIZE);
    assert_eq!(cursor.chain_number, 0);

    let root = LogEntry::root("k", "v1", "a", 1, 96);
    assert!(cursor.is_behind(&root));

    let advanced = ReplicationCursor::at(&root);
    assert_eq!(advanced.entry_id, root.entry_id);
    assert_eq!(advanced.log_offset, 96);
    assert!(!advanced.is_behind(&root));
    assert!(advanced.is_behind(&root.successor("v2", "a", 2, 160)));
    // Only entries of the cursor's own machine are tracked.
    assert!(!advanced.is_behind(&LogEntry::root("k", "vB", "b", 9, 96)));
}

#[test]
fn tally_round_trips_through_json() {
    let tally = ChangeTally::new().with_change("a", 2).with_change("b", 1);
    let json = tally.to_json().unwrap();
    assert_eq!(json, r#"{"a":2,"b":1}"#);
    assert_eq!(ChangeTally::from_json(&json).unwrap(), tally);
}

#[test]
fn tally_rejects_malformed_json() {
    let err = ChangeTally::from_json("not json").unwrap_err();
    assert!(matches!(err, KvError::SerializationError(_)));
}

#[test]
fn tally_collects_from_pairs() {
    let tally: ChangeTally = vec![("a".to_string(), 3), ("b".to_string(), 4)]
        .into_iter()
        .collect();
    assert_eq!(tally.total(), 7);
    assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("a", 3), ("b", 4)]);
    assert_eq!(tally.changes("missing"), 0);
    assert!(ChangeTally::new().is_empty());
}
