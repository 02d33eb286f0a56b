//! Multi-version reader: main/branch selection and display.

use proptest::prelude::*;

use kvchain_core::{KvError, LogEntry, LogicalValue};

#[test]
fn single_head_has_no_branches() {
    let head = LogEntry::root("k", "v1", "a", 1, 96);
    let value = LogicalValue::from_heads(vec![head.clone()], "a").unwrap();

    assert_eq!(value.main, head);
    assert!(value.branches.is_empty());
    assert!(!value.is_conflicted());
    assert_eq!(value.to_string(), "v1");
}

#[test]
fn other_machines_heads_are_branches() {
    let mine = LogEntry::root("k", "v2", "a", 2, 96);
    let theirs = LogEntry::root("k", "vB", "b", 1, 96);
    let heads = vec![mine.clone(), theirs.clone()];

    let as_a = LogicalValue::from_heads(heads.clone(), "a").unwrap();
    assert_eq!(as_a.main.value, "v2");
    assert_eq!(as_a.branch_values(), vec!["vB"]);
    assert_eq!(as_a.to_string(), "v2(*) vB");

    let as_b = LogicalValue::from_heads(heads, "b").unwrap();
    assert_eq!(as_b.main.value, "vB");
    assert_eq!(as_b.branch_values(), vec!["v2"]);
    assert_eq!(as_b.to_string(), "vB(*) v2");
}

#[test]
fn branches_keep_input_order() {
    let heads = vec![
        LogEntry::root("k", "vC", "c", 1, 96),
        LogEntry::root("k", "vA", "a", 1, 96),
        LogEntry::root("k", "vB", "b", 1, 96),
    ];
    let value = LogicalValue::from_heads(heads, "a").unwrap();

    assert_eq!(value.branch_values(), vec!["vC", "vB"]);
    assert_eq!(value.to_string(), "vA(*) vC vB");
    assert_eq!(
        value.versions().map(|e| e.value.as_str()).collect::<Vec<_>>(),
        vec!["vA", "vC", "vB"]
    );
}

#[test]
fn no_local_head_is_no_main_version() {
    let theirs = LogEntry::root("k", "vB", "b", 1, 96);
    let err = LogicalValue::from_heads(vec![theirs], "a").unwrap_err();

    match err {
        KvError::NoMainVersion { key, machine_id } => {
            assert_eq!(key, "k");
            assert_eq!(machine_id, "a");
        }
        other => panic!("expected NoMainVersion, got {other:?}"),
    }
}

#[test]
fn empty_heads_is_no_main_version() {
    assert!(matches!(
        LogicalValue::from_heads(Vec::new(), "a"),
        Err(KvError::NoMainVersion { .. })
    ));
}

#[test]
fn first_local_head_wins() {
    let first = LogEntry::root("k", "first", "a", 1, 96);
    let second = LogEntry::root("k", "second", "a", 2, 96);
    let value = LogicalValue::from_heads(vec![first, second], "a").unwrap();

    assert_eq!(value.main.value, "first");
    assert_eq!(value.branch_values(), vec!["second"]);
}

proptest! {
    #[test]
    fn prop_reader_is_idempotent(
        values in proptest::collection::vec("[a-z]{1,8}", 1..6),
        reader in 0usize..6,
    ) {
        let heads: Vec<LogEntry> = values
            .iter()
            .enumerate()
            .map(|(i, v)| LogEntry::root("k", v.as_str(), format!("m{i}"), 1, 96))
            .collect();
        let machine = format!("m{}", reader % values.len());

        let first = LogicalValue::from_heads(heads.clone(), &machine).unwrap();
        let second = LogicalValue::from_heads(heads, &machine).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.branches.len(), values.len() - 1);
        prop_assert_eq!(first.main.origin_machine, machine);
    }
}
