//! Property tests: duplicate admission, replace/lookup, reader idempotence.

use proptest::prelude::*;

use kvchain_core::traits::{ILogStorage, IReadOnlyLogStorage};
use kvchain_core::{KvError, LogEntry};
use test_fixtures::{admit_chain, chain, head_set, known_ids, memory_engine};

proptest! {
    #[test]
    fn prop_duplicate_add_leaves_state_identical(
        key in "[a-z]{1,12}",
        value in "[a-zA-Z0-9 ]{0,64}",
        machine in "[a-z]{1,6}",
    ) {
        let engine = memory_engine();
        let entry = LogEntry::root(key, value, machine.as_str(), 1, 96);
        engine.add(&entry).unwrap();

        let heads = head_set(&engine);
        let ids = known_ids(&engine);
        let cursors = engine.all_cursors().unwrap();

        let duplicate = matches!(engine.add(&entry), Err(KvError::DuplicateEntry { .. }));
        prop_assert!(duplicate);
        prop_assert_eq!(head_set(&engine), heads);
        prop_assert_eq!(known_ids(&engine), ids);
        prop_assert_eq!(engine.all_cursors().unwrap(), cursors);
    }

    #[test]
    fn prop_replace_hides_old_and_returns_new(
        values in proptest::collection::vec("[a-z0-9]{1,16}", 2..8),
    ) {
        let engine = memory_engine();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let entries = chain("k", "a", &refs);
        admit_chain(&engine, &entries);

        let (head, superseded) = entries.split_last().unwrap();
        for old in superseded {
            let not_found = matches!(
                engine.get_by_entry_id(&old.entry_id),
                Err(KvError::NotFound { .. })
            );
            prop_assert!(not_found);
        }
        prop_assert_eq!(&engine.get_by_entry_id(&head.entry_id).unwrap(), head);
        prop_assert_eq!(engine.cursor("a").unwrap().unwrap().chain_number, head.chain_number);
    }

    #[test]
    fn prop_load_is_idempotent(
        machines in proptest::collection::btree_set("[a-z]{1,6}", 1..5),
    ) {
        let engine = memory_engine();
        for machine in &machines {
            admit_chain(&engine, &chain("k", machine, &["v1", "v2"]));
        }
        let reader = machines.iter().next().unwrap();

        let first = engine.load("k", reader).unwrap();
        let second = engine.load("k", reader).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.branches.len(), machines.len() - 1);
    }
}
