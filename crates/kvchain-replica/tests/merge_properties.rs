//! Property tests: merge idempotence and convergence on disjoint lineages.

use proptest::prelude::*;

use kvchain_core::traits::IReadOnlyLogStorage;
use kvchain_replica::Replica;
use test_fixtures::{head_set, known_ids};

fn write_all(replica: &Replica, writes: &[(u8, String)]) {
    for (key, value) in writes {
        replica.save(&format!("key-{key}"), value).unwrap();
    }
}

fn head_ids(replica: &Replica, key: &str) -> Vec<String> {
    let mut ids: Vec<String> = replica
        .storage()
        .get_by_key(key)
        .unwrap()
        .into_iter()
        .map(|e| e.entry_id)
        .collect();
    ids.sort();
    ids
}

fn writes() -> impl Strategy<Value = Vec<(u8, String)>> {
    proptest::collection::vec((0u8..5, "[a-z]{1,6}"), 0..12)
}

proptest! {
    #[test]
    fn prop_merge_is_idempotent(left in writes(), right in writes()) {
        let a = Replica::open_in_memory("A").unwrap();
        let b = Replica::open_in_memory("B").unwrap();
        write_all(&a, &left);
        write_all(&b, &right);

        let first = a.merge_from(b.storage()).unwrap();
        prop_assert!(first.is_clean());
        let heads = head_set(a.storage());
        let ids = known_ids(a.storage());

        let second = a.merge_from(b.storage()).unwrap();
        prop_assert!(second.is_noop());
        prop_assert_eq!(head_set(a.storage()), heads);
        prop_assert_eq!(known_ids(a.storage()), ids);
    }

    #[test]
    fn prop_merge_converges_on_disjoint_lineages(left in writes(), right in writes()) {
        let a = Replica::open_in_memory("A").unwrap();
        let b = Replica::open_in_memory("B").unwrap();
        write_all(&a, &left);
        write_all(&b, &right);

        a.merge_from(b.storage()).unwrap();
        b.merge_from(a.storage()).unwrap();

        prop_assert_eq!(head_set(a.storage()), head_set(b.storage()));
        for key in 0u8..5 {
            let key = format!("key-{key}");
            prop_assert_eq!(head_ids(&a, &key), head_ids(&b, &key));
        }
    }
}
