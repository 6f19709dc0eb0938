use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_table(t: &KeyTable) {
    let mut stack: Vec<(Option<NodeHandle>, &[NodeHandle])> = vec![(None, t.roots())];
    let mut reachable = 0usize;

    while let Some((parent, siblings)) = stack.pop() {
        for pair in siblings.windows(2) {
            let (a, b) = (t.node(pair[0]).fragment(), t.node(pair[1]).fragment());
            assert!(a < b, "siblings out of ordinal order: {a:?} >= {b:?}");
            assert_eq!(
                common_prefix_len(a, b),
                0,
                "siblings {a:?} and {b:?} share a leading run"
            );
        }

        for &handle in siblings {
            reachable += 1;
            let node = t.node(handle);
            assert!(!node.fragment().is_empty(), "empty fragment on {:?}", node.key());
            assert_eq!(node.parent(), parent, "parent link of {:?}", node.key());
            assert_eq!(t.full_key(handle), node.key(), "stored key disagrees with path");
            if node.is_branch() {
                assert!(!node.children().is_empty(), "childless branch {:?}", node.key());
            }
            stack.push((Some(handle), node.children()));
        }
    }

    assert_eq!(reachable, t.node_count(), "every node must be reachable from the root");
}

fn shape(t: &KeyTable) -> Vec<(String, i32, usize)> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeHandle> = t.roots().iter().rev().copied().collect();
    while let Some(handle) = stack.pop() {
        let node = t.node(handle);
        out.push((node.key().to_owned(), node.string_id(), node.children().len()));
        stack.extend(node.children().iter().rev());
    }
    out
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A tiny alphabet forces shared runs, splits and keys ending on branches.
    "[ab_]{1,8}"
}

fn keys_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(key_strategy(), 0..=200)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_insert_matches_model(keys in keys_strategy()) {
        let mut t = KeyTable::new();
        let mut m: BTreeMap<String, i32> = BTreeMap::new();
        let mut highest = 0;

        for key in &keys {
            let (inserted, id) = t.insert(key);
            match m.get(key) {
                Some(&existing) => {
                    prop_assert!(!inserted);
                    prop_assert_eq!(id, existing);
                }
                None => {
                    prop_assert!(inserted);
                    prop_assert!(id > highest, "id {} not above {}", id, highest);
                    highest = id;
                    m.insert(key.clone(), id);
                }
            }
            prop_assert_eq!(t.watermark(), highest);
        }

        validate_table(&t);
        prop_assert_eq!(t.len(), m.len());
        for (key, &id) in &m {
            prop_assert_eq!(t.lookup(key), Some(id));
        }
        let mut got: Vec<(String, i32)> = t.entries().map(|(k, id)| (k.to_owned(), id)).collect();
        got.sort();
        let expected: Vec<(String, i32)> = m.iter().map(|(k, &id)| (k.clone(), id)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_payload_round_trip(keys in keys_strategy(), extra in key_strategy()) {
        let mut t = KeyTable::new();
        for key in &keys {
            t.insert(key);
        }

        let payload = t.to_payload().unwrap();
        let mut loaded = KeyTable::from_payload(&payload).unwrap();
        validate_table(&loaded);
        prop_assert_eq!(shape(&loaded), shape(&t));
        prop_assert_eq!(loaded.to_payload().unwrap(), payload);
        for (key, id) in t.entries() {
            prop_assert_eq!(loaded.lookup(key), Some(id));
        }

        // Ids already on disk are never handed out again.
        let max_on_disk = t.entries().map(|(_, id)| id).max().unwrap_or(0);
        prop_assert!(loaded.watermark() >= max_on_disk);
        let before = loaded.lookup(&extra);
        let (inserted, id) = loaded.insert(&extra);
        match before {
            Some(existing) => prop_assert_eq!((inserted, id), (false, existing)),
            None => {
                prop_assert!(inserted);
                prop_assert!(id > max_on_disk);
            }
        }
        validate_table(&loaded);
    }

    #[test]
    fn prop_second_insert_changes_nothing(keys in keys_strategy()) {
        let mut t = KeyTable::new();
        for key in &keys {
            t.insert(key);
        }
        let payload = t.to_payload().unwrap();
        let watermark = t.watermark();
        for key in &keys {
            let id = t.lookup(key).unwrap();
            prop_assert_eq!(t.insert(key), (false, id));
        }
        prop_assert_eq!(t.watermark(), watermark);
        prop_assert_eq!(t.to_payload().unwrap(), payload);
    }

    #[test]
    fn prop_merge_preserves_both_sides(left in keys_strategy(), right in keys_strategy()) {
        let mut a = KeyTable::new();
        for key in &left {
            a.insert(key);
        }
        let mut b = KeyTable::new();
        for key in &right {
            b.insert(key);
        }
        let before: Vec<(String, i32)> = a.entries().map(|(k, id)| (k.to_owned(), id)).collect();

        let remaps = a.merge_from(&b);
        validate_table(&a);
        for (key, id) in &before {
            prop_assert_eq!(a.lookup(key), Some(*id));
        }
        for (key, source_id) in b.entries() {
            prop_assert!(a.contains_key(key));
            if let Some(remap) = remaps.iter().find(|r| r.key == key) {
                prop_assert_eq!(remap.source_id, source_id);
                prop_assert_eq!(a.lookup(key), Some(remap.target_id));
            }
        }
    }
}
