//! Model checks against `BTreeMap`.
//!
//! Keys are drawn from a four-byte alphabet (including `0x00` and `0xff`) so that keys which are
//! byte-prefixes of each other, and prefixes longer than the inline bound, come up constantly.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use artree::{AdaptiveRadixTree, TreeStatsTrait};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op<V> {
    Insert(Vec<u8>, V),
    Remove(Vec<u8>),
    Get(Vec<u8>),
    Prefix(Vec<u8>),
    Snapshot,
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    let byte = prop_oneof![Just(0x00u8), Just(b'a'), Just(b'b'), Just(0xffu8)];
    let short = prop::collection::vec(byte.clone(), 0..=6);
    // A long common run followed by a short tail: exercises truncated prefixes.
    let long = prop::collection::vec(byte, 0..=4).prop_map(|tail| {
        let mut key = vec![b'p'; 14];
        key.extend(tail);
        key
    });
    let cut_long = (0usize..=18).prop_map(|n| vec![b'p'; n]);
    prop_oneof![6 => short, 3 => long, 1 => cut_long]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op<u64>>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Get),
        8 => key.clone().prop_map(Op::Prefix),
        2 => Just(Op::Snapshot),
    ];
    prop::collection::vec(op, 0..=600)
}

fn entries(t: &AdaptiveRadixTree<u64>) -> Vec<(Vec<u8>, u64)> {
    t.iter().map(|(k, v)| (k.to_vec(), *v)).collect()
}

fn model_entries(m: &BTreeMap<Vec<u8>, u64>) -> Vec<(Vec<u8>, u64)> {
    m.iter().map(|(k, v)| (k.clone(), *v)).collect()
}

fn validate_tree(t: &AdaptiveRadixTree<u64>, m: &BTreeMap<Vec<u8>, u64>) {
    let pulled = entries(t);
    assert_eq!(pulled, model_entries(m));

    let mut walked = Vec::new();
    let flow = t.walk(|k, v| {
        walked.push((k.to_vec(), *v));
        ControlFlow::<()>::Continue(())
    });
    assert_eq!(flow, ControlFlow::Continue(()));
    assert_eq!(walked, pulled);

    assert_eq!(t.get_tree_stats().num_leaves, m.len());
    assert_eq!(
        t.minimum().map(|(k, v)| (k.to_vec(), *v)),
        m.iter().next().map(|(k, v)| (k.clone(), *v))
    );
    assert_eq!(
        t.maximum().map(|(k, v)| (k.to_vec(), *v)),
        m.iter().next_back().map(|(k, v)| (k.clone(), *v))
    );
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_u64(ops in ops_strategy()) {
        let mut t: AdaptiveRadixTree<u64> = AdaptiveRadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        let mut snapshots = Vec::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(&key, value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key);
                    let old_m = m.remove(key.as_slice());
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    let got_t = t.get(&key).copied();
                    let got_m = m.get(key.as_slice()).copied();
                    prop_assert_eq!(got_t, got_m);
                }
                Op::Prefix(prefix) => {
                    let got: Vec<(Vec<u8>, u64)> =
                        t.prefix_iter(&prefix).map(|(k, v)| (k.to_vec(), *v)).collect();
                    let expected: Vec<(Vec<u8>, u64)> = m
                        .range(prefix.clone()..)
                        .take_while(|(k, _)| k.starts_with(&prefix))
                        .map(|(k, v)| (k.clone(), *v))
                        .collect();
                    let mut walked = Vec::new();
                    let _ = t.walk_prefix(&prefix, |k, v| {
                        walked.push((k.to_vec(), *v));
                        ControlFlow::<()>::Continue(())
                    });
                    prop_assert_eq!(&got, &expected);
                    prop_assert_eq!(walked, expected);
                }
                Op::Snapshot => {
                    snapshots.push((t.copy(), m.clone()));
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t, &m);
        // Later mutations of the source tree never show through a copy.
        for (snapshot, model) in &snapshots {
            validate_tree(snapshot, model);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"foo".to_vec(),
        b"foobar".to_vec(),
        b"foobaz".to_vec(),
        b"fo".to_vec(),
        b"f\x00".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&small_key_set(), |perm| {
        let mut t: AdaptiveRadixTree<u64> = AdaptiveRadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(&k, v), m.insert(k, v));
        }

        validate_tree(&t, &m);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    for_each_permutation(&small_key_set(), |perm| {
        let mut t: AdaptiveRadixTree<u64> = AdaptiveRadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        for (i, k) in small_key_set().into_iter().enumerate() {
            t.insert(&k, i as u64);
            m.insert(k, i as u64);
        }

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(&k));
            assert_eq!(t.remove(&k), None);
            validate_tree(&t, &m);
        }
        assert!(t.is_empty());
    });
}
