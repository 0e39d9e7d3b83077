#![no_main]

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artree::AdaptiveRadixTree;

#[derive(Arbitrary, Debug)]
enum ScanAction {
    IterateAll,
    Prefix { prefix: Vec<u8> },
    WalkUntil { limit: u8 },
    MinMax,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    setup: Vec<(Vec<u8>, u16)>,
    removals: Vec<Vec<u8>>,
    actions: Vec<ScanAction>,
}

fuzz_target!(|input: FuzzInput| {
    let mut art = AdaptiveRadixTree::<u16>::new();
    let mut btree = BTreeMap::<Vec<u8>, u16>::new();

    for (key, val) in input.setup {
        art.insert(&key, val);
        btree.insert(key, val);
    }
    for key in input.removals {
        assert_eq!(art.remove(&key), btree.remove(&key));
    }

    for action in input.actions {
        match action {
            ScanAction::IterateAll => {
                let art_items: Vec<_> = art.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
                let btree_items: Vec<_> = btree.iter().map(|(k, v)| (k.clone(), *v)).collect();
                assert_eq!(art_items, btree_items);
            }
            ScanAction::Prefix { prefix } => {
                let art_items: Vec<_> = art
                    .prefix_iter(&prefix)
                    .map(|(k, v)| (k.to_vec(), *v))
                    .collect();
                let btree_items: Vec<_> = btree
                    .range(prefix.clone()..)
                    .take_while(|(k, _)| k.starts_with(&prefix))
                    .map(|(k, v)| (k.clone(), *v))
                    .collect();
                assert_eq!(art_items, btree_items);
            }
            ScanAction::WalkUntil { limit } => {
                let mut seen = 0usize;
                let flow = art.walk(|_, _| {
                    seen += 1;
                    if seen == limit as usize {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                });
                let stopped = limit != 0 && btree.len() >= limit as usize;
                assert_eq!(flow.is_break(), stopped);
                if !stopped {
                    assert_eq!(seen, btree.len());
                }
            }
            ScanAction::MinMax => {
                assert_eq!(
                    art.minimum().map(|(k, v)| (k.to_vec(), *v)),
                    btree.iter().next().map(|(k, v)| (k.clone(), *v))
                );
                assert_eq!(
                    art.maximum().map(|(k, v)| (k.to_vec(), *v)),
                    btree.iter().next_back().map(|(k, v)| (k.clone(), *v))
                );
            }
        }
    }
});
