#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artree::AdaptiveRadixTree;

#[derive(Arbitrary, Debug)]
enum MapMethod {
    Get { key: Vec<u8> },
    Insert { key: Vec<u8>, val: usize },
    Update { key: Vec<u8>, val: usize },
    Delete { key: Vec<u8> },
    Copy,
}

fuzz_target!(|methods: Vec<MapMethod>| {
    let mut art = AdaptiveRadixTree::<usize>::new();
    let mut bt_map = BTreeMap::<Vec<u8>, usize>::new();
    let mut copies = Vec::new();

    for m in methods {
        match m {
            MapMethod::Get { key } => {
                assert_eq!(art.get(&key).copied(), bt_map.get(&key).copied());
            }
            MapMethod::Insert { key, val } => {
                let a_insert = art.insert(&key, val);
                let btree_insert = bt_map.insert(key, val);
                assert_eq!(a_insert, btree_insert);
            }
            MapMethod::Update { key, val } => {
                let old_bt = bt_map.get_mut(&key);
                let old_art = art.get_mut(&key);
                assert_eq!(old_art, old_bt);

                if let (Some(old_bt), Some(old_art)) = (old_bt, old_art) {
                    *old_bt = val;
                    *old_art = val;
                }
                assert_eq!(art.get(&key), bt_map.get(&key));
            }
            MapMethod::Delete { key } => {
                assert_eq!(art.remove(&key), bt_map.remove(&key));
            }
            MapMethod::Copy => copies.push((art.copy(), bt_map.clone())),
        }
        assert_eq!(art.len(), bt_map.len());
    }

    copies.push((art, bt_map));
    for (art, bt_map) in &copies {
        let art_items: Vec<_> = art.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
        let bt_items: Vec<_> = bt_map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(art_items, bt_items);
    }
});
