//! `try_insert` under allocation failure. The global allocator here refuses the next allocation
//! made by the current thread once armed.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::rc::Rc;

use artree::{AdaptiveRadixTree, ArtError};

struct FailingAlloc;

thread_local! {
    static FAIL_NEXT: Cell<bool> = const { Cell::new(false) };
}

fn take_armed() -> bool {
    FAIL_NEXT.try_with(|armed| armed.replace(false)).unwrap_or(false)
}

fn arm() {
    FAIL_NEXT.with(|armed| armed.set(true));
}

unsafe impl GlobalAlloc for FailingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if take_armed() {
            return std::ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: FailingAlloc = FailingAlloc;

fn entries(tree: &AdaptiveRadixTree<Rc<u32>>) -> Vec<(Vec<u8>, u32)> {
    tree.iter().map(|(k, v)| (k.to_vec(), **v)).collect()
}

#[test]
fn try_insert_reports_previous_value() {
    let mut tree = AdaptiveRadixTree::new();
    assert_eq!(tree.try_insert("key", 1), Ok(None));
    assert_eq!(tree.try_insert("key", 2), Ok(Some(1)));
    assert_eq!(tree.try_insert("keys", 3), Ok(None));
    assert_eq!(tree.get("key"), Some(&2));
    assert_eq!(tree.len(), 2);
}

#[test]
fn failed_key_allocation_leaves_tree_unchanged() {
    let mut tree = AdaptiveRadixTree::new();
    for (i, key) in ["foo", "foobar", "foobaz", "bar"].into_iter().enumerate() {
        tree.insert(key, Rc::new(i as u32));
    }
    let before = entries(&tree);

    let value = Rc::new(99);
    // A new key that would split "foobar"/"foobaz", and an existing key.
    for key in ["fooba", "foo"] {
        arm();
        let result = tree.try_insert(key, Rc::clone(&value));
        assert!(
            matches!(result, Err(ArtError::AllocationFailed { bytes }) if bytes == key.len()),
            "{key}"
        );
        // The rejected value was dropped, not stored.
        assert_eq!(Rc::strong_count(&value), 1);
    }

    assert_eq!(tree.len(), 4);
    assert_eq!(entries(&tree), before);
    assert_eq!(tree.get("fooba"), None);
    assert_eq!(tree.get("foo").map(|v| **v), Some(0));

    // The tree still takes inserts normally afterwards.
    assert_eq!(tree.try_insert("fooba", Rc::clone(&value)), Ok(None));
    assert_eq!(tree.len(), 5);
}
