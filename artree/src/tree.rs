//! Adaptive Radix Tree implementation.
//!
//! This module contains the main [`AdaptiveRadixTree`] implementation: lookup, insertion and
//! removal, callback and pull-style traversal, and cheap copies.

use std::alloc::{handle_alloc_error, Layout};
use std::fmt;
use std::mem;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::error::ArtError;
use crate::iter::Iter;
use crate::node::{Child, Leaf, Node};
use crate::partials::Partial;

/// Longest key the tree accepts, in bytes.
pub const MAX_KEY_LEN: usize = u32::MAX as usize;

/// An ordered map from byte strings to values, stored as an Adaptive Radix Tree.
///
/// Inner nodes come in four size classes (4, 16, 48 and 256 children) and switch class as their
/// fan-out changes. Chains of single-child nodes are folded into a compressed prefix on the node
/// below them.
///
/// Keys are arbitrary byte strings, including ones that are byte-prefixes of other keys and ones
/// containing `0x00`. Iteration is always in ascending lexicographic byte order.
///
/// ## Copies
///
/// [`copy`](AdaptiveRadixTree::copy) (and `Clone`) duplicates the inner nodes but shares the
/// leaves, so it costs one allocation per inner node and nothing per key. Leaves are
/// reference-counted and never mutated while shared: overwriting or removing a key in one tree
/// is invisible to the other. The mutating operations need `V: Clone` for the case where a value
/// has to be taken out of a leaf that is still shared.
///
/// ## Examples
///
/// ```rust
/// use artree::AdaptiveRadixTree;
///
/// let mut tree = AdaptiveRadixTree::new();
/// tree.insert("apple", 1);
/// tree.insert("app", 2);
/// tree.insert("apply", 3);
///
/// assert_eq!(tree.get("app"), Some(&2));
/// assert_eq!(tree.len(), 3);
///
/// let keys: Vec<&[u8]> = tree.prefix_iter("app").map(|(k, _)| k).collect();
/// assert_eq!(keys, vec![&b"app"[..], b"apple", b"apply"]);
/// ```
///
/// Early exit from a traversal:
///
/// ```rust
/// use std::ops::ControlFlow;
/// use artree::AdaptiveRadixTree;
///
/// let tree: AdaptiveRadixTree<u32> = (0u32..100).map(|i| (i.to_be_bytes(), i)).collect();
/// let first_big = tree.walk(|_key, value| {
///     if *value > 41 {
///         ControlFlow::Break(*value)
///     } else {
///         ControlFlow::Continue(())
///     }
/// });
/// assert_eq!(first_big, ControlFlow::Break(42));
/// ```
pub struct AdaptiveRadixTree<V> {
    root: Option<Child<V>>,
    num_keys: usize,
}

impl<V> Default for AdaptiveRadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AdaptiveRadixTree<V> {
    /// Create a new empty Adaptive Radix Tree.
    pub fn new() -> Self {
        Self {
            root: None,
            num_keys: 0,
        }
    }

    /// Number of keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_keys
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    /// Get a value by key.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&V> {
        let key = key.as_ref();
        let mut cur = self.root.as_ref()?;
        let mut depth = 0;
        loop {
            match cur {
                Child::Leaf(leaf) => {
                    return leaf.matches(key).then_some(&leaf.value);
                }
                Child::Inner(node) => {
                    // Only the stored prefix bytes are checked on the way down; the leaf
                    // comparison at the end catches anything hidden in a truncated prefix.
                    if !node.check_prefix_optimistic(key, depth) {
                        return None;
                    }
                    depth += node.prefix.len();
                    if depth == key.len() {
                        return node
                            .terminal
                            .as_ref()
                            .filter(|leaf| leaf.matches(key))
                            .map(|leaf| &leaf.value);
                    }
                    cur = node.seek_child(key[depth])?;
                    depth += 1;
                }
            }
        }
    }

    /// True if `key` is present.
    #[inline]
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// The entry with the smallest key.
    pub fn minimum(&self) -> Option<(&[u8], &V)> {
        self.root
            .as_ref()?
            .minimum_leaf()
            .map(|leaf| (&*leaf.key, &leaf.value))
    }

    /// The entry with the largest key.
    pub fn maximum(&self) -> Option<(&[u8], &V)> {
        self.root
            .as_ref()?
            .maximum_leaf()
            .map(|leaf| (&*leaf.key, &leaf.value))
    }

    /// Visit every entry in ascending key order until `f` breaks. The break value is returned
    /// unchanged; `Continue(())` means every entry was visited.
    pub fn walk<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&[u8], &V) -> ControlFlow<B>,
    {
        match &self.root {
            Some(root) => Self::walk_child(root, &mut f),
            None => ControlFlow::Continue(()),
        }
    }

    /// Like [`walk`](Self::walk), restricted to the keys that start with `prefix`.
    pub fn walk_prefix<P, B, F>(&self, prefix: P, mut f: F) -> ControlFlow<B>
    where
        P: AsRef<[u8]>,
        F: FnMut(&[u8], &V) -> ControlFlow<B>,
    {
        match self.seek_prefix(prefix.as_ref()) {
            Some(subtree) => Self::walk_child(subtree, &mut f),
            None => ControlFlow::Continue(()),
        }
    }

    /// Pull-style iterator over all entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        debug_log!(keys = self.num_keys, "created iterator");
        Iter::new(self.root.as_ref())
    }

    /// Pull-style iterator over the entries whose key starts with `prefix`.
    pub fn prefix_iter<P: AsRef<[u8]>>(&self, prefix: P) -> Iter<'_, V> {
        debug_log!(prefix_len = prefix.as_ref().len(), "created prefix iterator");
        Iter::new(self.seek_prefix(prefix.as_ref()))
    }

    /// A second tree holding the same entries. Inner nodes are duplicated, leaves are shared.
    pub fn copy(&self) -> Self {
        debug_log!(keys = self.num_keys, "copied tree");
        Self {
            root: self.root.clone(),
            num_keys: self.num_keys,
        }
    }

    pub(crate) fn root(&self) -> Option<&Child<V>> {
        self.root.as_ref()
    }

    fn walk_child<B, F>(child: &Child<V>, f: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&[u8], &V) -> ControlFlow<B>,
    {
        match child {
            Child::Leaf(leaf) => f(&*leaf.key, &leaf.value),
            Child::Inner(node) => {
                if let Some(leaf) = &node.terminal {
                    if let ControlFlow::Break(b) = f(&*leaf.key, &leaf.value) {
                        return ControlFlow::Break(b);
                    }
                }
                node.children()
                    .try_for_each(|(_, child)| Self::walk_child(child, &mut *f))
            }
        }
    }

    /// The subtree holding exactly the keys that start with `prefix`, if any do.
    fn seek_prefix(&self, prefix: &[u8]) -> Option<&Child<V>> {
        let mut cur = self.root.as_ref()?;
        let mut depth = 0;
        loop {
            match cur {
                Child::Leaf(leaf) => return leaf.key.starts_with(prefix).then_some(cur),
                Child::Inner(node) => {
                    let matched = node.prefix_mismatch(prefix, depth);
                    if depth + matched == prefix.len() {
                        return Some(cur);
                    }
                    if matched < node.prefix.len() {
                        return None;
                    }
                    depth += node.prefix.len();
                    cur = node.seek_child(prefix[depth])?;
                    depth += 1;
                }
            }
        }
    }
}

impl<V: Clone> AdaptiveRadixTree<V> {
    /// Insert a key-value pair, returning the previous value if the key was already present.
    ///
    /// # Panics
    ///
    /// Panics if the key is longer than [`MAX_KEY_LEN`]. If the key buffer cannot be allocated
    /// this calls [`handle_alloc_error`], like the standard collections do.
    ///
    /// ```rust
    /// use artree::AdaptiveRadixTree;
    ///
    /// let mut tree = AdaptiveRadixTree::new();
    /// assert_eq!(tree.insert("key1", 100), None);
    /// assert_eq!(tree.insert("key1", 200), Some(100));
    /// assert_eq!(tree.get("key1"), Some(&200));
    /// ```
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(old) => old,
            Err(ArtError::AllocationFailed { bytes }) => handle_alloc_error(
                Layout::array::<u8>(bytes).unwrap_or_else(|_| Layout::new::<u8>()),
            ),
            Err(e @ ArtError::KeyTooLong { .. }) => panic!("{e}"),
        }
    }

    /// Fallible form of [`insert`](Self::insert). On error the tree is unchanged and `value` is
    /// dropped.
    pub fn try_insert<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Result<Option<V>, ArtError> {
        let key = key.as_ref();
        let leaf = match Leaf::new(key, value) {
            Ok(leaf) => Arc::new(leaf),
            Err(e) => {
                warn_log!(len = key.len(), error = %e, "rejected insert");
                return Err(e);
            }
        };

        let old = if let Some(root) = self.root.as_mut() {
            Self::insert_at(root, key, leaf, 0)
        } else {
            self.root = Some(Child::Leaf(leaf));
            None
        };
        if old.is_none() {
            self.num_keys += 1;
        }
        Ok(old)
    }

    /// Get a mutable reference to a value by key. If the leaf is shared with a copy of this tree,
    /// it is un-shared first.
    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Option<&mut V> {
        Self::get_mut_at(self.root.as_mut()?, key.as_ref(), 0)
    }

    /// Remove a key, returning its value.
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<V> {
        let key = key.as_ref();
        let removed = match &mut self.root {
            None => return None,
            Some(Child::Leaf(leaf)) => {
                if !leaf.matches(key) {
                    return None;
                }
                match self.root.take() {
                    Some(Child::Leaf(leaf)) => leaf,
                    _ => unreachable!("root was just matched as a leaf"),
                }
            }
            Some(root) => Self::remove_at(root, key, 0)?,
        };
        self.num_keys -= 1;
        Some(Self::into_value(removed))
    }

    fn insert_at(slot: &mut Child<V>, key: &[u8], new_leaf: Arc<Leaf<V>>, depth: usize) -> Option<V> {
        let node = match slot {
            Child::Leaf(existing) => {
                if existing.matches(key) {
                    return Some(Self::replace_leaf(existing, new_leaf));
                }
                // Two distinct keys meet: a Node4 holding their common part takes the slot.
                let common = existing.key[depth..]
                    .iter()
                    .zip(&key[depth..])
                    .take_while(|(a, b)| a == b)
                    .count();
                let split = depth + common;
                let existing_edge = existing.key.get(split).copied();
                trace_log!(depth, prefix_len = common, "split leaf");

                let prefix = Partial::from_slice(&key[depth..split]);
                let existing = mem::replace(slot, Child::Inner(Box::new(Node::new_4(prefix))));
                let Child::Inner(node) = slot else {
                    unreachable!("slot was just replaced by an inner node")
                };
                node.attach(existing_edge, existing);
                node.attach(key.get(split).copied(), Child::Leaf(new_leaf));
                return None;
            }
            Child::Inner(node) => node,
        };

        let prefix_len = node.prefix.len();
        let mismatch = node.prefix_mismatch(key, depth);
        if mismatch < prefix_len {
            // The key leaves this node's prefix part way through. Split the prefix: a new Node4
            // keeps the shared part, the old node keeps what follows the diverging byte.
            trace_log!(depth, prefix_len, mismatch, "split prefix");
            let node_edge = node.prefix_byte(depth, mismatch);
            let parent_prefix = node.prefix.partial_before(mismatch);
            node.prefix = node.prefix_after(depth, mismatch + 1);

            let old = mem::replace(slot, Child::Inner(Box::new(Node::new_4(parent_prefix))));
            let Child::Inner(parent) = slot else {
                unreachable!("slot was just replaced by an inner node")
            };
            parent.attach(Some(node_edge), old);
            parent.attach(key.get(depth + mismatch).copied(), Child::Leaf(new_leaf));
            return None;
        }

        let depth = depth + prefix_len;
        if depth == key.len() {
            return if let Some(existing) = node.terminal.as_mut() {
                debug_assert!(existing.matches(key));
                Some(Self::replace_leaf(existing, new_leaf))
            } else {
                node.terminal = Some(new_leaf);
                None
            };
        }

        let edge = key[depth];
        if let Some(child) = node.seek_child_mut(edge) {
            return Self::insert_at(child, key, new_leaf, depth + 1);
        }
        node.add_child(edge, Child::Leaf(new_leaf));
        None
    }

    /// Puts the new leaf's value in place of the existing one and returns the old value.
    fn replace_leaf(existing: &mut Arc<Leaf<V>>, new_leaf: Arc<Leaf<V>>) -> V {
        match Arc::get_mut(existing) {
            Some(leaf) => mem::replace(&mut leaf.value, Self::into_value(new_leaf)),
            // Shared with a copy: this tree gets the new leaf, the copy keeps the old one.
            None => Self::into_value(mem::replace(existing, new_leaf)),
        }
    }

    fn into_value(leaf: Arc<Leaf<V>>) -> V {
        match Arc::try_unwrap(leaf) {
            Ok(leaf) => leaf.value,
            Err(shared) => shared.value.clone(),
        }
    }

    fn get_mut_at<'a>(slot: &'a mut Child<V>, key: &[u8], depth: usize) -> Option<&'a mut V> {
        let node = match slot {
            Child::Leaf(leaf) => {
                return if leaf.matches(key) {
                    Some(&mut Arc::make_mut(leaf).value)
                } else {
                    None
                };
            }
            Child::Inner(node) => node,
        };
        if !node.check_prefix_optimistic(key, depth) {
            return None;
        }
        let depth = depth + node.prefix.len();
        if depth == key.len() {
            let leaf = node.terminal.as_mut().filter(|leaf| leaf.matches(key))?;
            return Some(&mut Arc::make_mut(leaf).value);
        }
        Self::get_mut_at(node.seek_child_mut(key[depth])?, key, depth + 1)
    }

    /// Removes `key` from beneath the inner node in `slot`. A Node4 left with a single entry is
    /// replaced in `slot` by that entry.
    fn remove_at(slot: &mut Child<V>, key: &[u8], depth: usize) -> Option<Arc<Leaf<V>>> {
        let Child::Inner(node) = slot else {
            return None;
        };
        let prefix_len = node.prefix.len();
        if node.prefix_mismatch(key, depth) != prefix_len {
            return None;
        }
        let depth = depth + prefix_len;

        let removed = if depth == key.len() {
            if !node.terminal.as_ref().is_some_and(|leaf| leaf.matches(key)) {
                return None;
            }
            node.terminal.take()?
        } else {
            let edge = key[depth];
            let child = node.seek_child_mut(edge)?;
            if let Child::Leaf(leaf) = child {
                if !leaf.matches(key) {
                    return None;
                }
                match node.delete_child(edge) {
                    Some(Child::Leaf(leaf)) => leaf,
                    _ => unreachable!("child was just matched as a leaf"),
                }
            } else {
                Self::remove_at(child, key, depth + 1)?
            }
        };

        if let Some(replacement) = node.take_collapsed() {
            *slot = replacement;
        }
        Some(removed)
    }
}

impl<V> Node<V> {
    /// Places an entry of a freshly split node: under its next key byte, or in the terminal slot
    /// when its key ends here.
    fn attach(&mut self, edge: Option<u8>, child: Child<V>) {
        match (edge, child) {
            (Some(edge), child) => self.add_child(edge, child),
            (None, Child::Leaf(leaf)) => self.terminal = Some(leaf),
            (None, Child::Inner(_)) => unreachable!("an inner node always has a next key byte"),
        }
    }
}

impl<V> Clone for AdaptiveRadixTree<V> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<V: fmt::Debug> fmt::Debug for AdaptiveRadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a AdaptiveRadixTree<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<[u8]>, V: Clone> FromIterator<(K, V)> for AdaptiveRadixTree<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: AsRef<[u8]>, V: Clone> Extend<(K, V)> for AdaptiveRadixTree<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
