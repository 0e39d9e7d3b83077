use std::sync::Arc;

use crate::error::ArtError;
use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;
use crate::mapping::NodeMapping;
use crate::partials::Partial;
use crate::tree::MAX_KEY_LEN;

// A class is demoted once a removal leaves it with this many children or fewer.
const NODE16_SHRINK_AT: usize = 3;
const NODE48_SHRINK_AT: usize = 12;
const NODE256_SHRINK_AT: usize = 37;

/// A stored key and its value. The key never changes once the leaf exists; leaves are shared
/// between a tree and its copies.
#[derive(Clone)]
pub(crate) struct Leaf<V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) value: V,
}

impl<V> Leaf<V> {
    /// Copies `key` into a buffer of its own. This is the only allocation on the insert path
    /// that can be reported instead of aborting, so callers make it before touching the tree.
    pub(crate) fn new(key: &[u8], value: V) -> Result<Self, ArtError> {
        if key.len() > MAX_KEY_LEN {
            return Err(ArtError::KeyTooLong { len: key.len() });
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(key.len())
            .map_err(|_| ArtError::AllocationFailed { bytes: key.len() })?;
        buf.extend_from_slice(key);
        Ok(Self {
            key: buf.into_boxed_slice(),
            value,
        })
    }

    #[inline]
    pub(crate) fn matches(&self, key: &[u8]) -> bool {
        *self.key == *key
    }
}

pub(crate) enum Child<V> {
    Leaf(Arc<Leaf<V>>),
    Inner(Box<Node<V>>),
}

impl<V> Clone for Child<V> {
    fn clone(&self) -> Self {
        match self {
            Child::Leaf(leaf) => Child::Leaf(Arc::clone(leaf)),
            Child::Inner(node) => Child::Inner(Box::new(Node::clone(node))),
        }
    }
}

impl<V> Child<V> {
    pub(crate) fn minimum_leaf(&self) -> Option<&Leaf<V>> {
        match self {
            Child::Leaf(leaf) => Some(&**leaf),
            Child::Inner(node) => node.minimum_leaf(),
        }
    }

    pub(crate) fn maximum_leaf(&self) -> Option<&Leaf<V>> {
        match self {
            Child::Leaf(leaf) => Some(&**leaf),
            Child::Inner(node) => node.maximum_leaf(),
        }
    }
}

pub(crate) enum Content<V> {
    Node4(SortedKeyedMapping<Child<V>, 4>),
    Node16(SortedKeyedMapping<Child<V>, 16>),
    Node48(IndexedMapping<Child<V>, 48>),
    Node256(DirectMapping<Child<V>>),
}

impl<V> Content<V> {
    pub(crate) fn class_name(&self) -> &'static str {
        match self {
            Content::Node4(_) => "Node4",
            Content::Node16(_) => "Node16",
            Content::Node48(_) => "Node48",
            Content::Node256(_) => "Node256",
        }
    }

    /// An empty mapping of the same size class.
    fn empty_like(&self) -> Self {
        match self {
            Content::Node4(_) => Content::Node4(SortedKeyedMapping::new()),
            Content::Node16(_) => Content::Node16(SortedKeyedMapping::new()),
            Content::Node48(_) => Content::Node48(IndexedMapping::new()),
            Content::Node256(_) => Content::Node256(DirectMapping::new()),
        }
    }

    pub(crate) fn num_children(&self) -> usize {
        match self {
            Content::Node4(km) => km.num_children(),
            Content::Node16(km) => km.num_children(),
            Content::Node48(im) => im.num_children(),
            Content::Node256(dm) => dm.num_children(),
        }
    }
}

/// An inner node: a compressed prefix, an optional leaf for the key that ends right after that
/// prefix, and the children keyed by the next byte.
pub(crate) struct Node<V> {
    pub(crate) prefix: Partial,
    pub(crate) terminal: Option<Arc<Leaf<V>>>,
    pub(crate) content: Content<V>,
}

// A node being copied: its source, the children still to visit, and the copies made so far.
struct CopyFrame<'a, V> {
    edge: u8,
    src: &'a Node<V>,
    pending: Box<dyn Iterator<Item = (u8, &'a Child<V>)> + 'a>,
    copy: Node<V>,
}

impl<'a, V> CopyFrame<'a, V> {
    fn new(edge: u8, src: &'a Node<V>) -> Self {
        Self {
            edge,
            src,
            pending: src.children(),
            copy: Node {
                prefix: src.prefix,
                terminal: src.terminal.clone(),
                content: src.content.empty_like(),
            },
        }
    }
}

/// Duplicates every inner node beneath `self` and shares the leaves. Walks with an explicit
/// stack, so the depth of the tree is not bounded by the thread's stack.
impl<V> Clone for Node<V> {
    fn clone(&self) -> Self {
        let mut root = CopyFrame::new(0, self);
        let mut stack: Vec<CopyFrame<'_, V>> = Vec::new();
        loop {
            let top = stack.last_mut().unwrap_or(&mut root);
            match top.pending.next() {
                Some((edge, Child::Leaf(leaf))) => {
                    top.copy.add_copied(edge, Child::Leaf(Arc::clone(leaf)));
                }
                Some((edge, Child::Inner(node))) => stack.push(CopyFrame::new(edge, node)),
                None => match stack.pop() {
                    Some(done) => {
                        let parent = stack.last_mut().unwrap_or(&mut root);
                        parent
                            .copy
                            .add_copied(done.edge, Child::Inner(Box::new(done.copy)));
                    }
                    None => {
                        debug_assert_eq!(root.copy.num_children(), root.src.num_children());
                        return root.copy;
                    }
                },
            }
        }
    }
}

impl<V> Node<V> {
    #[inline]
    pub fn new_4(prefix: Partial) -> Self {
        Self {
            prefix,
            terminal: None,
            content: Content::Node4(SortedKeyedMapping::new()),
        }
    }

    #[inline]
    pub(crate) fn class_name(&self) -> &'static str {
        self.content.class_name()
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.content.num_children()
    }

    /// Children plus the terminal leaf, if any.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.num_children() + usize::from(self.terminal.is_some())
    }

    pub(crate) fn capacity(&self) -> usize {
        match &self.content {
            Content::Node4(km) => km.width(),
            Content::Node16(km) => km.width(),
            Content::Node48(im) => im.width(),
            Content::Node256(dm) => dm.width(),
        }
    }

    pub(crate) fn seek_child(&self, key: u8) -> Option<&Child<V>> {
        match &self.content {
            Content::Node4(km) => km.seek_child(key),
            Content::Node16(km) => km.seek_child(key),
            Content::Node48(im) => im.seek_child(key),
            Content::Node256(dm) => dm.seek_child(key),
        }
    }

    pub(crate) fn seek_child_mut(&mut self, key: u8) -> Option<&mut Child<V>> {
        match &mut self.content {
            Content::Node4(km) => km.seek_child_mut(key),
            Content::Node16(km) => km.seek_child_mut(key),
            Content::Node48(im) => im.seek_child_mut(key),
            Content::Node256(dm) => dm.seek_child_mut(key),
        }
    }

    /// Adds a child under a key byte that is not present yet, promoting the node first if it is
    /// full.
    pub(crate) fn add_child(&mut self, key: u8, child: Child<V>) {
        debug_assert!(self.seek_child(key).is_none());
        if self.is_full() {
            self.grow();
        }

        match &mut self.content {
            Content::Node4(km) => km.add_child(key, child),
            Content::Node16(km) => km.add_child(key, child),
            Content::Node48(im) => im.add_child(key, child),
            Content::Node256(dm) => dm.add_child(key, child),
        }
    }

    /// Adds a child to a copy under construction. Children arrive in key order and never
    /// outnumber the class they were copied from.
    fn add_copied(&mut self, key: u8, child: Child<V>) {
        match &mut self.content {
            Content::Node4(km) => km.add_child(key, child),
            Content::Node16(km) => km.add_child(key, child),
            Content::Node48(im) => im.add_child(key, child),
            Content::Node256(dm) => dm.add_child(key, child),
        }
    }

    /// Removes the child under `key`, demoting the node if it has become sparse for its class.
    /// Collapsing a Node4 down to its last entry is left to the caller, who owns the slot the
    /// node lives in (see [`Node::take_collapsed`]).
    pub(crate) fn delete_child(&mut self, key: u8) -> Option<Child<V>> {
        let removed = match &mut self.content {
            Content::Node4(km) => km.delete_child(key),
            Content::Node16(km) => km.delete_child(key),
            Content::Node48(im) => im.delete_child(key),
            Content::Node256(dm) => dm.delete_child(key),
        }?;
        self.shrink();
        Some(removed)
    }

    #[inline]
    fn is_full(&self) -> bool {
        match &self.content {
            Content::Node4(km) => km.is_full(),
            Content::Node16(km) => km.is_full(),
            Content::Node48(im) => im.is_full(),
            Content::Node256(_) => false,
        }
    }

    fn grow(&mut self) {
        let grown = match &mut self.content {
            Content::Node4(km) => Content::Node16(SortedKeyedMapping::from_resized(km)),
            Content::Node16(km) => Content::Node48(IndexedMapping::from_sorted_keyed(km)),
            Content::Node48(im) => Content::Node256(DirectMapping::from_indexed(im)),
            Content::Node256(_) => unreachable!("a Node256 has a slot for every key byte"),
        };
        trace_log!(
            from = self.content.class_name(),
            to = grown.class_name(),
            children = grown.num_children(),
            "promoted node"
        );
        self.content = grown;
    }

    fn shrink(&mut self) {
        let shrunk = match &mut self.content {
            Content::Node16(km) if km.num_children() <= NODE16_SHRINK_AT => {
                Content::Node4(SortedKeyedMapping::from_resized(km))
            }
            Content::Node48(im) if im.num_children() <= NODE48_SHRINK_AT => {
                Content::Node16(SortedKeyedMapping::from_indexed(im))
            }
            Content::Node256(dm) if dm.num_children() <= NODE256_SHRINK_AT => {
                Content::Node48(IndexedMapping::from_direct(dm))
            }
            _ => return,
        };
        trace_log!(
            from = self.content.class_name(),
            to = shrunk.class_name(),
            children = shrunk.num_children(),
            "demoted node"
        );
        self.content = shrunk;
    }

    /// A Node4 left with a single entry is replaced by that entry. Returns the replacement for
    /// the slot holding this node, or `None` if the node stays.
    ///
    /// When the survivor is an inner node it inherits this node's prefix, the edge byte leading
    /// to it, and its own prefix, in that order. Bytes past the inline bound are dropped; the
    /// exact length is kept, so later comparisons fall back to a leaf for them.
    pub(crate) fn take_collapsed(&mut self) -> Option<Child<V>> {
        if self.num_entries() != 1 {
            return None;
        }
        let Content::Node4(km) = &mut self.content else {
            return None;
        };
        if let Some(leaf) = self.terminal.take() {
            trace_log!(prefix_len = self.prefix.len(), "collapsed Node4 into its terminal leaf");
            return Some(Child::Leaf(leaf));
        }
        let (edge, child) = km.take_only_child()?;
        Some(match child {
            Child::Leaf(leaf) => {
                trace_log!(edge, "collapsed Node4 into its only leaf");
                Child::Leaf(leaf)
            }
            Child::Inner(mut node) => {
                node.prefix = self.prefix.extended_with(edge, &node.prefix);
                trace_log!(
                    edge,
                    prefix_len = node.prefix.len(),
                    "collapsed Node4 into its only child"
                );
                Child::Inner(node)
            }
        })
    }

    /// The first child, in key order, at iteration position `pos` or later, together with the
    /// position to resume from.
    pub(crate) fn child_at_or_after(&self, pos: usize) -> Option<(usize, &Child<V>)> {
        let found = match &self.content {
            Content::Node4(km) => km.child_at_or_after(pos),
            Content::Node16(km) => km.child_at_or_after(pos),
            Content::Node48(im) => im.child_at_or_after(pos),
            Content::Node256(dm) => dm.child_at_or_after(pos),
        };
        found.map(|(pos, _, child)| (pos + 1, child))
    }

    /// Children in ascending key-byte order.
    pub fn children(&self) -> Box<dyn Iterator<Item = (u8, &Child<V>)> + '_> {
        match &self.content {
            Content::Node4(km) => Box::new(km.iter()),
            Content::Node16(km) => Box::new(km.iter()),
            Content::Node48(im) => Box::new(im.iter()),
            Content::Node256(dm) => Box::new(dm.iter()),
        }
    }

    /// The leaf with the smallest key beneath this node.
    pub(crate) fn minimum_leaf(&self) -> Option<&Leaf<V>> {
        if let Some(leaf) = &self.terminal {
            return Some(&**leaf);
        }
        let first = match &self.content {
            Content::Node4(km) => km.first_child(),
            Content::Node16(km) => km.first_child(),
            Content::Node48(im) => im.first_child(),
            Content::Node256(dm) => dm.first_child(),
        };
        first.and_then(|(_, child)| child.minimum_leaf())
    }

    /// The leaf with the largest key beneath this node.
    pub(crate) fn maximum_leaf(&self) -> Option<&Leaf<V>> {
        let last = match &self.content {
            Content::Node4(km) => km.last_child(),
            Content::Node16(km) => km.last_child(),
            Content::Node48(im) => im.last_child(),
            Content::Node256(dm) => dm.last_child(),
        };
        match last {
            Some((_, child)) => child.maximum_leaf(),
            None => self.terminal.as_deref(),
        }
    }

    /// Compares only the stored prefix bytes against `key` at `depth`, never the bytes past the
    /// inline bound. A `true` result can be a false positive when the prefix is truncated, so
    /// callers must still compare the full key at the leaf. Use [`Node::prefix_mismatch`] for an
    /// exact answer.
    #[inline]
    pub(crate) fn check_prefix_optimistic(&self, key: &[u8], depth: usize) -> bool {
        let rest = &key[depth..];
        rest.len() >= self.prefix.len()
            && self.prefix.prefix_length_slice(rest) == self.prefix.stored().len()
    }

    /// Number of leading prefix bytes that match `key` from `depth`, at most the prefix length.
    /// Bytes past the inline bound are read from the subtree's minimum leaf, which shares the
    /// whole prefix.
    pub(crate) fn prefix_mismatch(&self, key: &[u8], depth: usize) -> usize {
        let rest = &key[depth..];
        let idx = self.prefix.prefix_length_slice(rest);
        if idx < self.prefix.stored().len() || !self.prefix.is_truncated() {
            return idx;
        }
        let Some(leaf) = self.minimum_leaf() else {
            return idx;
        };
        leaf.key[depth..]
            .iter()
            .zip(rest)
            .take(self.prefix.len())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// The full prefix bytes from `start` up to the prefix length, reading truncated bytes from
    /// the minimum leaf. `depth` is where this node's prefix begins in every key beneath it.
    pub(crate) fn prefix_after(&self, depth: usize, start: usize) -> Partial {
        if !self.prefix.is_truncated() {
            return self.prefix.partial_after(start);
        }
        let len = self.prefix.len() - start;
        match self.minimum_leaf() {
            Some(leaf) => Partial::from_parts(&leaf.key[depth + start..], len),
            None => unreachable!("an inner node always has at least one entry"),
        }
    }

    /// The prefix byte at `pos`, reading the minimum leaf when it is not stored.
    pub(crate) fn prefix_byte(&self, depth: usize, pos: usize) -> u8 {
        match self.prefix.stored().get(pos) {
            Some(b) => *b,
            None => match self.minimum_leaf() {
                Some(leaf) => leaf.key[depth + pos],
                None => unreachable!("an inner node always has at least one entry"),
            },
        }
    }
}
