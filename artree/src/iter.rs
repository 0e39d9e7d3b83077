use std::iter::FusedIterator;

use crate::node::{Child, Leaf, Node};

struct Frame<'a, V> {
    node: &'a Node<V>,
    // 0: the terminal leaf is next. n > 0: resume the child scan at mapping position n - 1.
    pos: usize,
}

/// Pull-style iterator over `(key, value)` pairs in ascending key order.
///
/// Returned by [`AdaptiveRadixTree::iter`](crate::AdaptiveRadixTree::iter) and
/// [`AdaptiveRadixTree::prefix_iter`](crate::AdaptiveRadixTree::prefix_iter). It keeps one frame
/// per inner node on the current path instead of recursing, and yields the same sequence as
/// [`AdaptiveRadixTree::walk`](crate::AdaptiveRadixTree::walk).
pub struct Iter<'a, V> {
    stack: Vec<Frame<'a, V>>,
    // A subtree that is a single leaf has no frame to live in.
    lone_leaf: Option<&'a Leaf<V>>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(subtree: Option<&'a Child<V>>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            lone_leaf: None,
        };
        match subtree {
            Some(Child::Leaf(leaf)) => iter.lone_leaf = Some(&**leaf),
            Some(Child::Inner(node)) => iter.stack.push(Frame { node, pos: 0 }),
            None => {}
        }
        iter
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(leaf) = self.lone_leaf.take() {
            return Some((&*leaf.key, &leaf.value));
        }
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;

            if frame.pos == 0 {
                frame.pos = 1;
                if let Some(leaf) = &node.terminal {
                    return Some((&*leaf.key, &leaf.value));
                }
                continue;
            }

            let Some((resume, child)) = node.child_at_or_after(frame.pos - 1) else {
                self.stack.pop();
                continue;
            };
            frame.pos = resume + 1;
            match child {
                Child::Leaf(leaf) => return Some((&*leaf.key, &leaf.value)),
                Child::Inner(inner) => self.stack.push(Frame {
                    node: inner,
                    pos: 0,
                }),
            }
        }
    }
}

impl<V> FusedIterator for Iter<'_, V> {}
