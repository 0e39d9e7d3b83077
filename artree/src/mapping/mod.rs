//! Child containers for the four node size classes.
//!
//! Each container maps a key byte to a child and reports its children in ascending key order.
//! Iteration positions are opaque to callers: they are only ever fed back into
//! [`NodeMapping::child_at_or_after`], which is what the pull iterator stores in its frames.

pub mod direct_mapping;
pub mod indexed_mapping;
pub mod sorted_keyed_mapping;

pub trait NodeMapping<N, const NUM_CHILDREN: usize> {
    fn add_child(&mut self, key: u8, node: N);
    fn seek_child(&self, key: u8) -> Option<&N>;
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N>;
    fn delete_child(&mut self, key: u8) -> Option<N>;
    fn num_children(&self) -> usize;
    /// The first child, in key order, whose position is `pos` or later. Returns that position
    /// along with the child's key byte.
    fn child_at_or_after(&self, pos: usize) -> Option<(usize, u8, &N)>;
    /// The child with the largest key byte.
    fn last_child(&self) -> Option<(u8, &N)>;
    fn width(&self) -> usize {
        NUM_CHILDREN
    }
    fn is_full(&self) -> bool {
        self.num_children() >= self.width()
    }
    fn first_child(&self) -> Option<(u8, &N)> {
        self.child_at_or_after(0).map(|(_, key, node)| (key, node))
    }
}
