use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::NodeMapping;
use crate::utils::u8_keys::{
    u8_keys_find_insert_position_sorted, u8_keys_find_key_position_sorted,
};

/// Maps a key to a node, using a sorted array of keys and a corresponding array of nodes.
/// The first `num_children` slots of both arrays are live; everything after is empty.
/// Keeping the keys sorted gives ordered iteration and min/max for free, at the cost of shifting
/// neighbours on every insert and delete. At width 16 the key search is a single SIMD compare on
/// platforms that have it.
#[derive(Clone)]
pub struct SortedKeyedMapping<N, const WIDTH: usize> {
    pub(crate) keys: [u8; WIDTH],
    pub(crate) children: Box<[Option<N>; WIDTH]>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for SortedKeyedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> SortedKeyedMapping<N, WIDTH> {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys: [0; WIDTH],
            children: Box::new([const { None }; WIDTH]),
            num_children: 0,
        }
    }

    /// Moves the children of a mapping of another width into a new one. Used both to grow
    /// (4 -> 16) and to shrink (16 -> 4); the source is left empty.
    pub fn from_resized<const OLD_WIDTH: usize>(km: &mut SortedKeyedMapping<N, OLD_WIDTH>) -> Self {
        assert!(km.num_children as usize <= WIDTH);
        let mut new = SortedKeyedMapping::new();
        for i in 0..km.num_children as usize {
            new.keys[i] = km.keys[i];
            new.children[i] = km.children[i].take();
        }
        new.num_children = km.num_children;
        km.num_children = 0;
        new
    }

    /// Drains a Node48 mapping, which already yields its children in key order.
    pub fn from_indexed<const IDX_WIDTH: usize>(im: &mut IndexedMapping<N, IDX_WIDTH>) -> Self {
        let mut new = SortedKeyedMapping::new();
        for (key, node) in im.drain() {
            let i = new.num_children as usize;
            new.keys[i] = key;
            new.children[i] = Some(node);
            new.num_children += 1;
        }
        new
    }

    /// Remove and return the only child. Used when a Node4 collapses into its last child.
    pub fn take_only_child(&mut self) -> Option<(u8, N)> {
        if self.num_children != 1 {
            return None;
        }
        self.num_children = 0;
        self.children[0].take().map(|node| (self.keys[0], node))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u8, &N)> {
        self.keys[..self.num_children as usize]
            .iter()
            .zip(self.children.iter())
            .filter_map(|(key, node)| node.as_ref().map(|node| (*key, node)))
    }

    /// Removes every child, in key order.
    pub fn drain(&mut self) -> impl Iterator<Item = (u8, N)> + '_ {
        let live = self.num_children as usize;
        self.num_children = 0;
        self.keys[..live]
            .iter()
            .zip(self.children.iter_mut())
            .filter_map(|(key, node)| node.take().map(|node| (*key, node)))
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for SortedKeyedMapping<N, WIDTH> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let num_children = self.num_children as usize;
        assert!(num_children < WIDTH, "add_child: no space left");
        let idx = u8_keys_find_insert_position_sorted::<WIDTH>(key, &self.keys, num_children);

        // Shift everything at and after the insertion point one slot to the right.
        self.keys.copy_within(idx..num_children, idx + 1);
        self.children[idx..=num_children].rotate_right(1);

        self.keys[idx] = key;
        self.children[idx] = Some(node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        self.children[idx].as_ref()
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        self.children[idx].as_mut()
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let num_children = self.num_children as usize;
        let idx = u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, num_children)?;

        let node = self.children[idx].take();

        // Shift keys and children to the left over the hole.
        self.keys.copy_within(idx + 1..num_children, idx);
        self.children[idx..num_children].rotate_left(1);
        self.keys[num_children - 1] = 0;

        self.num_children -= 1;
        node
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn child_at_or_after(&self, pos: usize) -> Option<(usize, u8, &N)> {
        if pos >= self.num_children as usize {
            return None;
        }
        self.children[pos]
            .as_ref()
            .map(|node| (pos, self.keys[pos], node))
    }

    fn last_child(&self) -> Option<(u8, &N)> {
        let last = (self.num_children as usize).checked_sub(1)?;
        self.children[last]
            .as_ref()
            .map(|node| (self.keys[last], node))
    }
}
