use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;
use crate::mapping::NodeMapping;
use crate::utils::bitset::Bitset64;

// A mapping from keys to separate child slots. `child_ptr_indexes` holds, per key byte, 0 for
// "no child" or the child's slot index plus one.
#[derive(Clone)]
pub struct IndexedMapping<N, const WIDTH: usize> {
    child_ptr_indexes: Box<[u8; 256]>,
    children: Box<[Option<N>; WIDTH]>,
    occupied: Bitset64<1>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for IndexedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> IndexedMapping<N, WIDTH> {
    pub fn new() -> Self {
        assert!(WIDTH <= 64, "slot occupancy is tracked in a single word");
        Self {
            child_ptr_indexes: Box::new([0; 256]),
            children: Box::new([const { None }; WIDTH]),
            occupied: Bitset64::new(),
            num_children: 0,
        }
    }

    pub fn from_direct(dm: &mut DirectMapping<N>) -> Self {
        let mut indexed = IndexedMapping::new();
        for (key, child) in dm.drain() {
            indexed.add_child(key, child);
        }
        indexed
    }

    pub fn from_sorted_keyed<const KM_WIDTH: usize>(
        km: &mut SortedKeyedMapping<N, KM_WIDTH>,
    ) -> Self {
        let mut im: IndexedMapping<N, WIDTH> = IndexedMapping::new();
        for (key, child) in km.drain() {
            im.add_child(key, child);
        }
        im
    }

    #[inline]
    fn slot_of(&self, key: u8) -> Option<usize> {
        match self.child_ptr_indexes[key as usize] {
            0 => None,
            idx => Some(idx as usize - 1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &N)> {
        self.child_ptr_indexes
            .iter()
            .enumerate()
            .filter(|(_, idx)| **idx != 0)
            .filter_map(move |(key, idx)| {
                self.children[*idx as usize - 1]
                    .as_ref()
                    .map(|child| (key as u8, child))
            })
    }

    /// Removes every child, in key order.
    pub fn drain(&mut self) -> impl Iterator<Item = (u8, N)> + '_ {
        self.num_children = 0;
        self.occupied.clear();
        let children = &mut self.children;
        self.child_ptr_indexes
            .iter_mut()
            .enumerate()
            .filter_map(move |(key, idx)| {
                let slot = std::mem::take(idx);
                if slot == 0 {
                    return None;
                }
                children[slot as usize - 1]
                    .take()
                    .map(|child| (key as u8, child))
            })
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for IndexedMapping<N, WIDTH> {
    fn add_child(&mut self, key: u8, node: N) {
        debug_assert!(self.slot_of(key).is_none());
        let pos = match self.occupied.first_empty() {
            Some(pos) if pos < WIDTH => pos,
            _ => panic!("add_child: no space left"),
        };
        self.occupied.set(pos);
        self.child_ptr_indexes[key as usize] = pos as u8 + 1;
        self.children[pos] = Some(node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        self.children[self.slot_of(key)?].as_ref()
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let pos = self.slot_of(key)?;
        self.children[pos].as_mut()
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let pos = self.slot_of(key)?;
        self.child_ptr_indexes[key as usize] = 0;
        self.occupied.unset(pos);
        self.num_children -= 1;
        self.children[pos].take()
    }

    #[inline]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    // Positions are key bytes.
    fn child_at_or_after(&self, pos: usize) -> Option<(usize, u8, &N)> {
        (pos.min(256)..256).find_map(|key| {
            let slot = self.slot_of(key as u8)?;
            self.children[slot]
                .as_ref()
                .map(|child| (key, key as u8, child))
        })
    }

    fn last_child(&self) -> Option<(u8, &N)> {
        (0..256usize).rev().find_map(|key| {
            let slot = self.slot_of(key as u8)?;
            self.children[slot].as_ref().map(|child| (key as u8, child))
        })
    }
}
