use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::NodeMapping;
use crate::utils::bitset::Bitset64;

/// One slot per key byte. The occupancy bitset lets ordered scans skip empty runs a word at a
/// time.
#[derive(Clone)]
pub struct DirectMapping<N> {
    pub(crate) children: Box<[Option<N>; 256]>,
    occupied: Bitset64<4>,
    num_children: usize,
}

impl<N> Default for DirectMapping<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectMapping<N> {
    pub fn new() -> Self {
        Self {
            children: Box::new([const { None }; 256]),
            occupied: Bitset64::new(),
            num_children: 0,
        }
    }

    pub fn from_indexed<const WIDTH: usize>(im: &mut IndexedMapping<N, WIDTH>) -> Self {
        let mut new_mapping = DirectMapping::<N>::new();
        for (key, child) in im.drain() {
            new_mapping.add_child(key, child);
        }
        new_mapping
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u8, &N)> {
        self.occupied.iter().filter_map(move |key| {
            self.children[key]
                .as_ref()
                .map(|child| (key as u8, child))
        })
    }

    /// Removes every child, in key order.
    pub fn drain(&mut self) -> impl Iterator<Item = (u8, N)> + '_ {
        let occupied = std::mem::take(&mut self.occupied);
        self.num_children = 0;
        let children = &mut self.children;
        (0..256usize).filter_map(move |key| {
            if !occupied.check(key) {
                return None;
            }
            children[key].take().map(|child| (key as u8, child))
        })
    }
}

impl<N> NodeMapping<N, 256> for DirectMapping<N> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        if self.children[key as usize].replace(node).is_none() {
            self.num_children += 1;
        }
        self.occupied.set(key as usize);
    }

    #[inline]
    fn seek_child(&self, key: u8) -> Option<&N> {
        self.children[key as usize].as_ref()
    }

    #[inline]
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        self.children[key as usize].as_mut()
    }

    #[inline]
    fn delete_child(&mut self, key: u8) -> Option<N> {
        let n = self.children[key as usize].take();
        if n.is_some() {
            self.occupied.unset(key as usize);
            self.num_children -= 1;
        }
        n
    }

    #[inline]
    fn num_children(&self) -> usize {
        self.num_children
    }

    fn child_at_or_after(&self, pos: usize) -> Option<(usize, u8, &N)> {
        let key = self.occupied.next_set(pos)?;
        self.children[key]
            .as_ref()
            .map(|child| (key, key as u8, child))
    }

    fn last_child(&self) -> Option<(u8, &N)> {
        let key = self.occupied.last()?;
        self.children[key].as_ref().map(|child| (key as u8, child))
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::direct_mapping::DirectMapping;
    use crate::mapping::indexed_mapping::IndexedMapping;
    use crate::mapping::NodeMapping;

    #[test]
    fn direct_mapping_test() {
        let mut dm = DirectMapping::new();
        for i in 0..=255 {
            dm.add_child(i, i);
            assert_eq!(*dm.seek_child(i).unwrap(), i);
            assert_eq!(dm.delete_child(i), Some(i));
            assert_eq!(dm.seek_child(i), None);
        }
        assert_eq!(dm.num_children(), 0);
    }

    #[test]
    fn test_ordered_scan() {
        let mut dm = DirectMapping::new();
        for k in [255u8, 0, 64, 63, 128] {
            dm.add_child(k, k as u32);
        }
        let keys: Vec<u8> = dm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 63, 64, 128, 255]);
        assert_eq!(dm.child_at_or_after(1), Some((63, 63, &63)));
        assert_eq!(dm.child_at_or_after(129), Some((255, 255, &255)));
        assert_eq!(dm.child_at_or_after(256), None);
        assert_eq!(dm.last_child(), Some((255, &255)));
        dm.delete_child(255);
        assert_eq!(dm.last_child(), Some((128, &128)));
    }

    #[test]
    fn test_shrink_to_indexed() {
        let mut dm = DirectMapping::new();
        for k in 0..40u8 {
            dm.add_child(k * 3, k);
        }
        let im: IndexedMapping<u8, 48> = IndexedMapping::from_direct(&mut dm);
        assert_eq!(dm.num_children(), 0);
        assert_eq!(dm.first_child(), None);
        assert_eq!(im.num_children(), 40);
        assert_eq!(im.seek_child(117), Some(&39));
        assert_eq!(im.first_child(), Some((0, &0)));
    }
}
