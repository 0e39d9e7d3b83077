use std::ops::Index;

use num_traits::PrimInt;

// TODO: BIT_WIDTH and SHIFT can be derived from StorageType once generic_const_exprs lands in
// stable.
/// Fixed-width occupancy set, stored as `STORAGE_WIDTH` words of `StorageType`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bitset<
    StorageType,
    const BIT_WIDTH: usize,
    const SHIFT: usize,
    const STORAGE_WIDTH: usize,
> where
    StorageType: PrimInt,
{
    bitset: [StorageType; STORAGE_WIDTH],
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize>
    Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    pub fn new() -> Self {
        Self {
            bitset: [StorageType::zero(); STORAGE_WIDTH],
        }
    }

    /// Position of the lowest unset bit, if any.
    pub fn first_empty(&self) -> Option<usize> {
        for (i, b) in self.bitset.iter().enumerate() {
            if *b != StorageType::max_value() {
                return Some((i << SHIFT) + b.trailing_ones() as usize);
            }
        }
        None
    }

    #[inline]
    pub fn set(&mut self, pos: usize) {
        assert!(pos < self.capacity());
        let shift = StorageType::one() << (pos % BIT_WIDTH);
        self.bitset[pos >> SHIFT] = self.bitset[pos >> SHIFT] | shift;
    }

    #[inline]
    pub fn unset(&mut self, pos: usize) {
        assert!(pos < self.capacity());
        let shift = StorageType::one() << (pos % BIT_WIDTH);
        self.bitset[pos >> SHIFT] = self.bitset[pos >> SHIFT] & !shift;
    }

    #[inline]
    pub fn check(&self, pos: usize) -> bool {
        assert!(pos < self.capacity());
        let shift = StorageType::one() << (pos % BIT_WIDTH);
        !(self.bitset[pos >> SHIFT] & shift).is_zero()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bitset.fill(StorageType::zero());
    }

    /// Position of the lowest set bit at or after `from`.
    pub fn next_set(&self, from: usize) -> Option<usize> {
        if from >= self.capacity() {
            return None;
        }
        let mut word = from >> SHIFT;
        // Mask off the bits below `from` in its own word.
        let below = (StorageType::one() << (from % BIT_WIDTH)) - StorageType::one();
        let mut bits = self.bitset[word] & !below;
        loop {
            if !bits.is_zero() {
                return Some((word << SHIFT) + bits.trailing_zeros() as usize);
            }
            word += 1;
            if word >= STORAGE_WIDTH {
                return None;
            }
            bits = self.bitset[word];
        }
    }

    /// Position of the lowest set bit.
    pub fn first(&self) -> Option<usize> {
        self.next_set(0)
    }

    /// Position of the highest set bit.
    pub fn last(&self) -> Option<usize> {
        for (i, b) in self.bitset.iter().enumerate().rev() {
            if !b.is_zero() {
                return Some((i << SHIFT) + (BIT_WIDTH - 1) - b.leading_zeros() as usize);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.bitset.iter().all(|x| x.is_zero())
    }

    pub fn size(&self) -> usize {
        self.bitset.iter().map(|x| x.count_ones() as usize).sum()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        STORAGE_WIDTH * BIT_WIDTH
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let mut next = self.first();
        std::iter::from_fn(move || {
            let pos = next?;
            next = self.next_set(pos + 1);
            Some(pos)
        })
    }
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize> Default
    for Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize>
    Index<usize> for Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    type Output = bool;

    #[inline]
    fn index(&self, pos: usize) -> &Self::Output {
        if self.check(pos) {
            &true
        } else {
            &false
        }
    }
}

pub type Bitset64<const STORAGE_WIDTH_U64: usize> = Bitset<u64, 64, 6, STORAGE_WIDTH_U64>;
pub type Bitset32<const STORAGE_WIDTH_U32: usize> = Bitset<u32, 32, 5, STORAGE_WIDTH_U32>;
pub type Bitset16<const STORAGE_WIDTH_U16: usize> = Bitset<u16, 16, 4, STORAGE_WIDTH_U16>;
pub type Bitset8<const STORAGE_WIDTH_U8: usize> = Bitset<u8, 8, 3, STORAGE_WIDTH_U8>;
