//! Compressed node prefixes.
//!
//! An inner node stores at most [`MAX_PREFIX_LEN`] bytes of the prefix shared by every key beneath
//! it, together with the prefix's exact length. When the exact length is larger than what is
//! stored, the missing bytes have to be read back from a leaf in the node's subtree.

use std::cmp::min;
use std::fmt;

/// Number of prefix bytes kept inline in every inner node.
pub const MAX_PREFIX_LEN: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Partial {
    data: [u8; MAX_PREFIX_LEN],
    len: u32,
}

impl Partial {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            data: [0; MAX_PREFIX_LEN],
            len: 0,
        }
    }

    /// A prefix whose exact length is `len`, taking as many bytes from `src` as fit. `src` must
    /// hold at least `min(len, MAX_PREFIX_LEN)` bytes.
    pub fn from_parts(src: &[u8], len: usize) -> Self {
        debug_assert!(len <= u32::MAX as usize);
        let stored = min(len, MAX_PREFIX_LEN);
        let mut data = [0; MAX_PREFIX_LEN];
        data[..stored].copy_from_slice(&src[..stored]);
        Self {
            data,
            len: len as u32,
        }
    }

    /// A prefix holding all of `src`.
    #[inline]
    pub fn from_slice(src: &[u8]) -> Self {
        Self::from_parts(src, src.len())
    }

    /// Exact prefix length, which may exceed the number of stored bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes actually held inline.
    #[inline(always)]
    pub fn stored(&self) -> &[u8] {
        &self.data[..min(self.len(), MAX_PREFIX_LEN)]
    }

    /// True when some prefix bytes live only in the subtree's leaves.
    #[inline(always)]
    pub fn is_truncated(&self) -> bool {
        self.len() > MAX_PREFIX_LEN
    }

    /// The first `length` bytes of this prefix.
    pub fn partial_before(&self, length: usize) -> Self {
        assert!(length <= self.len());
        Self::from_parts(self.stored(), length)
    }

    /// The bytes from `start` onwards. Only valid while those bytes are all stored.
    pub fn partial_after(&self, start: usize) -> Self {
        assert!(!self.is_truncated() && start <= self.len());
        Self::from_slice(&self.data[start..self.len()])
    }

    /// `self`, then the `edge` byte, then `child`. Bytes past the inline bound are dropped, the
    /// exact length is kept.
    pub fn extended_with(&self, edge: u8, child: &Partial) -> Self {
        let len = self.len() + 1 + child.len();
        let mut buf = [0; MAX_PREFIX_LEN];
        let mut filled = 0;
        for b in self
            .stored()
            .iter()
            .chain(std::iter::once(&edge))
            .chain(child.stored())
            .take(MAX_PREFIX_LEN)
        {
            buf[filled] = *b;
            filled += 1;
        }
        debug_assert!(filled == min(len, MAX_PREFIX_LEN) || self.is_truncated());
        Self::from_parts(&buf, len)
    }

    /// Length of the common prefix between the stored bytes and `slice`.
    pub fn prefix_length_slice(&self, slice: &[u8]) -> usize {
        self.stored()
            .iter()
            .zip(slice)
            .take_while(|(a, b)| a == b)
            .count()
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("stored", &self.stored())
            .field("len", &self.len)
            .finish()
    }
}
