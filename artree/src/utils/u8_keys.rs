//! Key-byte searches over the sorted key arrays of Node4 and Node16.
//!
//! Node16 compares the search byte against all sixteen stored keys at once and picks the first
//! matching lane out of the comparison mask. The portable fallback is a plain scan.

#[cfg(all(
    feature = "simd_keys",
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse2"
))]
mod sse2 {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::{
        __m128i, _mm_cmpeq_epi8, _mm_cmplt_epi8, _mm_loadu_si128, _mm_movemask_epi8,
        _mm_set1_epi8, _mm_xor_si128,
    };
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_cmplt_epi8, _mm_loadu_si128, _mm_movemask_epi8,
        _mm_set1_epi8, _mm_xor_si128,
    };

    #[inline]
    fn live_mask(num_children: usize) -> i32 {
        debug_assert!(num_children <= 16);
        (1i32 << num_children) - 1
    }

    #[inline]
    pub(super) fn find_key_16(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
        // SAFETY: sse2 is statically enabled for this module, and `keys` is exactly 16 bytes so
        // the unaligned load stays in bounds.
        let bitfield = unsafe {
            let key_vec = _mm_set1_epi8(key as i8);
            let results =
                _mm_cmpeq_epi8(key_vec, _mm_loadu_si128(keys.as_ptr() as *const __m128i));
            _mm_movemask_epi8(results) & live_mask(num_children)
        };
        if bitfield != 0 {
            return Some(bitfield.trailing_zeros() as usize);
        }
        None
    }

    #[inline]
    pub(super) fn seek_insert_pos_16(key: u8, keys: &[u8; 16], num_children: usize) -> usize {
        // _mm_cmplt_epi8 is a signed compare; flipping the sign bit of both sides turns it into
        // an unsigned one.
        // SAFETY: as above.
        let bitfield = unsafe {
            let bias = _mm_set1_epi8(i8::MIN);
            let key_vec = _mm_xor_si128(_mm_set1_epi8(key as i8), bias);
            let keys_vec =
                _mm_xor_si128(_mm_loadu_si128(keys.as_ptr() as *const __m128i), bias);
            _mm_movemask_epi8(_mm_cmplt_epi8(key_vec, keys_vec)) & live_mask(num_children)
        };
        if bitfield != 0 {
            return bitfield.trailing_zeros() as usize;
        }
        num_children
    }
}

/// Position of `key` among the first `num_children` entries of a sorted key array.
#[inline]
pub fn u8_keys_find_key_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> Option<usize> {
    debug_assert!(num_children <= WIDTH);

    // Width 4 and under, just use linear search.
    if WIDTH <= 4 {
        return keys[..num_children].iter().position(|k| *k == key);
    }

    #[cfg(all(
        feature = "simd_keys",
        any(target_arch = "x86", target_arch = "x86_64"),
        target_feature = "sse2"
    ))]
    {
        if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
            return sse2::find_key_16(key, keys, num_children);
        }
    }

    keys[..num_children].binary_search(&key).ok()
}

/// Position at which `key` must be inserted to keep the first `num_children` entries sorted.
#[inline]
pub fn u8_keys_find_insert_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> usize {
    debug_assert!(num_children <= WIDTH);

    #[cfg(all(
        feature = "simd_keys",
        any(target_arch = "x86", target_arch = "x86_64"),
        target_feature = "sse2"
    ))]
    {
        if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
            return sse2::seek_insert_pos_16(key, keys, num_children);
        }
    }

    keys[..num_children]
        .iter()
        .position(|k| key < *k)
        .unwrap_or(num_children)
}
