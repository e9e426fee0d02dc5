//! Searching the sorted byte-key arrays of Node4 / Node16.
//!
//! With the `simd_keys` feature, 16-wide arrays are compared in a single SSE2 / NEON
//! instruction. Everything else falls back to linear or binary search.

#[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn x86_64_sse_find_key_16(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    };

    let bitfield = unsafe {
        let key_vec = _mm_set1_epi8(key as i8);
        let results = _mm_cmpeq_epi8(key_vec, _mm_loadu_si128(keys.as_ptr() as *const __m128i));
        let mask = (1i32 << num_children) - 1;
        _mm_movemask_epi8(results) & mask
    };
    if bitfield != 0 {
        return Some(bitfield.trailing_zeros() as usize);
    }
    None
}

#[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn x86_64_sse_seek_insert_pos_16(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_max_epu8, _mm_movemask_epi8,
        _mm_set1_epi8,
    };

    // First `k >= key`. Unsigned `k >= key` is `max(key, k) == k`; SSE2 has no unsigned byte
    // compare.
    let bitfield = unsafe {
        let key_vec = _mm_set1_epi8(key as i8);
        let node_keys = _mm_loadu_si128(keys.as_ptr() as *const __m128i);
        let ge = _mm_cmpeq_epi8(_mm_max_epu8(key_vec, node_keys), node_keys);
        let mask = (1i32 << num_children) - 1;
        _mm_movemask_epi8(ge) & mask
    };
    if bitfield != 0 {
        return Some(bitfield.trailing_zeros() as usize);
    }
    None
}

#[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
#[inline]
fn aarch64_neon_find_key_16(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
    use std::arch::aarch64::*;
    unsafe {
        let key_vec = vdupq_n_u8(key);
        let node_keys_vec = vld1q_u8(keys.as_ptr());
        let cmp_vec = vceqq_u8(key_vec, node_keys_vec);

        // No movemask on NEON: narrow each 8-bit lane to 4 bits and read the result as one
        // 64-bit word, so lane `i` occupies bits `4i..4i+4`.
        let res = vshrn_n_u16::<4>(vreinterpretq_u16_u8(cmp_vec));
        let matches = vget_lane_u64::<0>(vreinterpret_u64_u8(res));
        if matches != 0 {
            let idx = (matches.trailing_zeros() >> 2) as usize;
            if idx < num_children {
                return Some(idx);
            }
        }
        None
    }
}

fn binary_find_key(key: u8, keys: &[u8], num_children: usize) -> Option<usize> {
    keys[..num_children].binary_search(&key).ok()
}

/// Position of `key` within the first `num_children` entries of the sorted `keys`.
pub fn u8_keys_find_key_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> Option<usize> {
    if WIDTH <= 4 {
        return (0..num_children).find(|&i| keys[i] == key);
    }

    if WIDTH == 16 {
        #[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
        {
            if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
                return x86_64_sse_find_key_16(key, keys, num_children);
            }
        }

        #[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
        {
            if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
                return aarch64_neon_find_key_16(key, keys, num_children);
            }
        }
    }

    binary_find_key(key, keys, num_children)
}

/// Index of the first of the `num_children` sorted `keys` not less than `key`: where `key` goes to
/// keep them sorted.
pub fn u8_keys_find_insert_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> usize {
    if WIDTH == 16 {
        #[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
        {
            if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
                return x86_64_sse_seek_insert_pos_16(key, keys, num_children)
                    .unwrap_or(num_children);
            }
        }
    }

    keys[..num_children].partition_point(|k| *k < key)
}
