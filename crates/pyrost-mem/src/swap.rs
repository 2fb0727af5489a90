//! Value and byte-region swaps.
//!
//! [`swap_typed`] exchanges two values of the same type by move.
//! [`swap_bytes`] and friends exchange raw byte regions through a scratch
//! buffer with three copies (a → scratch, b → a, scratch → b). Scratch
//! storage lives only for the duration of the call: inline on the stack up
//! to [`INLINE_SCRATCH_BYTES`], a transient heap buffer beyond that.

use smallvec::SmallVec;

use crate::plain::{self, Plain};

/// Regions up to this many bytes are swapped through stack scratch space.
pub const INLINE_SCRATCH_BYTES: usize = 256;

/// Exchange two values through a temporary of type `T`.
///
/// Applying the swap twice restores the original pair.
#[inline]
pub fn swap_typed<T>(a: &mut T, b: &mut T) {
    std::mem::swap(a, b);
}

/// Exchange the contents of two equal-length byte regions.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
pub fn swap_bytes(a: &mut [u8], b: &mut [u8]) {
    assert_eq!(
        a.len(),
        b.len(),
        "swap regions differ in length: {} vs {}",
        a.len(),
        b.len()
    );
    let scratch: SmallVec<[u8; INLINE_SCRATCH_BYTES]> = SmallVec::from_slice(a);
    a.copy_from_slice(b);
    b.copy_from_slice(&scratch);
}

/// Exchange two byte arrays whose length is known at compile time.
///
/// The scratch buffer is a `[u8; N]` on the stack.
pub fn swap_bytes_fixed<const N: usize>(a: &mut [u8; N], b: &mut [u8; N]) {
    let scratch: [u8; N] = *a;
    *a = *b;
    *b = scratch;
}

/// Exchange two non-overlapping `len`-byte regions of one buffer, starting
/// at offsets `a` and `b`.
///
/// # Panics
///
/// Panics if either region extends past the end of `buf`, or if the
/// regions overlap. Zero-length regions never overlap.
pub fn swap_within(buf: &mut [u8], a: usize, b: usize, len: usize) {
    let (left, right) = split_regions(buf, a, b, len);
    swap_bytes(left, right);
}

/// Exchange two plain values byte by byte.
///
/// Equivalent to [`swap_typed`] for `Plain` types, but goes through the
/// byte representation.
pub fn swap_plain<T: Plain>(a: &mut T, b: &mut T) {
    swap_bytes(plain::bytes_of_mut(a), plain::bytes_of_mut(b));
}

/// Split `buf` into the two disjoint `len`-byte regions at `a` and `b`,
/// returned in argument order.
pub(crate) fn split_regions(
    buf: &mut [u8],
    a: usize,
    b: usize,
    len: usize,
) -> (&mut [u8], &mut [u8]) {
    let buf_len = buf.len();
    let in_bounds = |start: usize| start.checked_add(len).is_some_and(|end| end <= buf_len);
    assert!(
        in_bounds(a) && in_bounds(b),
        "swap region out of bounds: offsets {a} and {b}, length {len}, buffer {buf_len}"
    );
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    assert!(
        len == 0 || lo + len <= hi,
        "swap regions overlap: offsets {a} and {b}, length {len}"
    );
    let (head, tail) = buf.split_at_mut(hi);
    let lo_region = &mut head[lo..lo + len];
    let hi_region = &mut tail[..len];
    if a <= b {
        (lo_region, hi_region)
    } else {
        (hi_region, lo_region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_typed_exchanges_values() {
        let mut a = String::from("left");
        let mut b = String::from("right");
        swap_typed(&mut a, &mut b);
        assert_eq!(a, "right");
        assert_eq!(b, "left");
    }

    #[test]
    fn swap_typed_structs() {
        #[derive(Debug, PartialEq)]
        struct Frame {
            id: u32,
            data: Vec<f32>,
        }
        let mut a = Frame {
            id: 1,
            data: vec![1.0],
        };
        let mut b = Frame {
            id: 2,
            data: vec![2.0, 3.0],
        };
        swap_typed(&mut a, &mut b);
        assert_eq!(a.id, 2);
        assert_eq!(b.data, vec![1.0]);
    }

    #[test]
    fn swap_bytes_small_regions() {
        let mut a = [1u8, 2, 3];
        let mut b = [7u8, 8, 9];
        swap_bytes(&mut a, &mut b);
        assert_eq!(a, [7, 8, 9]);
        assert_eq!(b, [1, 2, 3]);
    }

    #[test]
    fn swap_bytes_beyond_inline_scratch() {
        let mut a = vec![0xAAu8; INLINE_SCRATCH_BYTES * 4 + 3];
        let mut b = vec![0x55u8; INLINE_SCRATCH_BYTES * 4 + 3];
        swap_bytes(&mut a, &mut b);
        assert!(a.iter().all(|&x| x == 0x55));
        assert!(b.iter().all(|&x| x == 0xAA));
    }

    #[test]
    fn swap_bytes_empty() {
        let mut a: [u8; 0] = [];
        let mut b: [u8; 0] = [];
        swap_bytes(&mut a, &mut b);
    }

    #[test]
    #[should_panic(expected = "differ in length")]
    fn swap_bytes_rejects_length_mismatch() {
        swap_bytes(&mut [0u8; 4], &mut [0u8; 5]);
    }

    #[test]
    fn swap_bytes_fixed_exchanges() {
        let mut a = *b"abcd";
        let mut b = *b"wxyz";
        swap_bytes_fixed(&mut a, &mut b);
        assert_eq!(&a, b"wxyz");
        assert_eq!(&b, b"abcd");
    }

    #[test]
    fn swap_within_either_order() {
        let mut buf = [0u8, 1, 2, 3, 4, 5, 6, 7];
        swap_within(&mut buf, 0, 6, 2);
        assert_eq!(buf, [6, 7, 2, 3, 4, 5, 0, 1]);
        swap_within(&mut buf, 6, 0, 2);
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn swap_within_adjacent_regions() {
        let mut buf = [1u8, 2, 3, 4];
        swap_within(&mut buf, 0, 2, 2);
        assert_eq!(buf, [3, 4, 1, 2]);
    }

    #[test]
    fn swap_within_zero_length_same_offset() {
        let mut buf = [1u8, 2];
        swap_within(&mut buf, 1, 1, 0);
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn swap_within_rejects_overlap() {
        let mut buf = [0u8; 8];
        swap_within(&mut buf, 0, 2, 4);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn swap_within_rejects_identical_offsets() {
        let mut buf = [0u8; 8];
        swap_within(&mut buf, 3, 3, 1);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn swap_within_rejects_out_of_bounds() {
        let mut buf = [0u8; 8];
        swap_within(&mut buf, 0, 6, 4);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn swap_within_rejects_offset_overflow() {
        let mut buf = [0u8; 8];
        swap_within(&mut buf, usize::MAX, 0, 2);
    }

    #[test]
    fn swap_plain_values() {
        let mut a = [1.5f32, -2.0];
        let mut b = [0.25f32, 8.0];
        swap_plain(&mut a, &mut b);
        assert_eq!(a, [0.25, 8.0]);
        assert_eq!(b, [1.5, -2.0]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn swap_typed_twice_restores(x in any::<i64>(), y in any::<i64>()) {
                let (mut a, mut b) = (x, y);
                swap_typed(&mut a, &mut b);
                prop_assert_eq!((a, b), (y, x));
                swap_typed(&mut a, &mut b);
                prop_assert_eq!((a, b), (x, y));
            }

            #[test]
            fn swap_bytes_twice_restores(
                pair in (0usize..1024).prop_flat_map(|n| (
                    proptest::collection::vec(any::<u8>(), n),
                    proptest::collection::vec(any::<u8>(), n),
                )),
            ) {
                let (orig_a, orig_b) = pair;
                let (mut a, mut b) = (orig_a.clone(), orig_b.clone());
                swap_bytes(&mut a, &mut b);
                prop_assert_eq!(&a, &orig_b);
                prop_assert_eq!(&b, &orig_a);
                swap_bytes(&mut a, &mut b);
                prop_assert_eq!(a, orig_a);
                prop_assert_eq!(b, orig_b);
            }

            #[test]
            fn swap_plain_matches_swap_typed(x in any::<[u32; 3]>(), y in any::<[u32; 3]>()) {
                let (mut a, mut b) = (x, y);
                swap_plain(&mut a, &mut b);
                prop_assert_eq!((a, b), (y, x));
            }

            #[test]
            fn swap_within_exchanges_regions(
                len in 0usize..16,
                gap in 0usize..16,
                fill in any::<u8>(),
            ) {
                let total = 2 * len + gap;
                let mut buf: Vec<u8> = (0..total).map(|i| (i as u8).wrapping_add(fill)).collect();
                let orig = buf.clone();
                let b = len + gap;
                swap_within(&mut buf, 0, b, len);
                prop_assert_eq!(&buf[..len], &orig[b..b + len]);
                prop_assert_eq!(&buf[b..b + len], &orig[..len]);
                prop_assert_eq!(&buf[len..b], &orig[len..b]);
            }
        }
    }
}
