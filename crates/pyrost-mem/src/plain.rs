//! Plain-old-data marker for byte-level views and swaps.
//!
//! [`Plain`] types can be viewed as `&[u8]` / `&mut [u8]`, which is what
//! [`swap_plain`](crate::swap_plain) and [`Block::as_bytes_mut`](crate::Block::as_bytes_mut)
//! build on.

use crate::raw;

/// A type with no padding bytes for which every byte pattern is a valid value.
///
/// Implemented for the fixed-width integers, `usize`/`isize`, `f32`, `f64`
/// and arrays of `Plain` types.
///
/// # Safety
///
/// Implementors must have no padding and no invalid bit patterns
/// (`bool`, `char`, references and enums do not qualify).
#[allow(unsafe_code)]
pub unsafe trait Plain: Copy + 'static {}

macro_rules! impl_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numeric type, no padding, all bit patterns valid.
            #[allow(unsafe_code)]
            unsafe impl Plain for $ty {}
        )*
    };
}

impl_plain!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// SAFETY: arrays have no padding between elements of a padding-free type.
#[allow(unsafe_code)]
unsafe impl<T: Plain, const N: usize> Plain for [T; N] {}

/// The bytes of a plain value.
pub fn bytes_of<T: Plain>(value: &T) -> &[u8] {
    raw::as_bytes(std::slice::from_ref(value))
}

/// The bytes of a plain value, writable.
pub fn bytes_of_mut<T: Plain>(value: &mut T) -> &mut [u8] {
    raw::as_bytes_mut(std::slice::from_mut(value))
}

/// The bytes of a slice of plain values.
pub fn slice_bytes<T: Plain>(values: &[T]) -> &[u8] {
    raw::as_bytes(values)
}

/// The bytes of a slice of plain values, writable.
pub fn slice_bytes_mut<T: Plain>(values: &mut [T]) -> &mut [u8] {
    raw::as_bytes_mut(values)
}
