//! Low-level primitives for block memory operations.
//!
//! This is the only module that dereferences raw pointers. Every `unsafe`
//! block carries a `// SAFETY:` comment; callers in `block` uphold the
//! documented contracts.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use crate::error::MemError;
use crate::plain::Plain;

/// Allocate uninitialized storage for `count` elements of `T`.
///
/// Zero-byte requests (zero `count` or zero-sized `T`) do not touch the
/// heap and return a dangling, well-aligned pointer.
pub(crate) fn alloc_array<T>(count: usize) -> Result<NonNull<T>, MemError> {
    let layout = Layout::array::<T>(count).map_err(|_| MemError::exhausted::<T>(count))?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    // SAFETY: layout has non-zero size.
    let ptr = unsafe { alloc::alloc(layout) };
    NonNull::new(ptr.cast::<T>()).ok_or_else(|| MemError::exhausted::<T>(count))
}

/// Return storage obtained from [`alloc_array`] to the allocator.
///
/// # Safety
///
/// `ptr` must come from `alloc_array::<T>(count)` with the same `count`,
/// and must not be used afterwards.
pub(crate) unsafe fn dealloc_array<T>(ptr: NonNull<T>, count: usize) {
    let Ok(layout) = Layout::array::<T>(count) else {
        // alloc_array would have refused this count.
        return;
    };
    if layout.size() != 0 {
        // SAFETY: per the contract, ptr was allocated with this layout.
        unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) };
    }
}

/// Drop `len` initialized elements in place.
///
/// # Safety
///
/// `ptr` must point to `len` initialized, exclusively owned elements.
pub(crate) unsafe fn drop_elements<T>(ptr: NonNull<T>, len: usize) {
    if mem::needs_drop::<T>() {
        // SAFETY: caller guarantees ptr..ptr+len is initialized and owned.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr.as_ptr(), len)) };
    }
}

/// Shared slice view over owned storage.
///
/// # Safety
///
/// `ptr` must point to `len` initialized elements that outlive `'a` and
/// are not mutated during `'a`.
pub(crate) unsafe fn view<'a, T>(ptr: NonNull<T>, len: usize) -> &'a [T] {
    // SAFETY: forwarded from the caller.
    unsafe { slice::from_raw_parts(ptr.as_ptr(), len) }
}

/// Exclusive slice view over owned storage.
///
/// # Safety
///
/// As [`view`], and no other reference to the storage may exist during `'a`.
pub(crate) unsafe fn view_mut<'a, T>(ptr: NonNull<T>, len: usize) -> &'a mut [T] {
    // SAFETY: forwarded from the caller.
    unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), len) }
}

/// Reinterpret a slice of plain values as its bytes.
pub(crate) fn as_bytes<T: Plain>(values: &[T]) -> &[u8] {
    // SAFETY: Plain types have no padding, so every byte is initialized;
    // u8 has alignment 1 and the length covers exactly the same region.
    unsafe { slice::from_raw_parts(values.as_ptr().cast::<u8>(), mem::size_of_val(values)) }
}

/// Reinterpret a mutable slice of plain values as its bytes.
pub(crate) fn as_bytes_mut<T: Plain>(values: &mut [T]) -> &mut [u8] {
    let len = mem::size_of_val(values);
    // SAFETY: as in `as_bytes`; additionally every byte pattern is a valid
    // Plain value, so arbitrary writes through the view keep `values` valid.
    unsafe { slice::from_raw_parts_mut(values.as_mut_ptr().cast::<u8>(), len) }
}
