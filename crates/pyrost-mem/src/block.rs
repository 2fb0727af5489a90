//! Owning handles for typed heap blocks.
//!
//! A [`Block<T>`] owns `len` contiguous elements of `T` on the heap. Fresh
//! allocations come back as `Block<MaybeUninit<T>>` and become `Block<T>`
//! once every element has been written. Releasing a block (explicitly or
//! on drop) frees its storage and leaves it as the null sentinel, so a
//! second release is a no-op and a released handle can never be observed
//! holding storage.

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::MemError;
use crate::plain::{self, Plain};
use crate::raw;

/// Owning handle to a contiguous heap block of `T`.
///
/// The null sentinel ([`Block::null`]) owns nothing and derefs to an empty
/// slice. A zero-length allocation is *not* null: it is a live block of
/// length zero that never touched the heap.
pub struct Block<T> {
    /// `None` is the null sentinel.
    ptr: Option<NonNull<T>>,
    /// Number of elements. Always 0 for the null sentinel.
    len: usize,
    _owns: PhantomData<T>,
}

// SAFETY: Block<T> uniquely owns its elements, like Box<[T]>.
#[allow(unsafe_code)]
unsafe impl<T: Send> Send for Block<T> {}

// SAFETY: shared access only hands out &[T].
#[allow(unsafe_code)]
unsafe impl<T: Sync> Sync for Block<T> {}

impl<T> Block<T> {
    /// The null sentinel: a handle that owns no storage.
    pub const fn null() -> Self {
        Self {
            ptr: None,
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate uninitialized storage for `count` elements of `T`.
    ///
    /// Returns [`MemError::AllocationExhausted`] if the allocator refuses
    /// the request; nothing is retried and nothing panics. `count == 0`
    /// (or a zero-sized `T`) yields a live block without a heap call.
    #[must_use = "dropping the result releases the block immediately"]
    pub fn allocate(count: usize) -> Result<Block<MaybeUninit<T>>, MemError> {
        match raw::alloc_array::<T>(count) {
            Ok(ptr) => Ok(Block {
                ptr: Some(ptr.cast::<MaybeUninit<T>>()),
                len: count,
                _owns: PhantomData,
            }),
            Err(err) => {
                tracing::warn!(
                    count,
                    element_size = mem::size_of::<T>(),
                    "block allocation exhausted"
                );
                Err(err)
            }
        }
    }

    /// Allocate `count` elements initialized by `f(index)`.
    pub fn from_fn(count: usize, f: impl FnMut(usize) -> T) -> Result<Self, MemError> {
        Ok(Self::allocate(count)?.init_with(f))
    }

    /// Allocate `count` copies of `value`.
    pub fn filled(count: usize, value: T) -> Result<Self, MemError>
    where
        T: Clone,
    {
        Self::from_fn(count, |_| value.clone())
    }

    /// Allocate a block holding a clone of `src`.
    pub fn from_slice(src: &[T]) -> Result<Self, MemError>
    where
        T: Clone,
    {
        Ok(Self::allocate(src.len())?.init_from_slice(src))
    }

    /// Clone into a freshly allocated block. A null block clones to null.
    pub fn try_clone(&self) -> Result<Self, MemError>
    where
        T: Clone,
    {
        if self.is_null() {
            return Ok(Self::null());
        }
        Self::from_slice(self)
    }

    /// Whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no elements (null or zero-length).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the block's storage in bytes.
    pub fn byte_len(&self) -> usize {
        self.len * mem::size_of::<T>()
    }

    /// The elements as a shared slice.
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// The elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Drop the elements, free the storage and become the null sentinel.
    ///
    /// Releasing a null block does nothing.
    #[allow(unsafe_code)]
    pub fn release(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            let len = mem::replace(&mut self.len, 0);
            // SAFETY: ptr/len came from alloc_array and every element is
            // initialized (Block<T> is only built from initialized storage,
            // or T is MaybeUninit). The handle is already null, so the
            // storage cannot be reached again.
            unsafe {
                raw::drop_elements(ptr, len);
                raw::dealloc_array(ptr, len);
            }
            tracing::trace!(len, "block released");
        }
    }
}

/// Drops the initialized prefix of a block if initialization unwinds.
struct InitGuard<'a, T> {
    slots: &'a mut [MaybeUninit<T>],
    written: usize,
}

impl<T> InitGuard<'_, T> {
    fn fill(mut self, mut f: impl FnMut(usize) -> T) {
        while self.written < self.slots.len() {
            let i = self.written;
            self.slots[i].write(f(i));
            self.written += 1;
        }
        mem::forget(self);
    }
}

impl<T> Drop for InitGuard<'_, T> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        if let Some(ptr) = NonNull::new(self.slots.as_mut_ptr().cast::<T>()) {
            // SAFETY: the first `written` slots were initialized by `fill`
            // and nothing else owns them yet.
            unsafe { raw::drop_elements(ptr, self.written) };
        }
    }
}

impl<T> Block<MaybeUninit<T>> {
    /// Initialize every element with `f(index)`.
    ///
    /// # Panics
    ///
    /// If `f` panics, the elements written so far are dropped and the
    /// storage is freed before the panic propagates.
    #[allow(unsafe_code)]
    pub fn init_with(mut self, f: impl FnMut(usize) -> T) -> Block<T> {
        InitGuard {
            slots: self.as_mut_slice(),
            written: 0,
        }
        .fill(f);
        // SAFETY: `fill` returned normally, so every slot was written.
        unsafe { self.assume_init() }
    }

    /// Initialize the block with clones of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src.len()` differs from the block length. A panicking
    /// `clone` is handled as in [`init_with`](Self::init_with).
    #[allow(unsafe_code)]
    pub fn init_from_slice(mut self, src: &[T]) -> Block<T>
    where
        T: Clone,
    {
        assert_eq!(
            src.len(),
            self.len,
            "source length {} does not match block length {}",
            src.len(),
            self.len
        );
        InitGuard {
            slots: self.as_mut_slice(),
            written: 0,
        }
        .fill(|i| src[i].clone());
        // SAFETY: `fill` wrote all `len` slots.
        unsafe { self.assume_init() }
    }

    /// Treat the storage as initialized.
    ///
    /// # Safety
    ///
    /// Every element must have been written.
    #[allow(unsafe_code)]
    pub unsafe fn assume_init(self) -> Block<T> {
        let this = ManuallyDrop::new(self);
        Block {
            ptr: this.ptr.map(NonNull::cast::<T>),
            len: this.len,
            _owns: PhantomData,
        }
    }
}

impl<T: Plain> Block<T> {
    /// The block's storage as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        plain::slice_bytes(self.as_slice())
    }

    /// The block's storage as writable bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        plain::slice_bytes_mut(self.as_mut_slice())
    }
}

impl<T> Deref for Block<T> {
    type Target = [T];

    #[allow(unsafe_code)]
    fn deref(&self) -> &[T] {
        match self.ptr {
            // SAFETY: the block owns `len` initialized elements, borrowed
            // for the lifetime of &self.
            Some(ptr) => unsafe { raw::view(ptr, self.len) },
            None => &[],
        }
    }
}

impl<T> DerefMut for Block<T> {
    #[allow(unsafe_code)]
    fn deref_mut(&mut self) -> &mut [T] {
        match self.ptr {
            // SAFETY: as in deref; &mut self guarantees exclusivity.
            Some(ptr) => unsafe { raw::view_mut(ptr, self.len) },
            None => Default::default(),
        }
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for Block<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: fmt::Debug> fmt::Debug for Block<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Block(null)");
        }
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Allocate uninitialized storage for `count` elements of `T`.
///
/// Shorthand for [`Block::allocate`].
#[must_use = "dropping the result releases the block immediately"]
pub fn allocate<T>(count: usize) -> Result<Block<MaybeUninit<T>>, MemError> {
    Block::<T>::allocate(count)
}

/// Free `block` and leave it as the null sentinel.
///
/// Shorthand for [`Block::release`]; idempotent.
pub fn release<T>(block: &mut Block<T>) {
    block.release();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn allocate_has_requested_len() {
        let block = allocate::<f64>(16).unwrap();
        assert!(!block.is_null());
        assert_eq!(block.len(), 16);
        assert_eq!(block.byte_len(), 128);
    }

    #[test]
    fn zero_length_allocation_is_live() {
        let block = allocate::<u32>(0).unwrap();
        assert!(!block.is_null());
        assert!(block.is_empty());
        let init = block.init_with(|_| unreachable!());
        assert!(!init.is_null());
        assert!(init.as_slice().is_empty());
    }

    #[test]
    fn zero_sized_elements() {
        let block = Block::from_fn(1000, |_| ()).unwrap();
        assert_eq!(block.len(), 1000);
        assert_eq!(block.byte_len(), 0);
    }

    #[test]
    fn exhaustion_returns_error() {
        let err = allocate::<u64>(usize::MAX / 4).unwrap_err();
        assert_eq!(
            err,
            MemError::AllocationExhausted {
                count: usize::MAX / 4,
                element_size: 8
            }
        );
    }

    #[test]
    fn heap_refusal_returns_error() {
        // Layout-valid, but no allocator can hand out ~8 EiB.
        let count = isize::MAX as usize;
        assert!(allocate::<u8>(count).is_err());
    }

    #[test]
    fn init_with_writes_every_element() {
        let block = allocate::<i32>(5).unwrap().init_with(|i| i as i32 * 2);
        assert_eq!(block.as_slice(), &[0, 2, 4, 6, 8]);
    }

    #[test]
    #[allow(unsafe_code)]
    fn element_writes_then_assume_init() {
        let mut block = allocate::<u16>(3).unwrap();
        for (i, slot) in block.iter_mut().enumerate() {
            slot.write(100 + i as u16);
        }
        // SAFETY: all three slots written above.
        let block = unsafe { block.assume_init() };
        assert_eq!(block.as_slice(), &[100, 101, 102]);
    }

    #[test]
    #[should_panic(expected = "does not match block length")]
    fn init_from_slice_rejects_length_mismatch() {
        let _ = allocate::<u8>(4).unwrap().init_from_slice(&[1, 2, 3]);
    }

    #[test]
    fn release_nulls_and_is_idempotent() {
        let mut block = Block::filled(8, 1.0f32).unwrap();
        release(&mut block);
        assert!(block.is_null());
        assert_eq!(block.len(), 0);
        assert!(block.as_slice().is_empty());
        release(&mut block);
        assert!(block.is_null());
    }

    #[test]
    fn release_drops_elements() {
        let marker = Rc::new(());
        let mut block = Block::filled(3, Rc::clone(&marker)).unwrap();
        assert_eq!(Rc::strong_count(&marker), 4);
        block.release();
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn panicking_init_drops_written_prefix() {
        let marker = Rc::new(());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            allocate::<Rc<()>>(6).unwrap().init_with(|i| {
                assert!(i < 3, "init failed at {i}");
                Rc::clone(&marker)
            })
        }));
        assert!(result.is_err());
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn drop_releases() {
        let marker = Rc::new(());
        {
            let _block = Block::filled(2, Rc::clone(&marker)).unwrap();
            assert_eq!(Rc::strong_count(&marker), 3);
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn null_default_and_debug() {
        let block: Block<u8> = Block::default();
        assert!(block.is_null());
        assert_eq!(format!("{block:?}"), "Block(null)");
        let live = Block::from_slice(&[1u8, 2]).unwrap();
        assert_eq!(format!("{live:?}"), "[1, 2]");
    }

    #[test]
    fn try_clone_is_deep() {
        let mut a = Block::from_slice(&[1i64, 2, 3]).unwrap();
        let b = a.try_clone().unwrap();
        a[0] = 99;
        assert_eq!(b.as_slice(), &[1, 2, 3]);
        assert!(Block::<i64>::null().try_clone().unwrap().is_null());
    }

    #[test]
    fn byte_view_of_plain_block() {
        let mut block = Block::from_slice(&[1u32, 2]).unwrap();
        assert_eq!(block.as_bytes().len(), 8);
        block.as_bytes_mut()[..4].copy_from_slice(&7u32.to_ne_bytes());
        assert_eq!(block.as_slice(), &[7, 2]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn allocation_holds_exactly_count(count in 0usize..4096) {
                let block = Block::from_fn(count, |i| i as u64).unwrap();
                prop_assert_eq!(block.len(), count);
                prop_assert!(block.iter().enumerate().all(|(i, &v)| v == i as u64));
            }

            #[test]
            fn double_release_matches_single(values in proptest::collection::vec(any::<i32>(), 0..64)) {
                let mut once = Block::from_slice(&values).unwrap();
                let mut twice = Block::from_slice(&values).unwrap();
                once.release();
                twice.release();
                twice.release();
                prop_assert_eq!(once.is_null(), twice.is_null());
                prop_assert_eq!(once.len(), twice.len());
            }
        }
    }
}
