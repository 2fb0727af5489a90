//! Reusable scratch space for repeated byte swaps.
//!
//! [`SwapScratch`] holds a `Vec<u8>` that grows to the largest region it has
//! swapped and is then reused, so hot loops that exchange many large
//! regions (e.g. flipping image rows) pay for the scratch allocation once.

use crate::swap::split_regions;

/// Growable scratch buffer for byte-region swaps.
///
/// ```
/// use pyrost_mem::SwapScratch;
///
/// let mut scratch = SwapScratch::new(0);
/// let (mut a, mut b) = (vec![1u8; 512], vec![2u8; 512]);
/// scratch.swap(&mut a, &mut b);
/// assert_eq!(a[0], 2);
/// ```
#[derive(Debug, Default)]
pub struct SwapScratch {
    /// Backing storage. Grows on demand, shrinks only via `shrink_to`.
    data: Vec<u8>,
}

impl SwapScratch {
    /// Create a scratch buffer with `initial_capacity` bytes ready.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            data: vec![0; initial_capacity],
        }
    }

    /// Exchange the contents of two equal-length byte regions.
    ///
    /// # Panics
    ///
    /// Panics if `a.len() != b.len()`.
    pub fn swap(&mut self, a: &mut [u8], b: &mut [u8]) {
        assert_eq!(
            a.len(),
            b.len(),
            "swap regions differ in length: {} vs {}",
            a.len(),
            b.len()
        );
        let tmp = self.reserve(a.len());
        tmp.copy_from_slice(a);
        a.copy_from_slice(b);
        b.copy_from_slice(tmp);
    }

    /// Exchange two non-overlapping `len`-byte regions of `buf` at offsets
    /// `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if a region is out of bounds or the regions overlap.
    pub fn swap_within(&mut self, buf: &mut [u8], a: usize, b: usize, len: usize) {
        let (left, right) = split_regions(buf, a, b, len);
        self.swap(left, right);
    }

    /// Total capacity of the backing storage in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Heap memory held by the scratch buffer in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.capacity()
    }

    /// Drop backing storage beyond `bytes`.
    pub fn shrink_to(&mut self, bytes: usize) {
        if self.data.len() > bytes {
            self.data.truncate(bytes);
            self.data.shrink_to_fit();
            tracing::debug!(bytes, "swap scratch shrunk");
        }
    }

    fn reserve(&mut self, len: usize) -> &mut [u8] {
        if len > self.data.len() {
            // Grow to at least double, or exactly `len` if doubling overflows.
            let new_len = self.data.len().checked_mul(2).unwrap_or(len).max(len);
            self.data.resize(new_len, 0);
        }
        &mut self.data[..len]
    }
}
