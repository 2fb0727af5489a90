//! Block pool configuration parameters.

/// Configuration for a [`BlockPool`](crate::BlockPool).
///
/// All blocks in a pool have the same length; the pool never holds more
/// than `max_blocks` slots. Values are fixed once the pool is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Length of every pooled block, in elements.
    pub block_len: usize,

    /// Maximum number of slots (live + released) the pool may hold.
    ///
    /// Default: 64.
    pub max_blocks: usize,
}

impl PoolConfig {
    /// Default maximum slot count.
    pub const DEFAULT_MAX_BLOCKS: usize = 64;

    /// Hard cap on slots: handle indices are `u32` and `u32::MAX` is the
    /// null sentinel.
    pub const MAX_SLOTS: usize = u32::MAX as usize;

    /// Create a pool config for blocks of `block_len` elements.
    ///
    /// Uses default values for all other parameters.
    pub fn new(block_len: usize) -> Self {
        Self {
            block_len,
            max_blocks: Self::DEFAULT_MAX_BLOCKS,
        }
    }

    /// Set the slot limit.
    pub fn max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Slot limit a pool actually enforces: `max_blocks` capped at
    /// [`PoolConfig::MAX_SLOTS`].
    pub fn slot_limit(&self) -> usize {
        self.max_blocks.min(Self::MAX_SLOTS)
    }

    /// Storage of a single block in bytes, for elements of `T`.
    pub fn block_bytes<T>(&self) -> usize {
        self.block_len.saturating_mul(std::mem::size_of::<T>())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
