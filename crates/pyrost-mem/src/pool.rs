//! Pool of same-sized blocks addressed by generational handles.
//!
//! [`BlockPool`] serves code that repeatedly needs blocks of one fixed
//! length (image frames, FFT work buffers). Released slots keep their
//! storage and are handed out again by the next [`acquire`](BlockPool::acquire),
//! so steady-state loops do not touch the heap. Each release bumps the
//! slot generation, which turns outstanding copies of the handle stale.

use std::fmt;

use crate::block::Block;
use crate::config::PoolConfig;
use crate::error::MemError;
use crate::swap::swap_typed;

/// Index + generation reference to a pooled block.
///
/// [`PoolHandle::NULL`] is the empty sentinel; [`BlockPool::release`]
/// overwrites the caller's handle with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// The empty sentinel. Never resolves to a block.
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: 0,
    };

    /// Whether this is the empty sentinel.
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }

    /// Slot index within the pool.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at the time the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("PoolHandle(null)");
        }
        write!(f, "PoolHandle(slot={}, gen={})", self.index, self.generation)
    }
}

/// A single pool slot.
struct Slot<T> {
    /// Storage; null after `trim()` until the slot is reused.
    block: Block<T>,
    /// Bumped on every release. A slot whose generation wraps back to 0
    /// is retired for good.
    generation: u32,
    live: bool,
}

/// Arena of `config.block_len`-element blocks with slot reuse.
pub struct BlockPool<T> {
    config: PoolConfig,
    /// All slots (live and released).
    slots: Vec<Slot<T>>,
    /// Indices of released slots available for reuse.
    free_list: Vec<usize>,
    /// Slots retired after generation wraparound. Never reused.
    retired: usize,
}

impl<T> BlockPool<T> {
    /// Create an empty pool. No storage is allocated until `acquire`.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free_list: Vec::new(),
            retired: 0,
        }
    }

    /// The pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Resolve a handle to its slot index if it refers to a live block.
    fn resolve(&self, handle: PoolHandle) -> Option<usize> {
        if handle.is_null() {
            return None;
        }
        let idx = handle.index as usize;
        let slot = self.slots.get(idx)?;
        (slot.live && slot.generation == handle.generation).then_some(idx)
    }

    fn resolve_or_stale(&self, handle: PoolHandle) -> Result<usize, MemError> {
        self.resolve(handle).ok_or(MemError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        })
    }

    /// Shared view of a live block, `None` for null or stale handles.
    pub fn get(&self, handle: PoolHandle) -> Option<&[T]> {
        let idx = self.resolve(handle)?;
        Some(self.slots[idx].block.as_slice())
    }

    /// Mutable view of a live block, `None` for null or stale handles.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut [T]> {
        let idx = self.resolve(handle)?;
        Some(self.slots[idx].block.as_mut_slice())
    }

    /// Whether `handle` refers to a live block of this pool.
    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Return a block to the pool and set `handle` to [`PoolHandle::NULL`].
    ///
    /// The slot keeps its storage for reuse. Null and stale handles are
    /// ignored (apart from being nulled). If the slot generation wraps to 0
    /// the slot is retired instead: its storage is freed and it is never
    /// handed out again, so old generation-0 handles cannot resolve.
    pub fn release(&mut self, handle: &mut PoolHandle) {
        if let Some(idx) = self.resolve(*handle) {
            let slot = &mut self.slots[idx];
            slot.live = false;
            slot.generation = slot.generation.wrapping_add(1);
            if slot.generation != 0 {
                self.free_list.push(idx);
                tracing::trace!(slot = idx, "pool block released");
            } else {
                slot.block.release();
                self.retired += 1;
                tracing::debug!(slot = idx, "pool slot retired after generation wraparound");
            }
        }
        *handle = PoolHandle::NULL;
    }

    /// Exchange the storage behind two live handles in O(1).
    ///
    /// Afterwards `a` resolves to the data previously behind `b` and vice
    /// versa. Swapping a handle with itself is a no-op.
    pub fn swap_blocks(&mut self, a: PoolHandle, b: PoolHandle) -> Result<(), MemError> {
        let ia = self.resolve_or_stale(a)?;
        let ib = self.resolve_or_stale(b)?;
        if ia == ib {
            return Ok(());
        }
        let (lo, hi) = (ia.min(ib), ia.max(ib));
        let (head, tail) = self.slots.split_at_mut(hi);
        swap_typed(&mut head[lo].block, &mut tail[0].block);
        Ok(())
    }

    /// Free the storage of every released slot.
    ///
    /// Slots stay in the pool and are re-populated on the next `acquire`.
    pub fn trim(&mut self) {
        let mut freed = 0usize;
        for &idx in &self.free_list {
            let block = &mut self.slots[idx].block;
            if !block.is_null() {
                freed += block.byte_len();
                block.release();
            }
        }
        if freed > 0 {
            tracing::debug!(freed_bytes = freed, "block pool trimmed");
        }
    }

    /// Number of live blocks.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len() - self.retired
    }

    /// Number of released slots available for reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Number of slots retired after generation wraparound.
    pub fn retired_count(&self) -> usize {
        self.retired
    }

    /// Total slots (live + released + retired).
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Heap storage held by the pool's blocks in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.slots.iter().map(|s| s.block.byte_len()).sum()
    }
}

impl<T: Default> BlockPool<T> {
    /// Hand out a block of `block_len` elements, each `T::default()`.
    ///
    /// Released slots are reused before new storage is allocated. Fails
    /// with [`MemError::PoolFull`] when every slot is live or retired, or
    /// [`MemError::AllocationExhausted`] if the heap refuses new storage.
    pub fn acquire(&mut self) -> Result<PoolHandle, MemError> {
        if let Some(idx) = self.free_list.pop() {
            let block_len = self.config.block_len;
            let slot = &mut self.slots[idx];
            if slot.block.is_null() {
                match Block::from_fn(block_len, |_| T::default()) {
                    Ok(block) => slot.block = block,
                    Err(err) => {
                        self.free_list.push(idx);
                        return Err(err);
                    }
                }
            } else {
                slot.block.iter_mut().for_each(|v| *v = T::default());
            }
            slot.live = true;
            return Ok(PoolHandle {
                index: idx as u32,
                generation: slot.generation,
            });
        }

        let limit = self.config.slot_limit();
        if self.slots.len() >= limit {
            tracing::warn!(max_blocks = limit, "block pool full");
            return Err(MemError::PoolFull { max_blocks: limit });
        }

        let block = Block::from_fn(self.config.block_len, |_| T::default())?;
        let idx = self.slots.len();
        self.slots.push(Slot {
            block,
            generation: 0,
            live: true,
        });
        tracing::debug!(slots = self.slots.len(), "block pool grew");
        Ok(PoolHandle {
            index: idx as u32,
            generation: 0,
        })
    }
}

impl<T> fmt::Debug for BlockPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("config", &self.config)
            .field("live", &self.live_count())
            .field("free", &self.free_count())
            .field("retired", &self.retired)
            .finish()
    }
}
