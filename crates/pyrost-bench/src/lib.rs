//! Benchmark fixtures for the pyrost memory utilities.
//!
//! - [`ramp_block`]: an `f32` block filled with `0, 1, 2, ...`
//! - [`frame_pool`]: a pool of image-sized frames with `live` frames acquired

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use pyrost_mem::{Block, BlockPool, MemError, PoolConfig, PoolHandle};

/// Side length of the square frames used by the pool benchmarks.
pub const FRAME_SIDE: usize = 256;

/// Build an `f32` block of `len` elements holding `0.0, 1.0, 2.0, ...`.
pub fn ramp_block(len: usize) -> Result<Block<f32>, MemError> {
    Block::from_fn(len, |i| i as f32)
}

/// Build a pool of `FRAME_SIDE x FRAME_SIDE` frames with `live` of them
/// already acquired.
pub fn frame_pool(live: usize) -> Result<(BlockPool<f32>, Vec<PoolHandle>), MemError> {
    let config = PoolConfig::new(FRAME_SIDE * FRAME_SIDE).max_blocks(live.max(1) * 2);
    let mut pool = BlockPool::new(config);
    let handles = (0..live)
        .map(|_| pool.acquire())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((pool, handles))
}
