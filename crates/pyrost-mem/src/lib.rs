//! Typed allocation, free-and-null release and value swapping for pyrost.
//!
//! The numerical core (phase retrieval, FFT reconstruction, sampling)
//! builds on three memory primitives provided here:
//!
//! - **Allocate / Release:** [`Block<T>`] owns a typed heap block.
//!   [`allocate`] returns uninitialized storage or
//!   [`MemError::AllocationExhausted`]; [`release`] frees it and leaves the
//!   null sentinel behind, so a second release is a no-op.
//! - **SwapTyped:** [`swap_typed`] exchanges two values by move.
//! - **SwapBytes:** [`swap_bytes`], [`swap_bytes_fixed`], [`swap_within`]
//!   and [`swap_plain`] exchange byte regions through scoped scratch space.
//!
//! On top of those, [`SwapScratch`] reuses scratch storage across many
//! swaps and [`BlockPool`] recycles same-sized blocks behind generational
//! [`PoolHandle`]s.
//!
//! ```text
//! raw      (unsafe: alloc/dealloc, slice and byte views)
//! ├── block    Block<T>, allocate, release
//! ├── plain    Plain marker, byte views
//! └── swap     swap_typed, swap_bytes, swap_within, swap_plain
//!     ├── scratch  SwapScratch
//!     └── pool     BlockPool<T>, PoolHandle (+ config::PoolConfig)
//! ```
//!
//! # Zero-length allocations
//!
//! `allocate::<T>(0)` succeeds with a live, zero-length block that never
//! touched the heap; it is distinct from the null sentinel. Zero-sized `T`
//! behaves the same for any count.
//!
//! # Concurrency
//!
//! Nothing here locks. `Block<T>` is `Send`/`Sync` exactly when `T` is;
//! callers partition blocks between threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod config;
pub mod error;
pub mod plain;
pub mod pool;
mod raw;
pub mod scratch;
pub mod swap;

// Public re-exports for the primary API surface.
pub use block::{allocate, release, Block};
pub use config::PoolConfig;
pub use error::MemError;
pub use plain::Plain;
pub use pool::{BlockPool, PoolHandle};
pub use scratch::SwapScratch;
pub use swap::{
    swap_bytes, swap_bytes_fixed, swap_plain, swap_typed, swap_within, INLINE_SCRATCH_BYTES,
};
