//! Memory-facility error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during allocation and pool operations.
///
/// Swaps and releases never fail; precondition violations on those
/// (mismatched lengths, overlapping regions) panic instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemError {
    /// The global allocator could not satisfy a block request.
    ///
    /// Also produced when `count * element_size` does not fit in `isize`,
    /// since such a request can never be satisfied.
    AllocationExhausted {
        /// Number of elements requested.
        count: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// Every slot of a [`BlockPool`](crate::BlockPool) is live.
    PoolFull {
        /// The pool's slot limit.
        max_blocks: usize,
    },
    /// A [`PoolHandle`](crate::PoolHandle) whose slot has been released
    /// (or that never referred to a slot of this pool).
    StaleHandle {
        /// Slot index encoded in the handle.
        index: u32,
        /// Generation encoded in the handle.
        generation: u32,
    },
}

impl MemError {
    /// Exhaustion error for a request of `count` elements of `T`.
    pub(crate) fn exhausted<T>(count: usize) -> Self {
        Self::AllocationExhausted {
            count,
            element_size: std::mem::size_of::<T>(),
        }
    }
}

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationExhausted {
                count,
                element_size,
            } => {
                write!(
                    f,
                    "allocation exhausted: requested {count} elements of {element_size} bytes"
                )
            }
            Self::PoolFull { max_blocks } => {
                write!(f, "block pool full: all {max_blocks} slots are live")
            }
            Self::StaleHandle { index, generation } => {
                write!(f, "stale pool handle: slot {index}, generation {generation}")
            }
        }
    }
}

impl Error for MemError {}
