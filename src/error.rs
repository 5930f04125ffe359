//! Error types
use thiserror::Error;

use crate::BlockHandle;

/// An error returned while setting up a [`FibHeap`](crate::FibHeap).
///
/// Both variants are fatal to the session that was being created.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// Not even the first Fibonacci term fits in the requested capacity.
    #[error("capacity {capacity} is too small to hold any block")]
    CapacityTooSmall { capacity: usize },

    /// No table term can serve as the arena's size, or the backing storage
    /// for it could not be reserved.
    #[error("no usable arena capacity for a request of {capacity} bytes")]
    NoUsableCapacity { capacity: usize },
}

/// An error returned by [`FibHeap::try_allocate`](crate::FibHeap::try_allocate).
///
/// Neither variant leaves any trace in the heap; the caller may retry with a
/// smaller size or after freeing something.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The request plus the block header exceeds the largest block size.
    #[error("request of {size} bytes exceeds the largest block ({max_block} bytes)")]
    RequestTooLarge { size: usize, max_block: usize },

    /// No free block is large enough.
    #[error("out of memory while allocating {size} bytes")]
    OutOfMemory { size: usize },
}

/// An error returned by [`FibHeap::deallocate`](crate::FibHeap::deallocate).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeError {
    /// The handle does not denote a live allocation: it was never returned by
    /// this heap or it has already been freed.
    #[error("invalid free of {handle:?}")]
    InvalidFree { handle: BlockHandle },
}

/// An error returned by [`FibHeap::validate`](crate::FibHeap::validate).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateError {
    /// The free list violates one of its invariants. This indicates a bug in
    /// the allocator, after which no further operation can be trusted.
    #[error("free list corrupted at offset {at}: {kind}")]
    FreeListCorrupted { at: usize, kind: Corruption },
}

/// The free-list invariant found to be broken.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    #[error("the head entry has a predecessor")]
    BadHead,
    #[error("a listed block is not marked free")]
    NotFree,
    #[error("addresses are not strictly increasing")]
    OutOfOrder,
    #[error("the backward link does not match the forward link")]
    BrokenBackLink,
    #[error("a link points at no block")]
    DanglingLink,
    #[error("the list does not terminate")]
    Cycle,
    #[error("a free block is missing from the list")]
    UnlistedFreeBlock,
}
