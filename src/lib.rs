//! This crate implements a memory allocator that partitions a fixed-size
//! arena with a Fibonacci buddy system.
//!
//!  - **Every block size is a Fibonacci term.** The table starts at `1, 2`
//!    and each term is the sum of the previous two. A block of `T[n]` bytes
//!    splits into buddies of `T[n - 1]` and `T[n - 2]` bytes, which re-merge
//!    into the original block when both are free.
//!
//!  - **Finer size classes than power-of-two buddies.** Consecutive terms
//!    differ by a factor of about 1.618 instead of 2, so rounding up wastes
//!    less memory on average.
//!
//!  - **The arena is owned by the heap.** Its size is the largest Fibonacci
//!    term not exceeding the requested capacity. It's allocated once and
//!    released when the heap is dropped.
//!
//!  - **This crate supports `#![no_std]`** (with `alloc`).
//!
//! # Examples
//!
//! ```rust
//! use fibheap::FibHeap;
//!
//! let mut heap: FibHeap = FibHeap::new(1 << 16).unwrap();
//!
//! let a = heap.allocate(100).unwrap();
//! let b = heap.allocate(200).unwrap();
//! heap.payload_mut(a).unwrap()[..5].copy_from_slice(b"hello");
//! assert_eq!(&heap.payload(a).unwrap()[..5], b"hello");
//! assert_eq!(heap.validate().map(|n| n > 0), Ok(true));
//!
//! heap.deallocate(b).unwrap();
//! heap.deallocate(a).unwrap();
//! assert_eq!(heap.free_bytes(), heap.capacity());
//! assert!(heap.validate().is_ok());
//!
//! // Freeing the only allocation of a fresh heap merges everything back
//! let mut heap: FibHeap = FibHeap::new(1 << 16).unwrap();
//! let c = heap.allocate(1000).unwrap();
//! heap.deallocate(c).unwrap();
//! assert_eq!(heap.validate(), Ok(1));
//! ```
//!
//! # Details
//!
//! ## Block selection
//!
//! An allocation of `n` bytes needs a block of at least `n +`
//! [`HEADER_SIZE`](FibHeapOptions::HEADER_SIZE) bytes, rounded up to the
//! smallest such term `T[k]`. The free list is searched for the first block
//! of index `k`; failing that, for the first block of the smallest index
//! greater than `k`, which is then split repeatedly, always continuing with
//! the left (larger) half, until it's of index `k`. The one exception is
//! `k = 0`: splitting `T[2]` yields `T[1] + T[0]`, and the right half is
//! taken.
//!
//! ## Merging
//!
//! When a block of index `n` is freed, it's merged with its right neighbor
//! if that is free and of index `n - 1`, or else with its left neighbor
//! under the same condition. The merged block has index `n + 1`, and merging
//! is repeated on it until neither neighbor qualifies. A `T[0]` block has no
//! smaller buddy; it rejoins the `T[1]` block on its left instead.
//!
//! The rule is direction-sensitive: the smaller right half of a split doesn't
//! look for its larger left sibling. Consequently, whether a group of freed
//! blocks coalesces all the way back depends on the order they are freed in.
//!
//! ## Threading
//!
//! [`FibHeap`] is a plain single-owner value; every operation takes `&mut
//! self` (or `&self`) and runs to completion. Sharing one between threads
//! requires wrapping the whole heap in a lock.
#![no_std]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod arena;
mod block;
mod error;
mod fib;
mod free_list;
mod heap;
mod options;
mod snapshot;

pub use self::{
    block::{BlockHandle, BlockInfo, DEFAULT_HEADER_SIZE},
    error::{AllocError, Corruption, FreeError, InitError, ValidateError},
    fib::{FibTable, MAX_FIB_COUNT},
    heap::{FibHeap, FreeBlocks},
    options::{DefaultOptions, FibHeapOptions},
    snapshot::Snapshot,
};

#[cfg(test)]
mod tests;
