//! Compile-time heap parameters
use crate::{block::DEFAULT_HEADER_SIZE, fib::MAX_FIB_COUNT};

/// Parameters for [`FibHeap`](crate::FibHeap).
///
/// # Examples
///
/// ```
/// use fibheap::{FibHeap, FibHeapOptions};
///
/// struct TinyHeader;
/// impl FibHeapOptions for TinyHeader {
///     const HEADER_SIZE: usize = 4;
/// }
///
/// let mut heap: FibHeap<TinyHeader> = FibHeap::new(100).unwrap();
/// let h = heap.allocate(1).unwrap();
/// assert_eq!(heap.usable_size(h), Some(1));
/// ```
pub trait FibHeapOptions {
    /// The number of bytes every block reserves for its header. An
    /// allocation of `n` bytes needs a block of at least `n + HEADER_SIZE`
    /// bytes.
    const HEADER_SIZE: usize = DEFAULT_HEADER_SIZE;

    /// The maximum number of Fibonacci terms, which caps the arena size.
    const MAX_TERMS: usize = MAX_FIB_COUNT;
}

/// The default [`FibHeapOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOptions;

impl FibHeapOptions for DefaultOptions {}
