//! A read-only report of the heap state
use alloc::vec::Vec;
use core::fmt;

use crate::block::BlockInfo;

/// The free blocks of a heap and its allocated total at one point in time,
/// as returned by [`FibHeap::snapshot`](crate::FibHeap::snapshot).
///
/// The `Display` implementation renders a human-readable summary:
///
/// ```
/// use fibheap::FibHeap;
/// let heap: FibHeap = FibHeap::new(100).unwrap();
/// assert_eq!(
///     heap.snapshot().to_string(),
///     "free list:\n  [1] addr: 0, size: 89 (T[9])\ntotal free memory: 89 bytes\n",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// In ascending address order
    pub free_blocks: Vec<BlockInfo>,
    /// The total size of the allocated blocks
    pub allocated: usize,
    pub capacity: usize,
}

impl Snapshot {
    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.capacity - self.allocated
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "free list:")?;
        if self.free_blocks.is_empty() {
            writeln!(f, "  (empty)")?;
        }
        for (i, block) in self.free_blocks.iter().enumerate() {
            writeln!(
                f,
                "  [{}] addr: {}, size: {} (T[{}])",
                i + 1,
                block.address,
                block.size,
                block.fib_index
            )?;
        }
        writeln!(f, "total free memory: {} bytes", self.free_bytes())
    }
}
