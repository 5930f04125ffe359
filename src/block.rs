//! Block headers and the table that holds them
use alloc::collections::BTreeMap;
use core::mem;

/// The header of a memory block.
///
/// Headers live in a [`BlockTable`] keyed by the block's offset in the arena
/// rather than inside the arena itself; the arena still reserves
/// [`HEADER_SIZE`](crate::FibHeapOptions::HEADER_SIZE) bytes at the start of
/// each block for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHdr {
    /// The size of the whole block, including the header. Always
    /// `table[fib_index]`.
    pub size: usize,
    /// The number of bytes requested by the current occupant. Zero for a free
    /// block.
    pub req_size: usize,
    pub fib_index: usize,
    pub free: bool,
    /// The free-list links. Only meaningful while `free` is set.
    pub next_free: Option<usize>,
    pub prev_free: Option<usize>,
}

/// The footprint of one block header.
pub const DEFAULT_HEADER_SIZE: usize = mem::size_of::<BlockHdr>();

impl BlockHdr {
    #[inline]
    pub fn new(size: usize, fib_index: usize) -> Self {
        Self {
            size,
            req_size: 0,
            fib_index,
            free: false,
            next_free: None,
            prev_free: None,
        }
    }
}

/// Every block in the arena, keyed by starting offset.
///
/// The blocks tile the arena: iterating in key order visits ranges that are
/// adjacent, non-overlapping and cover `0..capacity`.
#[derive(Debug, Default)]
pub(crate) struct BlockTable {
    blocks: BTreeMap<usize, BlockHdr>,
}

impl BlockTable {
    #[inline]
    pub fn get(&self, ofs: usize) -> Option<&BlockHdr> {
        self.blocks.get(&ofs)
    }

    #[inline]
    pub fn get_mut(&mut self, ofs: usize) -> Option<&mut BlockHdr> {
        self.blocks.get_mut(&ofs)
    }

    /// Install a header at `ofs`, replacing whatever block started there.
    #[inline]
    pub fn insert(&mut self, ofs: usize, hdr: BlockHdr) {
        self.blocks.insert(ofs, hdr);
    }

    /// Forget the block at `ofs`. Used when it's absorbed by a neighbor.
    #[inline]
    pub fn remove(&mut self, ofs: usize) -> Option<BlockHdr> {
        self.blocks.remove(&ofs)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BlockHdr)> + Clone + '_ {
        self.blocks.iter().map(|(&ofs, hdr)| (ofs, hdr))
    }
}

/// An allocation returned by [`FibHeap::allocate`](crate::FibHeap::allocate).
///
/// It's the arena offset of the usable region, which immediately follows the
/// block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHandle(pub(crate) usize);

impl BlockHandle {
    /// The offset of the usable region in the arena.
    #[inline]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A read-only view of one block, as reported by
/// [`FibHeap::blocks`](crate::FibHeap::blocks) and
/// [`FibHeap::free_blocks`](crate::FibHeap::free_blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// The offset of the block (its header) in the arena.
    pub address: usize,
    pub size: usize,
    pub fib_index: usize,
    pub free: bool,
    /// The size requested by the current occupant, or zero.
    pub req_size: usize,
}

impl BlockInfo {
    #[inline]
    pub(crate) fn new(address: usize, hdr: &BlockHdr) -> Self {
        Self {
            address,
            size: hdr.size,
            fib_index: hdr.fib_index,
            free: hdr.free,
            req_size: hdr.req_size,
        }
    }
}
