//! The Fibonacci buddy allocator core
use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::{
    arena::Arena,
    block::{BlockHandle, BlockHdr, BlockInfo, BlockTable},
    error::{AllocError, InitError},
    fib::FibTable,
    free_list::{FreeList, FreeListIter},
    options::{DefaultOptions, FibHeapOptions},
    snapshot::Snapshot,
};

mod coalesce;
mod validate;

#[doc = svgbobdoc::transform!(
/// An allocator session: a fixed arena carved into blocks whose sizes are
/// Fibonacci terms.
///
/// # Data Structure Overview
///
/// <center>
/// ```svgbob
///   table     T[0]=1  T[1]=2  T[2]=3  T[3]=5  T[4]=8  T[5]=13
///
///   arena     0                                            13
///             +--------------------------------------------+
///   initial   |                   T[5]                     |
///             +--------------------------------------------+
///
///   split     +---------------------------+----------------+
///             |           T[4]            |      T[3]      |
///             +---------------------------+----------------+
///
///   split     +----------------+----------+----------------+
///   again     |      T[3]      |   T[2]   |      T[3]      |
///             +----------------+----------+----------------+
///                  ^
///                  | allocated
///
///   free_list ---> [5: T[2]] <---> [8: T[3]]   (ascending address)
/// ```
/// </center>
///
/// A block of index `n` splits into a left block of index `n - 1` and a right
/// block of index `n - 2`. When a block is freed, it's merged with an
/// adjacent free block whose index is exactly one less, repeatedly, until no
/// such neighbor remains.
///
/// # Properties
///
/// The arena size is the largest table term not exceeding the requested
/// capacity. Every block reserves [`FibHeapOptions::HEADER_SIZE`] bytes, so
/// an allocation of `n` bytes occupies the smallest term `>= n +
/// HEADER_SIZE`.
///
/// Allocation and deallocation are linear in the number of free blocks.
)]
#[derive(Debug)]
pub struct FibHeap<Options: FibHeapOptions = DefaultOptions> {
    table: FibTable,
    arena: Arena,
    blocks: BlockTable,
    free_list: FreeList,
    /// The total size of the allocated blocks, headers included
    allocated: usize,
    _phantom: PhantomData<fn() -> Options>,
}

impl<Options: FibHeapOptions> FibHeap<Options> {
    /// Create a heap whose arena is the largest Fibonacci term not exceeding
    /// `capacity`. The arena starts out as a single free block.
    ///
    /// # Examples
    ///
    /// ```
    /// use fibheap::FibHeap;
    /// let heap: FibHeap = FibHeap::new(1000).unwrap();
    /// assert_eq!(heap.capacity(), 987);
    /// assert_eq!(heap.validate(), Ok(1));
    /// ```
    pub fn new(capacity: usize) -> Result<Self, InitError> {
        let table = FibTable::build_bounded(capacity, Options::MAX_TERMS)?;
        let arena = Arena::new(&table, capacity)?;

        let top_index = arena.top_index();
        let mut blocks = BlockTable::default();
        blocks.insert(0, BlockHdr::new(table[top_index], top_index));

        let mut free_list = FreeList::default();
        free_list.insert_sorted(&mut blocks, 0);

        Ok(Self {
            table,
            arena,
            blocks,
            free_list,
            allocated: 0,
            _phantom: PhantomData,
        })
    }

    /// The block sizes this heap works with.
    #[inline]
    pub fn table(&self) -> &FibTable {
        &self.table
    }

    /// The size of the arena.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// The total size of the allocated blocks, headers included.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// `capacity() - allocated()`
    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.capacity() - self.allocated
    }

    /// Attempt to allocate `size` bytes.
    ///
    /// Returns `None` if `size` is zero or the allocation fails. See
    /// [`Self::try_allocate`] for the reason of a failure.
    #[inline]
    pub fn allocate(&mut self, size: usize) -> Option<BlockHandle> {
        self.try_allocate(size).ok().flatten()
    }

    /// Attempt to allocate `size` bytes, reporting why it failed.
    ///
    /// A zero-sized request yields `Ok(None)` and doesn't touch the heap.
    /// On failure, the heap is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use fibheap::{AllocError, FibHeap, FibHeapOptions};
    ///
    /// struct NoHeader;
    /// impl FibHeapOptions for NoHeader {
    ///     const HEADER_SIZE: usize = 0;
    /// }
    ///
    /// let mut heap: FibHeap<NoHeader> = FibHeap::new(13).unwrap();
    /// assert_eq!(heap.try_allocate(0), Ok(None));
    /// assert_eq!(
    ///     heap.try_allocate(14),
    ///     Err(AllocError::RequestTooLarge { size: 14, max_block: 13 })
    /// );
    ///
    /// let h = heap.try_allocate(5).unwrap().unwrap();
    /// assert_eq!(heap.usable_size(h), Some(5));
    /// assert_eq!(heap.try_allocate(6), Err(AllocError::OutOfMemory { size: 6 }));
    /// ```
    pub fn try_allocate(&mut self, size: usize) -> Result<Option<BlockHandle>, AllocError> {
        if size == 0 {
            return Ok(None);
        }

        let too_large = AllocError::RequestTooLarge {
            size,
            max_block: self.table.largest(),
        };
        let need = size.checked_add(Options::HEADER_SIZE).ok_or(too_large)?;
        let target_index = self
            .table
            .index_of_smallest_at_least(need)
            .ok_or_else(|| {
                log::warn!("allocation of {} bytes failed: too large", size);
                too_large
            })?;

        let Some(mut ofs) = self.search_suitable_free_block(target_index) else {
            log::warn!(
                "allocation of {} bytes failed: no free block of T[{}] or larger",
                size,
                target_index
            );
            return Err(AllocError::OutOfMemory { size });
        };

        // Descend into the left half until the block is small enough
        while let Some(hdr) = self.blocks.get(ofs) {
            // `T[1]` can't be split into two terms; hand it out whole
            if hdr.fib_index <= target_index || hdr.fib_index < 2 {
                break;
            }
            let fib_index = hdr.fib_index;
            self.split_free_block(ofs);

            // `T[2]` splits into `T[1] + T[0]`; only the right half is an
            // exact fit for `T[0]`
            if fib_index == 2 && target_index == 0 {
                ofs += self.table[1];
                break;
            }
        }

        self.free_list.remove(&mut self.blocks, ofs);
        let Some(hdr) = self.blocks.get_mut(ofs) else {
            debug_assert!(false, "no block at {}", ofs);
            return Err(AllocError::OutOfMemory { size });
        };
        hdr.req_size = size;
        self.allocated += hdr.size;

        let handle = BlockHandle(ofs + Options::HEADER_SIZE);
        log::debug!(
            "allocated {} bytes (block of {} bytes, T[{}]) at {}",
            size,
            hdr.size,
            hdr.fib_index,
            handle.offset()
        );

        Ok(Some(handle))
    }

    /// Find the free block to carve an allocation of `T[target_index]` from:
    /// the first one of exactly that index, or else the first one of the
    /// smallest larger index.
    fn search_suitable_free_block(&self, target_index: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (ofs, hdr) in self.free_list.iter(&self.blocks) {
            if hdr.fib_index == target_index {
                return Some(ofs);
            }
            if hdr.fib_index > target_index && best.map_or(true, |(_, i)| hdr.fib_index < i) {
                best = Some((ofs, hdr.fib_index));
            }
        }
        best.map(|(ofs, _)| ofs)
    }

    /// Split the free block at `ofs` (index `n >= 2`) in place into a left
    /// block of index `n - 1` at `ofs` and a right block of index `n - 2`.
    /// Both halves end up in the free list.
    fn split_free_block(&mut self, ofs: usize) {
        self.free_list.remove(&mut self.blocks, ofs);

        let Some(hdr) = self.blocks.get_mut(ofs) else {
            debug_assert!(false, "no block at {}", ofs);
            return;
        };
        debug_assert!(hdr.fib_index >= 2);
        let (left_index, right_index) = (hdr.fib_index - 1, hdr.fib_index - 2);
        let left_size = self.table[left_index];
        let right_size = self.table[right_index];
        hdr.fib_index = left_index;
        hdr.size = left_size;
        hdr.req_size = 0;

        let right = ofs + left_size;
        self.blocks.insert(right, BlockHdr::new(right_size, right_index));

        self.free_list.insert_sorted(&mut self.blocks, ofs);
        self.free_list.insert_sorted(&mut self.blocks, right);

        log::trace!(
            "split {}: T[{}] at {} + T[{}] at {}",
            ofs,
            left_index,
            ofs,
            right_index,
            right
        );
    }

    /// Find the header of the live allocation `handle`.
    fn allocated_block(&self, handle: BlockHandle) -> Option<(usize, &BlockHdr)> {
        let ofs = handle.0.checked_sub(Options::HEADER_SIZE)?;
        self.blocks
            .get(ofs)
            .filter(|hdr| !hdr.free)
            .map(|hdr| (ofs, hdr))
    }

    /// The number of bytes usable through `handle`, i.e., the block size minus
    /// [`FibHeapOptions::HEADER_SIZE`]. `None` if `handle` isn't a live
    /// allocation.
    #[inline]
    pub fn usable_size(&self, handle: BlockHandle) -> Option<usize> {
        self.allocated_block(handle)
            .map(|(_, hdr)| hdr.size - Options::HEADER_SIZE)
    }

    /// The size that was requested when `handle` was allocated.
    #[inline]
    pub fn requested_size(&self, handle: BlockHandle) -> Option<usize> {
        self.allocated_block(handle).map(|(_, hdr)| hdr.req_size)
    }

    /// The usable bytes of an allocation.
    pub fn payload(&self, handle: BlockHandle) -> Option<&[u8]> {
        let (ofs, hdr) = self.allocated_block(handle)?;
        self.arena.bytes(handle.0..ofs + hdr.size)
    }

    /// The usable bytes of an allocation, mutably.
    pub fn payload_mut(&mut self, handle: BlockHandle) -> Option<&mut [u8]> {
        let (ofs, size) = self
            .allocated_block(handle)
            .map(|(ofs, hdr)| (ofs, hdr.size))?;
        self.arena.bytes_mut(handle.0..ofs + size)
    }

    /// Iterate over the free blocks in ascending address order.
    ///
    /// The iterator can be cloned to restart the walk.
    #[inline]
    pub fn free_blocks(&self) -> FreeBlocks<'_> {
        FreeBlocks(self.free_list.iter(&self.blocks))
    }

    /// Iterate over every block, free or not, in ascending address order.
    /// Consecutive blocks are adjacent and together they cover the arena.
    #[inline]
    pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + Clone + '_ {
        self.blocks
            .iter()
            .map(|(ofs, hdr)| BlockInfo::new(ofs, hdr))
    }

    /// Take a read-only report of the free blocks and the allocated total.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            free_blocks: self.free_blocks().collect::<Vec<_>>(),
            allocated: self.allocated,
            capacity: self.capacity(),
        }
    }
}

/// An iterator over the free blocks of a [`FibHeap`], created by
/// [`FibHeap::free_blocks`].
#[derive(Debug, Clone)]
pub struct FreeBlocks<'a>(FreeListIter<'a>);

impl Iterator for FreeBlocks<'_> {
    type Item = BlockInfo;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(ofs, hdr)| BlockInfo::new(ofs, hdr))
    }
}
