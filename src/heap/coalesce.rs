//! Deallocation and buddy merging
use super::FibHeap;
use crate::{block::BlockHandle, error::FreeError, options::FibHeapOptions};

impl<Options: FibHeapOptions> FibHeap<Options> {
    /// Deallocate a previously allocated block and merge it with its buddies.
    ///
    /// Fails with [`FreeError::InvalidFree`] if `handle` doesn't denote a live
    /// allocation of this heap. The heap is left unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use fibheap::{FibHeap, FreeError};
    /// let mut heap: FibHeap = FibHeap::new(4096).unwrap();
    /// let h = heap.allocate(100).unwrap();
    /// heap.deallocate(h).unwrap();
    /// assert_eq!(heap.deallocate(h), Err(FreeError::InvalidFree { handle: h }));
    /// ```
    pub fn deallocate(&mut self, handle: BlockHandle) -> Result<(), FreeError> {
        let Some((ofs, size)) = self
            .allocated_block(handle)
            .map(|(ofs, hdr)| (ofs, hdr.size))
        else {
            log::warn!("invalid free of {:?}", handle);
            return Err(FreeError::InvalidFree { handle });
        };

        self.allocated -= size;
        log::debug!("freeing a block of {} bytes at {}", size, handle.offset());

        if let Some(hdr) = self.blocks.get_mut(ofs) {
            hdr.req_size = 0;
        }
        self.free_list.insert_sorted(&mut self.blocks, ofs);
        self.coalesce(ofs);

        Ok(())
    }

    /// Merge the free block at `ofs` with free buddies until none is left.
    /// Returns the offset of the resulting block.
    ///
    /// A neighbor is a buddy if its index is exactly one less than the
    /// block's index `n`; the pair becomes a block of index `n + 1` at the
    /// lower address. The right neighbor is checked first.
    ///
    /// Nothing is smaller than `T[0]`, so a `T[0]` block instead rejoins the
    /// `T[1]` block on its left, its sibling from a split of `T[2]`.
    pub(crate) fn coalesce(&mut self, mut ofs: usize) -> usize {
        while let Some(hdr) = self.blocks.get(ofs) {
            debug_assert!(hdr.free);
            let Some(buddy_index) = hdr.fib_index.checked_sub(1) else {
                let sibling = self.table.get(1).and_then(|&t1| ofs.checked_sub(t1));
                match sibling {
                    Some(left) if self.is_free_with_index(left, 1) => {
                        self.merge_free_blocks(left, ofs);
                        ofs = left;
                        continue;
                    }
                    _ => break,
                }
            };

            let right = ofs + hdr.size;
            if self.arena.contains(right) && self.is_free_with_index(right, buddy_index) {
                self.merge_free_blocks(ofs, right);
                continue;
            }

            if ofs != 0 {
                // The left neighbor ends at `ofs`, so if it's a buddy, it
                // starts at `ofs - T[n - 1]`
                if let Some(left) = ofs.checked_sub(self.table[buddy_index]) {
                    if self.is_free_with_index(left, buddy_index) {
                        self.merge_free_blocks(left, ofs);
                        ofs = left;
                        continue;
                    }
                }
            }

            break;
        }

        ofs
    }

    #[inline]
    fn is_free_with_index(&self, ofs: usize, fib_index: usize) -> bool {
        self.blocks
            .get(ofs)
            .map_or(false, |hdr| hdr.free && hdr.fib_index == fib_index)
    }

    /// Replace the adjacent free blocks at `left` and `right` with a single
    /// free block at `left`, one index above the larger of the two.
    fn merge_free_blocks(&mut self, left: usize, right: usize) {
        self.free_list.remove(&mut self.blocks, left);
        self.free_list.remove(&mut self.blocks, right);

        let Some(right_hdr) = self.blocks.remove(right) else {
            debug_assert!(false, "no block at {}", right);
            return;
        };
        let Some(hdr) = self.blocks.get_mut(left) else {
            debug_assert!(false, "no block at {}", left);
            return;
        };
        debug_assert_eq!(left + hdr.size, right);

        let fib_index = hdr.fib_index.max(right_hdr.fib_index) + 1;
        hdr.size += right_hdr.size;
        hdr.fib_index = fib_index;
        hdr.req_size = 0;
        debug_assert_eq!(self.table.get(fib_index), Some(&hdr.size));

        log::trace!(
            "merged {} and {} into T[{}] ({} bytes)",
            left,
            right,
            fib_index,
            hdr.size
        );

        self.free_list.insert_sorted(&mut self.blocks, left);
    }
}
