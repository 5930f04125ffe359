//! Free-list consistency checks
use super::FibHeap;
use crate::{
    error::{Corruption, ValidateError},
    options::FibHeapOptions,
};

impl<Options: FibHeapOptions> FibHeap<Options> {
    /// Check the free list's invariants and return the number of free blocks.
    ///
    /// The list must start at a head without a predecessor, visit strictly
    /// increasing addresses with matching backward links, contain only blocks
    /// marked free, and contain every block marked free.
    ///
    /// This method never modifies the heap.
    pub fn validate(&self) -> Result<usize, ValidateError> {
        let corrupted = |at, kind| ValidateError::FreeListCorrupted { at, kind };

        let mut count = 0;
        let mut prev: Option<usize> = None;
        let mut cur = self.free_list.head;
        while let Some(ofs) = cur {
            if count >= self.blocks.len() {
                return Err(corrupted(ofs, Corruption::Cycle));
            }
            let hdr = self
                .blocks
                .get(ofs)
                .ok_or_else(|| corrupted(ofs, Corruption::DanglingLink))?;

            if !hdr.free {
                return Err(corrupted(ofs, Corruption::NotFree));
            }

            match prev {
                None if hdr.prev_free.is_some() => {
                    return Err(corrupted(ofs, Corruption::BadHead));
                }
                None => {}
                Some(prev) if prev >= ofs => {
                    return Err(corrupted(ofs, Corruption::OutOfOrder));
                }
                Some(prev) if hdr.prev_free != Some(prev) => {
                    return Err(corrupted(ofs, Corruption::BrokenBackLink));
                }
                Some(_) => {}
            }

            count += 1;
            prev = Some(ofs);
            cur = hdr.next_free;
        }

        // Every block marked free must have been visited. Both sequences are
        // sorted by address, so walk them side by side.
        let mut listed = self.free_list.iter(&self.blocks).map(|(ofs, _)| ofs).peekable();
        for (ofs, _) in self.blocks.iter().filter(|(_, hdr)| hdr.free) {
            if listed.next_if_eq(&ofs).is_none() {
                return Err(corrupted(ofs, Corruption::UnlistedFreeBlock));
            }
        }

        debug_assert_eq!(count, self.free_list.len());
        Ok(count)
    }
}
