//! The address-ordered list of free blocks
use crate::block::{BlockHdr, BlockTable};

/// A doubly linked list of free blocks sorted by ascending offset.
///
/// The links are block offsets stored in each member's [`BlockHdr`]
/// (`next_free`, `prev_free`), so the list itself only remembers its head.
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    pub(crate) head: Option<usize>,
    len: usize,
}

impl FreeList {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Mark the block at `ofs` free and splice it in before the first member
    /// with a greater offset.
    ///
    /// This is linear in the list length. The block must not be a member
    /// already.
    pub fn insert_sorted(&mut self, blocks: &mut BlockTable, ofs: usize) {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(c) = cur {
            if c > ofs {
                break;
            }
            debug_assert_ne!(c, ofs, "block {} is already in the free list", ofs);
            prev = Some(c);
            cur = blocks.get(c).and_then(|hdr| hdr.next_free);
        }

        let Some(hdr) = blocks.get_mut(ofs) else {
            debug_assert!(false, "no block at {}", ofs);
            return;
        };
        hdr.free = true;
        hdr.next_free = cur;
        hdr.prev_free = prev;

        if let Some(prev) = prev.and_then(|p| blocks.get_mut(p)) {
            prev.next_free = Some(ofs);
        } else {
            self.head = Some(ofs);
        }

        if let Some(next) = cur.and_then(|c| blocks.get_mut(c)) {
            next.prev_free = Some(ofs);
        }

        self.len += 1;
    }

    /// Splice the block at `ofs` out of the list and mark it not free.
    ///
    /// The block must currently be a member.
    pub fn remove(&mut self, blocks: &mut BlockTable, ofs: usize) {
        let Some(hdr) = blocks.get_mut(ofs) else {
            debug_assert!(false, "no block at {}", ofs);
            return;
        };
        debug_assert!(hdr.free, "block {} is not in the free list", ofs);
        let BlockHdr {
            next_free,
            prev_free,
            ..
        } = *hdr;
        hdr.free = false;
        hdr.next_free = None;
        hdr.prev_free = None;

        if let Some(prev) = prev_free.and_then(|p| blocks.get_mut(p)) {
            prev.next_free = next_free;
        } else {
            debug_assert_eq!(self.head, Some(ofs));
            self.head = next_free;
        }

        if let Some(next) = next_free.and_then(|n| blocks.get_mut(n)) {
            next.prev_free = prev_free;
        }

        self.len -= 1;
    }

    /// Iterate over the members from head to tail.
    #[inline]
    pub fn iter<'a>(&self, blocks: &'a BlockTable) -> FreeListIter<'a> {
        FreeListIter {
            blocks,
            cur: self.head,
            remaining: blocks.len(),
        }
    }
}

/// An iterator over `(offset, header)` pairs of a [`FreeList`].
///
/// It visits at most as many entries as there are blocks, so it terminates
/// even on a list corrupted into a cycle.
#[derive(Debug, Clone)]
pub(crate) struct FreeListIter<'a> {
    blocks: &'a BlockTable,
    cur: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for FreeListIter<'a> {
    type Item = (usize, &'a BlockHdr);

    fn next(&mut self) -> Option<Self::Item> {
        let ofs = self.cur?;
        if self.remaining == 0 {
            self.cur = None;
            return None;
        }
        self.remaining -= 1;
        let blocks: &'a BlockTable = self.blocks;
        let hdr = blocks.get(ofs)?;
        self.cur = hdr.next_free;
        Some((ofs, hdr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::prelude::v1::*;

    fn table_of(offsets: &[usize]) -> BlockTable {
        let mut blocks = BlockTable::default();
        for &ofs in offsets {
            blocks.insert(ofs, BlockHdr::new(1, 0));
        }
        blocks
    }

    fn members(list: &FreeList, blocks: &BlockTable) -> Vec<usize> {
        list.iter(blocks).map(|(ofs, _)| ofs).collect()
    }

    #[test]
    fn insert_keeps_address_order() {
        let mut blocks = table_of(&[0, 10, 20, 30, 40]);
        let mut list = FreeList::default();

        for &ofs in &[30, 0, 40, 10, 20] {
            list.insert_sorted(&mut blocks, ofs);
        }

        assert_eq!(members(&list, &blocks), [0, 10, 20, 30, 40]);
        assert_eq!(list.len(), 5);
        assert!(blocks.iter().all(|(_, hdr)| hdr.free));

        // Backward links mirror the forward ones
        let mut prev = None;
        for (ofs, hdr) in list.iter(&blocks) {
            assert_eq!(hdr.prev_free, prev);
            prev = Some(ofs);
        }
    }

    #[test]
    fn remove_head_middle_tail() {
        let mut blocks = table_of(&[0, 10, 20, 30]);
        let mut list = FreeList::default();
        for &ofs in &[0, 10, 20, 30] {
            list.insert_sorted(&mut blocks, ofs);
        }

        list.remove(&mut blocks, 0);
        assert_eq!(list.head, Some(10));
        assert_eq!(blocks.get(10).unwrap().prev_free, None);
        assert!(!blocks.get(0).unwrap().free);

        list.remove(&mut blocks, 20);
        assert_eq!(members(&list, &blocks), [10, 30]);

        list.remove(&mut blocks, 30);
        assert_eq!(members(&list, &blocks), [10]);
        assert_eq!(blocks.get(10).unwrap().next_free, None);

        list.remove(&mut blocks, 10);
        assert_eq!(list.head, None);
        assert_eq!(list.len(), 0);
        assert_eq!(members(&list, &blocks), Vec::<usize>::new());
    }

    #[test]
    fn iteration_is_restartable() {
        let mut blocks = table_of(&[5, 8]);
        let mut list = FreeList::default();
        list.insert_sorted(&mut blocks, 8);
        list.insert_sorted(&mut blocks, 5);

        let it = list.iter(&blocks);
        let first: Vec<_> = it.clone().map(|(ofs, _)| ofs).collect();
        let second: Vec<_> = it.map(|(ofs, _)| ofs).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn iteration_stops_on_cycle() {
        let mut blocks = table_of(&[0, 10]);
        let mut list = FreeList::default();
        list.insert_sorted(&mut blocks, 0);
        list.insert_sorted(&mut blocks, 10);
        blocks.get_mut(10).unwrap().next_free = Some(0);

        assert_eq!(list.iter(&blocks).count(), 2);
    }
}
