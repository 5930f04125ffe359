//! The backing byte region
use alloc::{boxed::Box, vec::Vec};
use core::ops::Range;

use crate::{error::InitError, fib::FibTable};

/// A contiguous, zero-initialized byte region whose length is exactly one
/// term of the Fibonacci table.
#[derive(Debug)]
pub(crate) struct Arena {
    storage: Box<[u8]>,
    /// The table index of `storage.len()`
    top_index: usize,
}

impl Arena {
    /// Reserve an arena of the largest table term `<= requested` bytes.
    pub fn new(table: &FibTable, requested: usize) -> Result<Self, InitError> {
        let no_capacity = InitError::NoUsableCapacity {
            capacity: requested,
        };
        let top_index = table.largest_at_most(requested).ok_or(no_capacity)?;
        let capacity = table[top_index];

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| no_capacity)?;
        storage.resize(capacity, 0);

        log::debug!(
            "arena of {} bytes (T[{}]) for a request of {} bytes",
            capacity,
            top_index,
            requested
        );

        Ok(Self {
            storage: storage.into_boxed_slice(),
            top_index,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn top_index(&self) -> usize {
        self.top_index
    }

    #[inline]
    pub fn contains(&self, ofs: usize) -> bool {
        ofs < self.storage.len()
    }

    #[inline]
    pub fn bytes(&self, range: Range<usize>) -> Option<&[u8]> {
        self.storage.get(range)
    }

    #[inline]
    pub fn bytes_mut(&mut self, range: Range<usize>) -> Option<&mut [u8]> {
        self.storage.get_mut(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_term_that_fits() {
        let table = FibTable::build(100).unwrap();
        let arena = Arena::new(&table, 100).unwrap();
        assert_eq!(arena.capacity(), 89);
        assert_eq!(table[arena.top_index()], 89);
        assert!(arena.contains(88));
        assert!(!arena.contains(89));
        assert!(arena.bytes(0..89).unwrap().iter().all(|&b| b == 0));
        assert_eq!(arena.bytes(80..90), None);
    }

    #[test]
    fn request_below_every_term() {
        let table = FibTable::build(100).unwrap();
        assert_eq!(
            Arena::new(&table, 0).unwrap_err(),
            InitError::NoUsableCapacity { capacity: 0 }
        );
    }
}
