//! The table of Fibonacci block sizes
use alloc::vec::Vec;
use core::ops;

use crate::error::InitError;

/// The default ceiling on the number of terms a [`FibTable`] may hold.
pub const MAX_FIB_COUNT: usize = 50;

/// The ascending sequence of block sizes `T[0] = 1, T[1] = 2,
/// T[i] = T[i - 1] + T[i - 2]`, bounded by a capacity.
///
/// The table is immutable once built. It dereferences to `[usize]`, so
/// `table[i]` is the size of a block whose Fibonacci index is `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibTable {
    terms: Vec<usize>,
}

impl FibTable {
    /// Build the table of every term not exceeding `capacity`, holding at
    /// most [`MAX_FIB_COUNT`] terms.
    ///
    /// # Examples
    ///
    /// ```
    /// use fibheap::FibTable;
    /// let table = FibTable::build(13).unwrap();
    /// assert_eq!(&*table, &[1, 2, 3, 5, 8, 13]);
    /// ```
    pub fn build(capacity: usize) -> Result<Self, InitError> {
        Self::build_bounded(capacity, MAX_FIB_COUNT)
    }

    /// Like [`Self::build`] but with a custom term-count ceiling.
    ///
    /// Fails with [`InitError::CapacityTooSmall`] if not even the first term
    /// (`1`) fits.
    pub fn build_bounded(capacity: usize, max_terms: usize) -> Result<Self, InitError> {
        if capacity < 1 || max_terms == 0 {
            return Err(InitError::CapacityTooSmall { capacity });
        }

        let mut terms = Vec::with_capacity(max_terms.min(MAX_FIB_COUNT));
        let (mut a, mut b) = (1usize, 2usize);
        while terms.len() < max_terms && a <= capacity {
            terms.push(a);
            // Stop on overflow; the next term could never fit anyway
            let Some(next) = a.checked_add(b) else {
                if b <= capacity && terms.len() < max_terms {
                    terms.push(b);
                }
                break;
            };
            a = b;
            b = next;
        }

        log::debug!(
            "built a Fibonacci table of {} terms (largest = {:?}) for capacity {}",
            terms.len(),
            terms.last(),
            capacity
        );

        Ok(Self { terms })
    }

    /// The largest term in the table.
    #[inline]
    pub fn largest(&self) -> usize {
        // A built table always has at least one term
        self.terms[self.terms.len() - 1]
    }

    /// The index of the smallest term `>= x`.
    #[inline]
    pub fn index_of_smallest_at_least(&self, x: usize) -> Option<usize> {
        let i = self.terms.partition_point(|&t| t < x);
        (i < self.terms.len()).then_some(i)
    }

    /// The smallest term `>= x`, or `None` if `x` exceeds every term.
    #[inline]
    pub fn smallest_at_least(&self, x: usize) -> Option<usize> {
        self.index_of_smallest_at_least(x).map(|i| self.terms[i])
    }

    /// The index of the largest term `<= x`.
    #[inline]
    pub fn largest_at_most(&self, x: usize) -> Option<usize> {
        self.terms.partition_point(|&t| t <= x).checked_sub(1)
    }
}

impl ops::Deref for FibTable {
    type Target = [usize];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn small_capacities() {
        assert_eq!(
            FibTable::build(0),
            Err(InitError::CapacityTooSmall { capacity: 0 })
        );
        assert_eq!(&*FibTable::build(1).unwrap(), &[1]);
        assert_eq!(&*FibTable::build(2).unwrap(), &[1, 2]);
        assert_eq!(&*FibTable::build(12).unwrap(), &[1, 2, 3, 5, 8]);
        assert_eq!(&*FibTable::build(13).unwrap(), &[1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn term_ceiling() {
        #[cfg(target_pointer_width = "64")]
        assert_eq!(FibTable::build(usize::MAX).unwrap().len(), MAX_FIB_COUNT);

        let table = FibTable::build_bounded(1000, 4).unwrap();
        assert_eq!(&*table, &[1, 2, 3, 5]);

        assert_eq!(
            FibTable::build_bounded(1000, 0),
            Err(InitError::CapacityTooSmall { capacity: 1000 })
        );
    }

    #[test]
    fn no_overflow_at_the_top() {
        let table = FibTable::build_bounded(usize::MAX, usize::MAX).unwrap();
        assert!(table.windows(2).all(|w| w[0] < w[1]));
        assert!(table.largest() > usize::MAX / 2);
    }

    #[test]
    fn lookups() {
        let table = FibTable::build(13).unwrap();
        assert_eq!(table.smallest_at_least(0), Some(1));
        assert_eq!(table.smallest_at_least(4), Some(5));
        assert_eq!(table.smallest_at_least(5), Some(5));
        assert_eq!(table.smallest_at_least(14), None);
        assert_eq!(table.index_of_smallest_at_least(9), Some(5));
        assert_eq!(table.largest_at_most(0), None);
        assert_eq!(table.largest_at_most(7), Some(3));
        assert_eq!(table.largest_at_most(100), Some(5));
        assert_eq!(table.largest(), 13);
    }

    #[quickcheck]
    fn recurrence(capacity: usize) -> bool {
        let capacity = capacity.max(1);
        let table = FibTable::build(capacity).unwrap();
        table[0] == 1
            && table.get(1).map_or(true, |&t| t == 2)
            && table.windows(3).all(|w| w[2] == w[1] + w[0])
            && table.iter().all(|&t| t <= capacity)
    }

    #[quickcheck]
    fn smallest_at_least_is_tight(capacity: usize, x: usize) -> bool {
        let table = FibTable::build(capacity.max(1)).unwrap();
        match table.index_of_smallest_at_least(x) {
            Some(i) => table[i] >= x && (i == 0 || table[i - 1] < x),
            None => x > table.largest(),
        }
    }
}
