extern crate std;

use std::{collections::BTreeMap, ops::Range};

use crate::{BlockInfo, FibHeap, FibHeapOptions};

/// Tracks which arena bytes are handed out, independently of the heap, and
/// panics on any double hand-out or on returning bytes that weren't handed
/// out.
pub struct ShadowArena {
    regions: BTreeMap<usize, SaRegion>,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SaRegion {
    Free,
    Used,
    Invalid,
}

impl ShadowArena {
    pub fn new(capacity: usize) -> Self {
        let mut this = Self {
            regions: Some((0, SaRegion::Invalid)).into_iter().collect(),
        };
        this.convert_range(0..capacity, SaRegion::Invalid, SaRegion::Free);
        this
    }

    pub fn convert_range(
        &mut self,
        range: Range<usize>,
        old_region: SaRegion,
        new_region: SaRegion,
    ) {
        if range.len() == 0 {
            return;
        }

        assert_ne!(old_region, new_region);
        log::trace!(
            "sa: converting {:?} from {:?} to {:?}",
            range,
            old_region,
            new_region
        );

        let (&addr, &region) = self.regions.range(0..range.end).rev().next().unwrap();
        if addr > range.start {
            panic!("there's a discontinuity in range {:?}", range);
        } else if region != old_region {
            panic!(
                "range {:?} is {:?} (expected {:?})",
                range, region, old_region
            );
        }

        // Insert an element at `range.start`
        if addr == range.start {
            *self.regions.get_mut(&addr).unwrap() = new_region;
        } else {
            self.regions.insert(range.start, new_region);
        }

        // Each element must represent a discontinuity
        if let Some((_, &region)) = self.regions.range(0..range.start).rev().next() {
            if region == new_region {
                self.regions.remove(&range.start);
            }
        }

        if let Some(&end_region) = self.regions.get(&range.end) {
            if end_region == new_region {
                self.regions.remove(&range.end);
            }
        } else {
            self.regions.insert(range.end, old_region);
        }
    }

    pub fn allocate(&mut self, payload: Range<usize>) {
        self.convert_range(payload, SaRegion::Free, SaRegion::Used);
    }

    pub fn deallocate(&mut self, payload: Range<usize>) {
        self.convert_range(payload, SaRegion::Used, SaRegion::Free);
    }
}

/// Assert that the blocks tile the arena and that every block's size agrees
/// with its index. Returns the blocks.
pub fn check_tiling<Options: FibHeapOptions>(
    heap: &FibHeap<Options>,
) -> std::vec::Vec<BlockInfo> {
    let blocks: std::vec::Vec<_> = heap.blocks().collect();
    let mut end = 0;
    let mut allocated = 0;
    for block in &blocks {
        assert_eq!(block.address, end, "gap or overlap at {:?}", block);
        assert_eq!(heap.table()[block.fib_index], block.size, "{:?}", block);
        if block.free {
            assert_eq!(block.req_size, 0, "{:?}", block);
        } else {
            allocated += block.size;
        }
        end += block.size;
    }
    assert_eq!(end, heap.capacity());
    assert_eq!(allocated, heap.allocated());
    blocks
}
