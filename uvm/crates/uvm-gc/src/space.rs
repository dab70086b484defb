//! Space: a fixed-size contiguous region partitioned into equal-sized
//! blocks. Hands out free blocks on request, recycles them when the
//! collector releases them.

use crate::error::{GcError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Mutex;

/// Lifecycle state of a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Owned by the Space's freelist.
    Free,
    /// Owned by exactly one mutator as its current block.
    InUse,
    /// Retired by a mutator, awaiting the next GC cycle's sweep. Carries
    /// the high-water mark (bytes from the block's start that hold
    /// initialized objects) so the sweep knows where to stop walking.
    Full { used: usize },
    /// Holds a single large object spanning one or more contiguous blocks.
    Large,
}

struct SpaceState {
    block_states: Vec<BlockState>,
    /// Lowest-address-first freelist. A min-heap over block index gives a
    /// deterministic allocation order for the same free/allocate sequence.
    free: BinaryHeap<Reverse<usize>>,
}

/// An ordered sequence of Blocks over a single contiguous memory region.
pub struct Space {
    buffer: Box<[u8]>,
    base: usize,
    block_size: usize,
    block_count: usize,
    state: Mutex<SpaceState>,
}

impl Space {
    pub fn new(size: usize, block_size: usize) -> Self {
        assert!(block_size.is_power_of_two());
        assert_eq!(size % block_size, 0);

        let mut buffer = vec![0u8; size].into_boxed_slice();
        let base = buffer.as_mut_ptr() as usize;
        let block_count = size / block_size;

        let mut free = BinaryHeap::with_capacity(block_count);
        for i in 0..block_count {
            free.push(Reverse(i));
        }

        Self {
            buffer,
            base,
            block_size,
            block_count,
            state: Mutex::new(SpaceState {
                block_states: vec![BlockState::Free; block_count],
                free,
            }),
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Whether `addr` lies within this Space's backing region (inclusive of
    /// large-object runs, which are still carved out of the same region).
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.base + self.buffer.len()
    }

    fn index_of(&self, addr: usize) -> Option<usize> {
        if !self.contains(addr) || (addr - self.base) % self.block_size != 0 {
            return None;
        }
        Some((addr - self.base) / self.block_size)
    }

    pub fn block_addr(&self, index: usize) -> usize {
        self.base + index * self.block_size
    }

    /// Returns a free block's start address. Fails with `OutOfMemory` when
    /// no free block exists.
    pub fn get_block(&self) -> Result<usize> {
        let mut state = self.state.lock()?;
        match state.free.pop() {
            Some(Reverse(idx)) => {
                state.block_states[idx] = BlockState::InUse;
                Ok(self.block_addr(idx))
            }
            None => Err(GcError::OutOfMemory {
                requested: self.block_size,
                available: 0,
            }),
        }
    }

    /// Retire an in-use block to *full*, recording `used` as the
    /// high-water mark the sweep should walk up to.
    pub fn retire(&self, block_addr: usize, used: usize) -> Result<()> {
        let mut state = self.state.lock()?;
        let idx = self
            .index_of(block_addr)
            .ok_or(GcError::InvalidBlockAddress { address: block_addr })?;
        debug_assert_eq!(state.block_states[idx], BlockState::InUse);
        state.block_states[idx] = BlockState::Full { used };
        Ok(())
    }

    /// Mark a *full* block free. Invoked only by the collector during
    /// sweep.
    pub fn recycle(&self, block_addr: usize) -> Result<()> {
        let mut state = self.state.lock()?;
        let idx = self
            .index_of(block_addr)
            .ok_or(GcError::InvalidBlockAddress { address: block_addr })?;
        debug_assert!(matches!(state.block_states[idx], BlockState::Full { .. }));
        state.block_states[idx] = BlockState::Free;
        state.free.push(Reverse(idx));
        Ok(())
    }

    pub fn state_of(&self, block_addr: usize) -> Option<BlockState> {
        let state = self.state.lock().ok()?;
        self.index_of(block_addr).map(|idx| state.block_states[idx])
    }

    /// Addresses of every block currently in the *full* state, with their
    /// recorded high-water marks. Used by the collector's sweep.
    pub fn full_blocks(&self) -> Vec<(usize, usize)> {
        let state = self.state.lock().unwrap();
        state
            .block_states
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| match s {
                BlockState::Full { used } => Some((self.block_addr(idx), *used)),
                _ => None,
            })
            .collect()
    }

    pub fn free_block_count(&self) -> usize {
        self.state.lock().map(|s| s.free.len()).unwrap_or(0)
    }
}

// SAFETY: the buffer is heap-allocated and never moved after construction;
// all access to its contents is mediated through `state`'s mutex for the
// freelist, and through the per-mutator/collector ownership discipline
// documented on the Space's invariants for the bytes themselves.
unsafe impl Send for Space {}
unsafe impl Sync for Space {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_address_first() {
        let space = Space::new(4 * 64 * 1024, 64 * 1024);
        let a = space.get_block().unwrap();
        let b = space.get_block().unwrap();
        assert_eq!(a, space.base());
        assert_eq!(b, space.base() + space.block_size());
    }

    #[test]
    fn retires_block_to_full_with_high_water_mark() {
        let space = Space::new(2 * 64 * 1024, 64 * 1024);
        let a = space.get_block().unwrap();
        assert_eq!(space.state_of(a), Some(BlockState::InUse));
        space.retire(a, 4096).unwrap();
        assert_eq!(space.state_of(a), Some(BlockState::Full { used: 4096 }));
    }

    #[test]
    fn out_of_memory_when_exhausted() {
        let space = Space::new(64 * 1024, 64 * 1024);
        space.get_block().unwrap();
        assert!(matches!(space.get_block(), Err(GcError::OutOfMemory { .. })));
    }

    #[test]
    fn recycle_returns_block_to_freelist_lowest_first() {
        let space = Space::new(3 * 64 * 1024, 64 * 1024);
        let a = space.get_block().unwrap();
        let _b = space.get_block().unwrap();
        space.retire(a, 0).unwrap();
        space.recycle(a).unwrap();
        let reused = space.get_block().unwrap();
        assert_eq!(reused, a);
    }

    #[test]
    fn full_blocks_reports_high_water_marks() {
        let space = Space::new(2 * 64 * 1024, 64 * 1024);
        let a = space.get_block().unwrap();
        space.retire(a, 2048).unwrap();
        assert_eq!(space.full_blocks(), vec![(a, 2048)]);
    }
}
