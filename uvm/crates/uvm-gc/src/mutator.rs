//! Per-thread bump-pointer allocator.
//!
//! A Mutator owns exactly one block at a time and advances a cursor
//! within it. When the current block cannot satisfy a request, it is
//! retired and a fresh block is acquired from the Space, triggering a GC
//! cycle first if the Space is exhausted.

use crate::error::{GcError, Result};
use crate::heap::Heap;
use crate::object::{self, ObjectHeader, HEADER_SIZE};
use crate::util::Alignment;
use uvm_util::DefId;

/// A single mutator thread's bump-pointer allocation state.
pub struct Mutator<'h> {
    heap: &'h Heap,
    cur_block_addr: usize,
    cursor: usize,
    limit: usize,
    closed: bool,
}

impl<'h> Mutator<'h> {
    /// Register a new mutator with `heap` and acquire its first block.
    ///
    /// # Invariant
    ///
    /// `cur_block_addr <= cursor <= limit == cur_block_addr + block_size`
    /// holds after every call that returns `Ok`.
    pub(crate) fn new(heap: &'h Heap) -> Result<Self> {
        let block_size = heap.space().block_size();
        heap.register_mutator();
        let block = match heap.acquire_block() {
            Ok(block) => block,
            Err(e) => {
                heap.deregister_mutator();
                return Err(e);
            }
        };
        Ok(Self {
            heap,
            cur_block_addr: block,
            cursor: block,
            limit: block + block_size,
            closed: false,
        })
    }

    /// Allocate a fixed-size object of type `ty`.
    pub fn new_fixed(&mut self, ty: DefId) -> Result<usize> {
        let size = self.heap.layout().fixed_size(ty);
        self.alloc(size, ty)
    }

    /// Allocate a hybrid object of type `ty` with `var_len` trailing
    /// elements.
    pub fn new_hybrid(&mut self, ty: DefId, var_len: u64) -> Result<usize> {
        let size = self.heap.layout().hybrid_size(ty, var_len);
        self.alloc(size, ty)
    }

    /// Bump-pointer allocate `size` bytes of payload for an object of type
    /// `ty`, retrying against a fresh block on exhaustion and polling the
    /// safepoint before every attempt.
    fn alloc(&mut self, size: usize, ty: DefId) -> Result<usize> {
        if self.closed {
            return Err(GcError::MutatorClosed);
        }

        loop {
            self.poll_safepoint();

            let gc_start = Alignment::align_up(self.cursor, Alignment::DEFAULT);
            let user_start = Alignment::align_up(gc_start + HEADER_SIZE, Alignment::DEFAULT);
            let user_end = user_start + size;

            if user_end <= self.limit {
                self.cursor = user_end;
                let header_addr = user_start - HEADER_SIZE;
                unsafe {
                    ObjectHeader::init_at(header_addr, size, ty);
                }
                return Ok(object::payload_addr(header_addr));
            }

            let block_size = self.heap.space().block_size();
            if user_end - gc_start > block_size {
                return Err(GcError::ObjectTooBig { size, block_size });
            }

            self.heap
                .space()
                .retire(self.cur_block_addr, self.cursor - self.cur_block_addr)?;
            let block = self.heap.acquire_block()?;
            self.cur_block_addr = block;
            self.cursor = block;
            self.limit = block + block_size;
        }
    }

    /// Block if a GC cycle has been requested, resuming only once the
    /// collector has finished the cycle.
    pub fn poll_safepoint(&self) {
        self.heap.poll_safepoint();
    }

    /// Deregister this mutator. Subsequent allocation attempts fail with
    /// `GcError::MutatorClosed`.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.heap.deregister_mutator();
        }
    }
}

impl Drop for Mutator<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
