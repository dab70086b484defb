//! Typed identities for blocks and values within a single [`crate::cfg::Cfg`].

use uvm_util::Idx;

/// Identifies a [`crate::cfg::BasicBlock`] within one function's CFG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl Idx for BlockId {
    fn from_usize(idx: usize) -> Self {
        BlockId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// An interned value identity: an index into a per-function value space,
/// never a pointer. Every instruction that produces a result is assigned
/// one; a φ-instruction's incoming entries and every operand's [`crate::value::Use`]
/// refer to values by this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

impl Idx for ValueId {
    fn from_usize(idx: usize) -> Self {
        ValueId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hands out fresh, distinct ids within one function.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next_block: u32,
    next_value: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    pub fn next_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Fast-forward the block counter past every id already in use, so
    /// ids handed out afterward are guaranteed fresh. Used by the reducer
    /// to mint fork-block ids that cannot collide with the input CFG's.
    pub fn skip_blocks_to(&mut self, at_least: u32) {
        self.next_block = self.next_block.max(at_least);
    }
}
