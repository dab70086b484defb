//! The CFG: a set of basic blocks with a distinguished entry.

use crate::ids::{BlockId, ValueId};
use crate::instr::Instruction;
use uvm_util::{FxHashMap, Symbol};

/// A basic block: a name, an id, a parameter list, and an ordered
/// instruction list it exclusively owns.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub name: Symbol,
    pub params: Vec<ValueId>,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(id: BlockId, name: Symbol) -> Self {
        Self { id, name, params: Vec::new(), instructions: Vec::new() }
    }

    pub fn phis(&self) -> impl Iterator<Item = &crate::instr::Phi> {
        self.instructions.iter().filter_map(Instruction::as_phi)
    }

    pub fn has_phi(&self) -> bool {
        self.instructions.iter().any(Instruction::is_phi)
    }
}

/// A function's control-flow graph. Blocks are keyed by id rather than
/// stored densely: the PHI reducer mints fresh fork ids that need not be
/// contiguous with the input's id space.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub function: Symbol,
    pub entry: BlockId,
    pub blocks: FxHashMap<BlockId, BasicBlock>,
}

impl Cfg {
    pub fn new(function: Symbol, entry: BlockId) -> Self {
        Self { function, entry, blocks: FxHashMap::default() }
    }

    pub fn insert(&mut self, block: BasicBlock) {
        self.blocks.insert(block.id, block);
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.get(&self.entry)
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    /// Every block's set of predecessors, derived from the successor
    /// labels of every instruction that transfers control.
    pub fn predecessors(&self) -> FxHashMap<BlockId, Vec<BlockId>> {
        let mut preds: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for block in self.blocks.values() {
            for instr in &block.instructions {
                for succ in instr.successors() {
                    preds.entry(succ).or_default().push(block.id);
                }
            }
        }
        preds
    }

    /// Largest block id in use, or `None` for an empty CFG. Used by the
    /// reducer to mint fork ids guaranteed not to collide.
    pub fn max_block_id(&self) -> Option<u32> {
        self.blocks.keys().map(|id| id.0).max()
    }
}
