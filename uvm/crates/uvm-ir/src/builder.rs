//! A small fluent helper for assembling [`Cfg`] values in tests, so test
//! bodies read as block/instruction lists rather than `FxHashMap` plumbing.

use crate::cfg::{BasicBlock, Cfg};
use crate::ids::{BlockId, IdGenerator, ValueId};
use crate::instr::{Instruction, Phi};
use crate::value::Use;
use uvm_util::Symbol;

/// Accumulates blocks for one function, handing out fresh [`BlockId`]s and
/// [`ValueId`]s as needed.
pub struct CfgBuilder {
    function: Symbol,
    ids: IdGenerator,
    entry: Option<BlockId>,
    blocks: Vec<BasicBlock>,
}

impl CfgBuilder {
    pub fn new(function: &str) -> Self {
        Self { function: Symbol::intern(function), ids: IdGenerator::new(), entry: None, blocks: Vec::new() }
    }

    pub fn fresh_value(&mut self) -> ValueId {
        self.ids.next_value()
    }

    /// Reserve a block id up front, before the block's own instructions
    /// (which may need to name blocks not yet built) are known.
    pub fn reserve_block(&mut self) -> BlockId {
        self.ids.next_block()
    }

    /// Start building the block previously reserved as `id`; the first
    /// block built becomes the CFG's entry.
    pub fn block(&mut self, id: BlockId, name: &str) -> BlockBuilder<'_> {
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        BlockBuilder { owner: self, block: BasicBlock::new(id, Symbol::intern(name)) }
    }

    pub fn finish(self) -> Cfg {
        let entry = self.entry.expect("at least one block added");
        let mut cfg = Cfg::new(self.function, entry);
        for block in self.blocks {
            cfg.insert(block);
        }
        cfg
    }
}

/// Builds one block's instruction list, then returns control to the
/// owning [`CfgBuilder`] on [`BlockBuilder::end`].
pub struct BlockBuilder<'a> {
    owner: &'a mut CfgBuilder,
    block: BasicBlock,
}

impl<'a> BlockBuilder<'a> {
    pub fn phi(mut self, result: ValueId, incoming: Vec<(BlockId, ValueId)>) -> Self {
        let incoming = incoming.into_iter().map(|(b, v)| (b, Use::new(v))).collect();
        self.block.instructions.push(Instruction::Phi(Phi { result, incoming }));
        self
    }

    pub fn branch(mut self, target: BlockId) -> Self {
        self.block.instructions.push(Instruction::Branch { target });
        self
    }

    pub fn cond_branch(mut self, cond: ValueId, if_true: BlockId, if_false: BlockId) -> Self {
        self.block.instructions.push(Instruction::CondBranch { cond: Use::new(cond), if_true, if_false });
        self
    }

    pub fn ret(mut self, value: Option<ValueId>) -> Self {
        self.block.instructions.push(Instruction::Return { value: value.map(Use::new) });
        self
    }

    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.block.instructions.push(instruction);
        self
    }

    pub fn end(self) -> &'a mut CfgBuilder {
        self.owner.blocks.push(self.block);
        self.owner
    }
}
