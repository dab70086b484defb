//! Instruction kinds.
//!
//! Modeled as a tagged variant rather than a polymorphic hierarchy with
//! visitor dispatch (per spec.md §9's re-architecture note): the
//! reducer's clone step is a single match expression with one arm per
//! kind, and operand remapping is a helper ([`Instruction::clone_with_remap`])
//! applied uniformly across every variant that carries value operands.

use crate::ids::{BlockId, ValueId};
use crate::value::Use;
use uvm_util::{DefId, FxHashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvOp {
    Trunc,
    ZExt,
    SExt,
    Bitcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicOp {
    Add,
    Swap,
    CompareAndSwap,
}

/// A φ-instruction: selects `result`'s value according to which
/// predecessor control arrived from. Each entry's [`Use`] is the "use
/// box" of spec.md §3.
#[derive(Debug)]
pub struct Phi {
    pub result: ValueId,
    pub incoming: Vec<(BlockId, Use)>,
}

impl Clone for Phi {
    fn clone(&self) -> Self {
        Phi {
            result: self.result,
            incoming: self.incoming.iter().map(|(b, u)| (*b, u.clone())).collect(),
        }
    }
}

/// One instruction within a [`crate::cfg::BasicBlock`].
#[derive(Debug, Clone)]
pub enum Instruction {
    Phi(Phi),
    Binary { result: ValueId, op: BinOp, lhs: Use, rhs: Use },
    Compare { result: ValueId, op: CmpOp, lhs: Use, rhs: Use },
    Convert { result: ValueId, op: ConvOp, operand: Use },
    Load { result: ValueId, addr: Use },
    Store { addr: Use, value: Use },
    Call { result: Option<ValueId>, callee: DefId, args: Vec<Use> },
    Select { result: ValueId, cond: Use, if_true: Use, if_false: Use },
    AllocaHybrid { result: ValueId, ty: DefId, var_len: Use },
    Atomic { result: ValueId, op: AtomicOp, addr: Use, value: Use },
    Return { value: Option<Use> },
    Throw { value: Use },
    Branch { target: BlockId },
    CondBranch { cond: Use, if_true: BlockId, if_false: BlockId },
    Switch { discriminant: Use, cases: Vec<(i64, BlockId)>, default: BlockId },
    Unreachable,
}

impl Instruction {
    pub fn as_phi(&self) -> Option<&Phi> {
        match self {
            Instruction::Phi(phi) => Some(phi),
            _ => None,
        }
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Instruction::Phi(_))
    }

    /// Successor block ids this instruction transfers control to, in the
    /// original (pre-edge-remap) CFG. Empty for non-control-transfer
    /// instructions.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Instruction::Branch { target } => vec![*target],
            Instruction::CondBranch { if_true, if_false, .. } => vec![*if_true, *if_false],
            Instruction::Switch { cases, default, .. } => {
                let mut targets: Vec<BlockId> = cases.iter().map(|(_, b)| *b).collect();
                targets.push(*default);
                targets
            }
            _ => Vec::new(),
        }
    }

    /// Rewrite every successor label in place via `f`, used for the
    /// reducer's edge-remap step. `f` returns the fork block id to
    /// redirect to, or the same id to leave a label unchanged.
    pub fn remap_successors(&mut self, f: impl Fn(BlockId) -> BlockId) {
        match self {
            Instruction::Branch { target } => *target = f(*target),
            Instruction::CondBranch { if_true, if_false, .. } => {
                *if_true = f(*if_true);
                *if_false = f(*if_false);
            }
            Instruction::Switch { cases, default, .. } => {
                for (_, target) in cases.iter_mut() {
                    *target = f(*target);
                }
                *default = f(*default);
            }
            _ => {}
        }
    }

    /// Clone a non-φ instruction, substituting every value operand
    /// through `remap` (built from a φ's per-predecessor value map).
    /// Successor labels are copied verbatim; the reducer remaps them
    /// separately once every fork exists.
    pub fn clone_with_remap(&self, remap: &FxHashMap<ValueId, ValueId>) -> Instruction {
        match self {
            Instruction::Phi(_) => panic!("phi instructions are dropped during fork creation, not cloned"),
            Instruction::Binary { result, op, lhs, rhs } => Instruction::Binary {
                result: *result,
                op: *op,
                lhs: lhs.clone_remapped(remap),
                rhs: rhs.clone_remapped(remap),
            },
            Instruction::Compare { result, op, lhs, rhs } => Instruction::Compare {
                result: *result,
                op: *op,
                lhs: lhs.clone_remapped(remap),
                rhs: rhs.clone_remapped(remap),
            },
            Instruction::Convert { result, op, operand } => Instruction::Convert {
                result: *result,
                op: *op,
                operand: operand.clone_remapped(remap),
            },
            Instruction::Load { result, addr } => Instruction::Load {
                result: *result,
                addr: addr.clone_remapped(remap),
            },
            Instruction::Store { addr, value } => Instruction::Store {
                addr: addr.clone_remapped(remap),
                value: value.clone_remapped(remap),
            },
            Instruction::Call { result, callee, args } => Instruction::Call {
                result: *result,
                callee: *callee,
                args: args.iter().map(|a| a.clone_remapped(remap)).collect(),
            },
            Instruction::Select { result, cond, if_true, if_false } => Instruction::Select {
                result: *result,
                cond: cond.clone_remapped(remap),
                if_true: if_true.clone_remapped(remap),
                if_false: if_false.clone_remapped(remap),
            },
            Instruction::AllocaHybrid { result, ty, var_len } => Instruction::AllocaHybrid {
                result: *result,
                ty: *ty,
                var_len: var_len.clone_remapped(remap),
            },
            Instruction::Atomic { result, op, addr, value } => Instruction::Atomic {
                result: *result,
                op: *op,
                addr: addr.clone_remapped(remap),
                value: value.clone_remapped(remap),
            },
            Instruction::Return { value } => Instruction::Return {
                value: value.as_ref().map(|v| v.clone_remapped(remap)),
            },
            Instruction::Throw { value } => Instruction::Throw {
                value: value.clone_remapped(remap),
            },
            Instruction::Branch { target } => Instruction::Branch { target: *target },
            Instruction::CondBranch { cond, if_true, if_false } => Instruction::CondBranch {
                cond: cond.clone_remapped(remap),
                if_true: *if_true,
                if_false: *if_false,
            },
            Instruction::Switch { discriminant, cases, default } => Instruction::Switch {
                discriminant: discriminant.clone_remapped(remap),
                cases: cases.clone(),
                default: *default,
            },
            Instruction::Unreachable => Instruction::Unreachable,
        }
    }
}
