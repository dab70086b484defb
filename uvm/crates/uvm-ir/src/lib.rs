//! PHI elimination for μVM's SSA intermediate representation.
//!
//! [`Cfg`] is a function's control-flow graph: a set of [`BasicBlock`]s,
//! some of which may contain [`Phi`] instructions. [`reduce`] lowers such
//! a CFG into an equivalent one with no φ-instructions at all, by forking
//! every φ-bearing block once per predecessor edge and substituting each
//! predecessor's incoming value directly into the fork's instructions.
//!
//! ```
//! use uvm_ir::{reduce, CfgBuilder};
//!
//! let mut b = CfgBuilder::new("f");
//! let v1 = b.fresh_value();
//! let v2 = b.fresh_value();
//! let x = b.fresh_value();
//!
//! let entry = b.reserve_block();
//! let a = b.reserve_block();
//! let bb = b.reserve_block();
//! let m = b.reserve_block();
//!
//! b.block(entry, "entry").cond_branch(v1, a, bb).end();
//! b.block(a, "A").branch(m).end();
//! b.block(bb, "B").branch(m).end();
//! b.block(m, "M").phi(x, vec![(a, v1), (bb, v2)]).ret(Some(x)).end();
//!
//! let reduced = reduce(&b.finish()).unwrap();
//! assert!(reduced.blocks.values().all(|b| !b.has_phi()));
//! ```

pub mod builder;
pub mod cfg;
pub mod error;
pub mod ids;
pub mod instr;
pub mod reducer;
pub mod transition;
pub mod value;

pub use builder::{BlockBuilder, CfgBuilder};
pub use cfg::{BasicBlock, Cfg};
pub use error::{ReducerError, Result};
pub use ids::{BlockId, IdGenerator, ValueId};
pub use instr::{AtomicOp, BinOp, CmpOp, ConvOp, Instruction, Phi};
pub use reducer::reduce;
pub use transition::Transition;
pub use value::Use;
