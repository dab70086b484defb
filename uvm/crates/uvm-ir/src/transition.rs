//! [`Transition`]: an equality-by-value key identifying a control-flow
//! edge, used to route edges through forks during PHI elimination.

use crate::ids::BlockId;
use std::hash::{Hash, Hasher};
use uvm_util::Symbol;

/// An ordered pair of basic blocks identifying a control-flow edge.
/// Equality and hashing consider both the id and the name of each
/// endpoint, so a `Transition` reconstructed independently from the same
/// (id, name) pairs compares and hashes identically to the original.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from_id: BlockId,
    pub from_name: Symbol,
    pub to_id: BlockId,
    pub to_name: Symbol,
}

impl Transition {
    pub fn new(from_id: BlockId, from_name: Symbol, to_id: BlockId, to_name: Symbol) -> Self {
        Self { from_id, from_name, to_id, to_name }
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.from_id == other.from_id
            && self.to_id == other.to_id
            && self.from_name == other.from_name
            && self.to_name == other.to_name
    }
}

impl Eq for Transition {}

impl Hash for Transition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from_id.hash(state);
        self.from_name.hash(state);
        self.to_id.hash(state);
        self.to_name.hash(state);
    }
}
