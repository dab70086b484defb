//! The "use box" of spec.md §3: a redirectable back-reference to a value.

use crate::ids::ValueId;
use std::cell::Cell;
use uvm_util::FxHashMap;

/// A single operand slot. Holds the [`ValueId`] currently referenced;
/// cloning copies the cell's contents, and redirecting one clone (via
/// [`Use::set`]) never affects the original — ownership of the referent
/// is never transferred, only its identity is threaded through.
#[derive(Debug)]
pub struct Use(Cell<ValueId>);

impl Use {
    pub fn new(value: ValueId) -> Self {
        Use(Cell::new(value))
    }

    pub fn get(&self) -> ValueId {
        self.0.get()
    }

    pub fn set(&self, value: ValueId) {
        self.0.set(value);
    }

    /// Produce an independent `Use` pointing at whatever `remap` maps this
    /// use's current value to, or the same value if unmapped.
    pub fn clone_remapped(&self, remap: &FxHashMap<ValueId, ValueId>) -> Use {
        let current = self.0.get();
        Use::new(remap.get(&current).copied().unwrap_or(current))
    }
}

impl Clone for Use {
    fn clone(&self) -> Self {
        Use::new(self.0.get())
    }
}

impl PartialEq for Use {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for Use {}
