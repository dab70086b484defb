//! Foundation types shared by the heap and the PHI reducer: string
//! interning, typed index vectors, and opaque entity identity.
//!
//! - [`symbol`] — interned [`symbol::Symbol`] handles for block/function
//!   names.
//! - [`index_vec`] — [`index_vec::IndexVec`], a vector indexed by a typed
//!   [`index_vec::Idx`] instead of a raw `usize`.
//! - [`def_id`] — [`def_id::DefId`], the opaque handle by which the core
//!   refers to external Bundle entities (types, functions, globals,
//!   constants) without defining them.

pub mod def_id;
pub mod error;
pub mod index_vec;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use index_vec::{Idx, IndexVec};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
