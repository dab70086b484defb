//! A simplified Immix-style stop-the-world, mark-sweep garbage collector
//! for concurrent mutators.
//!
//! The heap is a [`Space`](space::Space) of equal-sized blocks. Each
//! mutator thread owns a [`Mutator`] that bump-allocates within its
//! current block and retires it for a fresh one when exhausted. When the
//! Space runs out of free blocks, the requesting mutator drives all live
//! mutators to a safepoint and a single background collector thread
//! marks from externally supplied roots and sweeps unreachable blocks
//! free. There is no compaction or generational separation: a block
//! either survives a cycle whole or is freed whole.
//!
//! The core never interprets object contents itself. A [`Client`]
//! supplies external GC roots; a [`TypeLayout`] answers the core's only
//! question about a type's shape — its size and the offsets of its
//! reference-typed fields.
//!
//! ```no_run
//! use std::sync::Arc;
//! use uvm_gc::{Client, Heap, HeapConfig, ObjectMarker, TypeLayout};
//! use uvm_util::DefId;
//!
//! struct NoRoots;
//! impl Client for NoRoots {
//!     fn mark_external_roots(&self, _marker: &mut ObjectMarker<'_>) {}
//! }
//!
//! struct FixedLayout;
//! impl TypeLayout for FixedLayout {
//!     fn fixed_size(&self, _ty: DefId) -> usize { 16 }
//!     fn hybrid_size(&self, _ty: DefId, _var_len: u64) -> usize { 16 }
//!     fn ref_offsets(&self, _ty: DefId, _size: usize) -> Vec<usize> { Vec::new() }
//! }
//!
//! let heap = Heap::new(HeapConfig::default(), Arc::new(NoRoots), Arc::new(FixedLayout))?;
//! let mut mutator = heap.make_mutator()?;
//! let obj = mutator.new_fixed(DefId(0))?;
//! # Ok::<(), uvm_gc::GcError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod marker;
pub mod memory;
pub mod mutator;
pub mod object;
pub mod space;
pub mod util;

mod heap;

pub use config::HeapConfig;
pub use error::{GcError, Result};
pub use heap::Heap;
pub use marker::{Client, ObjectMarker, TypeLayout};
pub use mutator::Mutator;
pub use object::ObjectHeader;
pub use space::{BlockState, Space};

/// Crate version, from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
