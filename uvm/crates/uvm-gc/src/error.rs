//! Error types for the heap, mutator, and collector.

use std::sync::PoisonError;
use thiserror::Error;

/// Error type for all heap operations.
#[derive(Debug, Error)]
pub enum GcError {
    /// Space has no free block left, even after a GC cycle.
    #[error("out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    /// Object does not fit in a block and no large-object path is configured.
    #[error("object too big: {size} bytes exceeds block size {block_size}")]
    ObjectTooBig { size: usize, block_size: usize },

    /// The heap's configuration failed validation.
    #[error("heap initialization failed: {0}")]
    HeapInit(String),

    /// An address did not fall within any live block of the Space.
    #[error("invalid block address: {address:#x}")]
    InvalidBlockAddress { address: usize },

    /// A mutator attempted to allocate after calling `close()`.
    #[error("mutator is closed")]
    MutatorClosed,

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<PoisonError<T>> for GcError {
    fn from(err: PoisonError<T>) -> Self {
        GcError::LockPoisoned(err.to_string())
    }
}

/// Result type alias for heap operations.
pub type Result<T> = std::result::Result<T, GcError>;
