//! Shared utilities: alignment arithmetic used by the Space, Mutator, and
//! object header.

pub mod alignment;

pub use alignment::Alignment;
