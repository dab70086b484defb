//! Error types for the PHI reducer.

use thiserror::Error;
use uvm_util::Symbol;

#[derive(Debug, Error)]
pub enum ReducerError {
    /// The entry block carries a φ-instruction. Per spec.md §4.5 this is
    /// a precondition violation, not a case the reducer normalizes.
    #[error("function {function}: entry block contains a phi instruction")]
    IllegalEntryPhi { function: Symbol },

    /// The input CFG was malformed in a way the reducer cannot recover
    /// from (e.g. an instruction names a block id absent from the CFG).
    #[error("function {function}: invalid IR: {reason}")]
    InvalidIr { function: Symbol, reason: String },
}

pub type Result<T> = std::result::Result<T, ReducerError>;
