//! Ambient logging.
//!
//! The collector and mutators log through the [`log`] facade rather than
//! a bespoke event system; whatever subscriber the embedding application
//! installs (`env_logger`, `tracing-log`, etc.) receives these records.
//! GC cycle boundaries log at `debug`, per-block sweep decisions at
//! `trace`.

/// Emit a `trace`-level record describing one block's sweep disposition.
pub(crate) fn log_block_swept(block_addr: usize, reclaimed: bool) {
    log::trace!(
        "block {:#x}: {}",
        block_addr,
        if reclaimed { "reclaimed" } else { "retained (live objects)" }
    );
}
