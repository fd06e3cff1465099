//! Interpreter error types.
//!
//! Nothing in [`crate::driver::run`] is fatal: per-instruction failures are
//! caught at the instruction-dispatch boundary and downgraded to
//! [`crate::transfer::Transfer::Continue`] (mirroring how the teacher crate's
//! `instruction()` converts a `RuntimeError` at its own dispatch boundary).
//! [`RuntimeError`] exists so that boundary has something typed to catch,
//! and so semantics functions can propagate failures with `?` instead of
//! silently swallowing them deep in the call stack.

use thiserror::Error;

/// A recoverable failure inside a single instruction's semantics.
///
/// None of these ever escape [`crate::driver::run`]: the dispatcher logs
/// them and treats the instruction as a no-op ([`Continue`], see
/// [`crate::transfer::Transfer::Continue`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A shift count didn't fit in 32 bits, so it could not be passed to
    /// the host's `checked_shl`/`checked_shr`.
    #[error("shift count out of range")]
    ShiftCountOutOfRange,
}
