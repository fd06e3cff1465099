//! Interpreter parameters

/// Initial value of `rsp` ("stack base"). Also used to detect an empty stack
/// on `ret`: when `rsp` reaches this value again, the call stack has
/// unwound completely.
pub const STACK_BASE: u64 = 0x7fff_ffff_e000;

/// Number of instructions executed when the caller does not specify
/// `max_steps`. The sole safeguard against a non-terminating instruction
/// stream; there is no wall-clock timeout inside the interpreter.
pub const DEFAULT_MAX_STEPS: u32 = 1000;

/// Number of stack entries (ascending by address) carried in each snapshot.
pub const SNAPSHOT_STACK_WINDOW: usize = 32;

/// Word width assumed by flag derivation when no narrower width is
/// requested. Every call site in this crate uses the default.
pub const DEFAULT_FLAG_WIDTH: u32 = 64;
