//! Replays a decoded x86-64 instruction stream and emits a step-by-step
//! machine-state snapshot trace, for driving a debugger UI.
//!
//! The crate has no network, filesystem, or subprocess surface: callers
//! decode assembly into an [`ExecutionRequest`] themselves (typically by
//! deserializing a compiler's debug document with `serde_json`) and get
//! back an ordered [`Vec<Snapshot>`], one entry per executed instruction
//! plus a synthetic `INIT` entry. See [`run`] for the entry point.
//!
//! ```
//! use x86_replay_vm::{run, ExecutionRequest};
//!
//! let request: ExecutionRequest = serde_json::from_str(r#"{
//!     "instructions": [
//!         {"assembly": "mov rax, 1", "id": 0, "sourceLine": 1},
//!         {"assembly": "add rax, 2", "id": 1, "sourceLine": 2}
//!     ]
//! }"#).unwrap();
//!
//! let snapshots = run(&request);
//! assert_eq!(snapshots.len(), 3); // INIT + 2 instructions
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

mod consts;
mod cpu;
mod driver;
mod error;
mod flags;
mod instruction;
mod operand;
mod registers;
mod semantics;
mod snapshot;
mod transfer;

pub use cpu::CpuState;
pub use driver::run;
pub use error::RuntimeError;
pub use flags::Flags;
pub use instruction::{ExecutionRequest, InstructionMeta, InstructionRecord};
pub use operand::Operand;
pub use registers::{AliasRegister, GpRegister, Register};
pub use snapshot::{FlagsView, RegisterMap, RegisterValue, Snapshot, StackEntry};
pub use transfer::{JumpKind, Transfer};
