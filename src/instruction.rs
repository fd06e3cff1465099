//! Input instruction records, as emitted by the external compiler's debug
//! document (spec.md §6). This crate only reads `assembly`, `id`,
//! `sourceLine` and `line`; any other field the compiler attaches is opaque
//! and simply not modeled here — the collaborator that produces the debug
//! document is out of scope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One already-decoded instruction in the replay stream.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstructionRecord {
    /// The raw assembly text for this line, e.g. `"mov rax, 5"` or a label
    /// line such as `"done:"`.
    pub assembly: String,
    /// Opaque identifier, passed through unchanged into snapshots. Not
    /// assumed to be numeric.
    #[serde(default)]
    pub id: Value,
    /// 1-based (or whatever the compiler uses) source line this
    /// instruction was generated from.
    #[serde(rename = "sourceLine", default)]
    pub source_line: i64,
    /// Display line, defaulting to `source_line` when the compiler omits
    /// it (spec.md §3).
    #[serde(default)]
    pub line: Option<i64>,
}

impl InstructionRecord {
    /// `line`, defaulting to `source_line` when absent.
    pub fn display_line(&self) -> i64 {
        self.line.unwrap_or(self.source_line)
    }
}

/// Instruction metadata carried by a snapshot: the instruction that was
/// just executed (or the synthetic `"INIT"` entry before anything has run).
#[derive(Debug, Clone, Serialize)]
pub struct InstructionMeta {
    /// Passed through from the source record, or `-1` for the INIT
    /// snapshot.
    pub id: Value,
    /// Trimmed assembly text.
    pub assembly: String,
    #[serde(rename = "sourceLine")]
    /// Source line, copied from the executed instruction.
    pub source_line: i64,
    /// Display line, copied from the executed instruction.
    pub line: i64,
}

impl InstructionMeta {
    /// Metadata for a real, executed instruction.
    pub fn for_instruction(record: &InstructionRecord, trimmed_assembly: &str) -> Self {
        InstructionMeta {
            id: record.id.clone(),
            assembly: trimmed_assembly.to_string(),
            source_line: record.source_line,
            line: record.display_line(),
        }
    }

    /// Metadata for the synthetic snapshot emitted immediately after CPU
    /// initialization, before the first real instruction runs (spec.md
    /// §4.5).
    ///
    /// Unlike [`InstructionMeta::for_instruction`], a missing `line` here
    /// defaults to `0`, not to `source_line` — the original
    /// `emulate_from_debug` builds this entry with
    /// `first_inst.get('line', 0)`, distinct from its general
    /// `line`-defaults-to-`sourceLine` handling elsewhere.
    pub fn init(first: &InstructionRecord) -> Self {
        InstructionMeta {
            id: Value::from(-1),
            assembly: "INIT".to_string(),
            source_line: first.source_line,
            line: first.line.unwrap_or(0),
        }
    }
}

/// The top-level request this crate's entry point consumes: the
/// compiler's debug document, plus the optional step budget (spec.md §6).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExecutionRequest {
    /// The decoded instruction stream. Missing entirely is treated as
    /// empty, not an error.
    #[serde(default)]
    pub instructions: Vec<InstructionRecord>,
    /// Overrides [`crate::consts::DEFAULT_MAX_STEPS`] when present.
    #[serde(rename = "maxSteps", default)]
    pub max_steps: Option<u32>,
}
