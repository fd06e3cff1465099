//! Execution driver (C5): turns a decoded instruction stream into a
//! snapshot trace.
//!
//! Grounded on the teacher's top-level `Interpreter::execute` loop — decode,
//! dispatch, advance `pc` — generalized with the label pre-pass and
//! transfer-token interpretation spec.md §4.5 describes. The driver is the
//! only piece of this crate that ever touches a program counter; semantics
//! functions only ever see [`crate::transfer::Transfer`] tokens.

use std::collections::HashMap;

use crate::consts::DEFAULT_MAX_STEPS;
use crate::cpu::CpuState;
use crate::instruction::{ExecutionRequest, InstructionMeta, InstructionRecord};
use crate::operand::Operand;
use crate::semantics;
use crate::snapshot::Snapshot;
use crate::transfer::Transfer;

/// Run the full instruction stream in `request` and return the ordered
/// trace of snapshots (spec.md §4.5, §6).
///
/// Never returns an error: a stream that can't make progress simply
/// terminates early (empty input, step budget exhausted, or an unresolved
/// `call`/`jmp`/`ret` target), matching spec.md §7's "no instruction ever
/// aborts the run" contract.
#[tracing::instrument(skip(request), fields(instruction_count = request.instructions.len()))]
pub fn run(request: &ExecutionRequest) -> Vec<Snapshot> {
    let instructions = &request.instructions;
    let mut snapshots = Vec::new();

    let Some(first) = instructions.first() else {
        tracing::debug!("empty instruction stream, nothing to emulate");
        return snapshots;
    };

    let max_steps = request.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
    let labels = build_label_table(instructions);

    let mut cpu = CpuState::new();
    snapshots.push(Snapshot::capture(&cpu, InstructionMeta::init(first)));

    let mut pc: usize = 0;
    let mut steps = 0u32;

    while pc < instructions.len() && steps < max_steps {
        let record = &instructions[pc];
        let trimmed = record.assembly.trim();

        // Blank lines, label definitions (`foo:`) and comment lines (`;...`)
        // advance pc without executing anything and without a snapshot
        // (SPEC_FULL.md §6: preserved from the source's handling of `;`).
        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.ends_with(':') {
            pc += 1;
            continue;
        }

        let transfer = semantics::dispatch(&mut cpu, trimmed);
        steps += 1;

        // Snapshot reflects the state right after the instruction's own
        // semantics ran, but before the transfer token is interpreted:
        // spec.md §4.5 step 2 ("emit a snapshot ... then increment the step
        // counter") precedes step 3 ("interpret the returned transfer
        // token"), and the original `emulate_from_debug` calls `get_snapshot`
        // before `_handle_call`/`_handle_ret`. A `call` snapshot must not
        // already show the return address pushed, and a `ret` snapshot must
        // not already show it popped.
        snapshots.push(Snapshot::capture(&cpu, InstructionMeta::for_instruction(record, trimmed)));

        let mut halt = false;

        pc = match transfer {
            Transfer::Continue => pc + 1,
            Transfer::Call(target) => {
                cpu.push((pc + 1) as u64);
                match resolve_target(&target, &labels, instructions) {
                    Some(dest) => dest,
                    None => {
                        // Unresolved call target: fall through (spec.md
                        // §4.5, §7), not a halt.
                        tracing::debug!(target = %target.target_name(), "unresolved call target, falling through");
                        pc + 1
                    }
                }
            }
            Transfer::Ret => {
                if cpu.stack_is_empty() {
                    tracing::debug!("ret with empty call stack, halting");
                    halt = true;
                    pc
                } else {
                    cpu.pop() as usize
                }
            }
            Transfer::Jump(kind, target) => {
                if kind.is_taken(&cpu.flags) {
                    match resolve_target(&target, &labels, instructions) {
                        Some(dest) => dest,
                        None => {
                            // Unresolved jump target: fall through, same as
                            // an unresolved call (spec.md §4.5, §7).
                            tracing::debug!(target = %target.target_name(), "unresolved jump target, falling through");
                            pc + 1
                        }
                    }
                } else {
                    pc + 1
                }
            }
        };

        if halt {
            break;
        }
    }

    if steps >= max_steps {
        tracing::warn!(max_steps, "step budget exhausted, halting");
    }

    for (index, snapshot) in snapshots.iter_mut().enumerate() {
        snapshot.step = index;
    }

    tracing::info!(snapshot_count = snapshots.len(), "emulated execution snapshots");
    snapshots
}

/// Map every label line (`"name:"`, trimmed) to that label line's own
/// instruction index (spec.md §4.5 step 1, §8 invariant 9). Landing `pc` on
/// a label line is harmless: the main loop skips label lines without
/// counting a step or emitting a snapshot, so resolution lands on the next
/// real instruction one iteration later.
fn build_label_table(instructions: &[InstructionRecord]) -> HashMap<String, usize> {
    let mut labels = HashMap::new();
    for (index, record) in instructions.iter().enumerate() {
        let trimmed = record.assembly.trim();
        if let Some(name) = trimmed.strip_suffix(':') {
            labels.insert(name.trim().to_string(), index);
        }
    }
    labels
}

/// Resolve a `call`/`jmp` target to an instruction index: first through the
/// label table, falling back to a linear scan for an instruction whose
/// trimmed assembly equals the target name or the target name plus a
/// trailing colon (spec.md §4.5 step 2).
fn resolve_target(target: &Operand, labels: &HashMap<String, usize>, instructions: &[InstructionRecord]) -> Option<usize> {
    let name = target.target_name();

    if let Some(&index) = labels.get(&name) {
        return Some(index);
    }

    let with_colon = format!("{name}:");
    instructions
        .iter()
        .position(|record| {
            let trimmed = record.assembly.trim();
            trimmed == name || trimmed == with_colon
        })
}
