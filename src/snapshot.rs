//! Snapshot (C6): the per-step machine-state record emitted to the
//! debugger UI.
//!
//! Grounded on the teacher's `Receipt` types (`receipt.rs`) — a plain,
//! serializable record of "what the machine looked like after this step",
//! built once per executed instruction and never mutated again. The
//! register map's iteration order is fixed (spec.md §3, §6's determinism
//! guarantee) by serializing [`RegisterMap`] as an ordered sequence of
//! entries rather than going through `serde_json::Value`, so no
//! `preserve_order` feature is needed: writing directly to a `Serializer`
//! emits the keys in the order this module chooses, not alphabetically.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::consts::DEFAULT_FLAG_WIDTH;
use crate::cpu::CpuState;
use crate::instruction::InstructionMeta;
use crate::registers::{Register, ALIAS_REGISTER_ORDER, GP_REGISTER_ORDER};

/// A single register's value, in both display bases spec.md §3 requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterValue {
    /// `0x`-prefixed lowercase hexadecimal of the raw 64-bit pattern.
    pub hex: String,
    /// Signed two's-complement interpretation of the same 64-bit pattern.
    pub decimal: i64,
}

impl RegisterValue {
    fn from_raw(value: u64) -> Self {
        RegisterValue {
            hex: format!("0x{value:x}"),
            decimal: value as i64,
        }
    }
}

/// The full register map, in the fixed order the sixteen general-purpose
/// registers are declared, followed by the four 32-bit aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap(Vec<(&'static str, RegisterValue)>);

impl RegisterMap {
    fn capture(registers: &crate::registers::Registers) -> Self {
        let mut entries = Vec::with_capacity(GP_REGISTER_ORDER.len() + ALIAS_REGISTER_ORDER.len());
        for reg in GP_REGISTER_ORDER {
            let register = Register::Gp(reg);
            entries.push((register.name(), RegisterValue::from_raw(registers.read(register))));
        }
        for alias in ALIAS_REGISTER_ORDER {
            let register = Register::Alias(alias);
            entries.push((register.name(), RegisterValue::from_raw(registers.read(register))));
        }
        RegisterMap(entries)
    }

    /// Look up a register's captured value by name, e.g. for test
    /// assertions.
    pub fn get(&self, name: &str) -> Option<&RegisterValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

impl Serialize for RegisterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One stack slot as carried in a snapshot: the address and the 64-bit word
/// stored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackEntry {
    /// `0x`-prefixed address.
    pub address: String,
    /// `0x`-prefixed value stored at that address.
    pub value: String,
}

/// The three condition flags this model tracks, as exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagsView {
    /// Zero flag.
    pub zf: bool,
    /// Sign flag.
    pub sf: bool,
    /// Carry flag. Always `false`: no instruction in this model writes it
    /// (see [`crate::flags`]).
    pub cf: bool,
}

/// A complete machine-state snapshot taken immediately after one
/// instruction has executed (or immediately after CPU initialization, for
/// the synthetic `INIT` snapshot).
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Position of this snapshot in the emitted sequence, starting at 0 for
    /// the synthetic `INIT` snapshot. Assigned by the driver once the full
    /// sequence is known (spec.md §4.5).
    pub step: usize,
    /// The instruction that produced this snapshot.
    pub instruction: InstructionMeta,
    /// Every general-purpose register and alias, in fixed order.
    pub registers: RegisterMap,
    /// Condition flags after this step.
    pub flags: FlagsView,
    /// Up to [`crate::consts::SNAPSHOT_STACK_WINDOW`] stack words, ascending
    /// by address.
    pub stack: Vec<StackEntry>,
}

impl Snapshot {
    /// Capture the current machine state, labeled with `instruction`.
    ///
    /// `step` is left at 0; the driver assigns the real position once the
    /// full sequence is known.
    pub fn capture(cpu: &CpuState, instruction: InstructionMeta) -> Self {
        debug_assert_eq!(DEFAULT_FLAG_WIDTH, 64, "snapshot assumes 64-bit registers");

        let stack = cpu
            .stack_window()
            .into_iter()
            .map(|(address, value)| StackEntry {
                address: format!("0x{address:x}"),
                value: format!("0x{value:x}"),
            })
            .collect();

        Snapshot {
            step: 0,
            instruction,
            registers: RegisterMap::capture(&cpu.registers),
            flags: FlagsView {
                zf: cpu.flags.zf,
                sf: cpu.flags.sf,
                cf: cpu.flags.cf,
            },
            stack,
        }
    }
}
