//! CPU State (C2): registers, flags, and a sparse stack, plus the handful
//! of operations instruction semantics need to read and write operands.
//!
//! Grounded on the teacher's `Interpreter` struct (`interpreter.rs`), which
//! is likewise the single piece of mutable state semantics functions act
//! on; this crate's version is much smaller since there is no memory
//! segment, contract storage, or gas metering to carry.

use std::collections::HashMap;

use crate::consts::STACK_BASE;
use crate::flags::Flags;
use crate::operand::Operand;
use crate::registers::Registers;

/// The full machine state threaded through instruction execution.
///
/// Created once per [`crate::driver::run`] call, mutated only by
/// [`crate::semantics`], and discarded when execution finishes.
#[derive(Debug, Clone)]
pub struct CpuState {
    /// General-purpose registers and their 32-bit aliases.
    pub registers: Registers,
    /// `ZF`/`SF`/`CF`.
    pub flags: Flags,
    /// Sparse address -> 64-bit word map. Addresses never written read as
    /// 0 (spec.md §3).
    stack: HashMap<u64, u64>,
}

impl CpuState {
    /// A fresh CPU state: zeroed registers (except `rsp`), cleared flags,
    /// empty stack.
    pub fn new() -> Self {
        CpuState {
            registers: Registers::new(),
            flags: Flags::new(),
            stack: HashMap::new(),
        }
    }

    /// Read the operand's value. Memory reads use `base + disp` as the
    /// address; addresses absent from the stack map read as 0. Reading a
    /// [`Operand::Label`] yields its resolved target address if one is
    /// known to the caller — in practice labels are never read as values by
    /// the instructions in this model, so this returns 0, matching the
    /// "unknown operand reads as 0" rule.
    pub fn value_of(&self, operand: &Operand) -> u64 {
        match operand {
            Operand::Reg(reg) => self.registers.read(*reg),
            Operand::Imm(value) => *value as u64,
            Operand::Mem { base, disp } => {
                let addr = self.effective_address(*base, *disp);
                self.stack.get(&addr).copied().unwrap_or(0)
            }
            Operand::Label(_) | Operand::Unknown(_) => 0,
        }
    }

    /// Compute a `[base+disp]` effective address without reading memory
    /// (used by both memory operand reads and `lea`).
    pub fn effective_address(&self, base: crate::registers::Register, disp: i64) -> u64 {
        self.registers.read(base).wrapping_add(disp as u64)
    }

    /// Write `value` to the operand's destination.
    ///
    /// Immediate and label operands cannot be written to: per spec.md §4.1
    /// and §4.4, this is a silent no-op, same as writing to an
    /// [`Operand::Unknown`].
    pub fn store(&mut self, operand: &Operand, value: u64) {
        match operand {
            Operand::Reg(reg) => self.registers.write(*reg, value),
            Operand::Mem { base, disp } => {
                let addr = self.effective_address(*base, *disp);
                self.stack.insert(addr, value);
            }
            Operand::Imm(_) | Operand::Label(_) | Operand::Unknown(_) => {}
        }
    }

    /// Push a 64-bit word: decrement `rsp` by 8, then store at the new
    /// `rsp`.
    pub fn push(&mut self, value: u64) {
        let rsp = self.registers.read_by_name("rsp").wrapping_sub(8);
        self.registers
            .write(crate::registers::Register::Gp(crate::registers::GpRegister::Rsp), rsp);
        self.stack.insert(rsp, value);
    }

    /// Pop a 64-bit word: read at `rsp` (0 if absent), increment `rsp` by
    /// 8, drop the entry.
    pub fn pop(&mut self) -> u64 {
        let rsp = self.registers.read_by_name("rsp");
        let value = self.stack.remove(&rsp).unwrap_or(0);
        self.registers
            .write(crate::registers::Register::Gp(crate::registers::GpRegister::Rsp), rsp.wrapping_add(8));
        value
    }

    /// Current `rsp`. Used by the driver to detect an exhausted call stack
    /// on `ret`.
    pub fn stack_pointer(&self) -> u64 {
        self.registers.read_by_name("rsp")
    }

    /// `true` once the call stack has unwound back past its initial depth
    /// (spec.md §4.5 step 3, `ret` handling).
    pub fn stack_is_empty(&self) -> bool {
        self.stack_pointer() >= STACK_BASE
    }

    /// The first [`crate::consts::SNAPSHOT_STACK_WINDOW`] entries, sorted
    /// ascending by address, for snapshotting.
    pub fn stack_window(&self) -> Vec<(u64, u64)> {
        let mut entries: Vec<(u64, u64)> = self.stack.iter().map(|(&a, &v)| (a, v)).collect();
        entries.sort_unstable_by_key(|(addr, _)| *addr);
        entries.truncate(crate::consts::SNAPSHOT_STACK_WINDOW);
        entries
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{GpRegister, Register};

    #[test]
    fn push_then_pop_round_trips() {
        let mut cpu = CpuState::new();
        let before = cpu.stack_pointer();
        cpu.push(0xABCD);
        assert_eq!(cpu.stack_pointer(), before - 8);
        let popped = cpu.pop();
        assert_eq!(popped, 0xABCD);
        assert_eq!(cpu.stack_pointer(), before);
    }

    #[test]
    fn pop_of_untouched_address_is_zero() {
        let mut cpu = CpuState::new();
        assert_eq!(cpu.pop(), 0);
    }

    #[test]
    fn memory_operand_round_trips_through_store_and_value_of() {
        let mut cpu = CpuState::new();
        cpu.registers.write(Register::Gp(GpRegister::Rbp), 0x1000);
        let operand = Operand::Mem {
            base: Register::Gp(GpRegister::Rbp),
            disp: -8,
        };
        cpu.store(&operand, 99);
        assert_eq!(cpu.value_of(&operand), 99);
        assert_eq!(cpu.value_of(&Operand::Mem { base: Register::Gp(GpRegister::Rbp), disp: -16 }), 0);
    }

    #[test]
    fn stack_window_is_sorted_and_capped() {
        let mut cpu = CpuState::new();
        for i in 0..40u64 {
            cpu.push(i);
        }
        let window = cpu.stack_window();
        assert_eq!(window.len(), crate::consts::SNAPSHOT_STACK_WINDOW);
        assert!(window.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }
}
