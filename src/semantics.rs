//! Instruction semantics (C4): the per-mnemonic effect on [`CpuState`].
//!
//! Grounded directly on the teacher's `interpreter::executors::instruction`
//! module: one `match` over the decoded instruction, one arm per mnemonic,
//! each arm delegating to a small shared helper (there, `alu_set`/
//! `alu_capture_overflow`/`alu_error`; here, [`binary`]/[`unary`]/
//! [`compare`]). Control-flow mnemonics return a [`Transfer`] instead of
//! touching `pc`, exactly as the teacher's `JI`/`JMP`/`RET` arms return
//! early with a value instead of mutating `self.registers[RegId::PC]`
//! themselves.
//!
//! Per spec.md §7, nothing here is allowed to abort the trace: a failure
//! caught by [`dispatch`] is logged and downgraded to [`Transfer::Continue`],
//! and an unknown mnemonic is logged and treated the same way.

use crate::cpu::CpuState;
use crate::error::RuntimeError;
use crate::operand::{parse_operand, Operand};
use crate::registers::{GpRegister, Register};
use crate::transfer::{JumpKind, Transfer};

/// Decode one trimmed assembly line and apply its effect to `cpu`.
///
/// This is the instruction-dispatch boundary: any [`RuntimeError`] from
/// [`execute`] is caught here, logged, and converted to
/// [`Transfer::Continue`] so a single malformed or unsupported instruction
/// never aborts the rest of the trace (spec.md §7), the same role the
/// teacher's `instruction()` plays around `_instruction()`.
#[tracing::instrument(level = "trace", skip(cpu))]
pub fn dispatch(cpu: &mut CpuState, trimmed_assembly: &str) -> Transfer {
    let (mnemonic, operands) = split_instruction(trimmed_assembly);
    tracing::trace!(mnemonic = %mnemonic, operand_count = operands.len(), "dispatching instruction");

    match execute(cpu, &mnemonic, &operands) {
        Ok(transfer) => transfer,
        Err(error) => {
            tracing::warn!(mnemonic = %mnemonic, %error, "instruction semantics failed, treating as no-op");
            Transfer::Continue
        }
    }
}

/// Split `"mnemonic op1, op2"` into a lowercased mnemonic and its parsed
/// operands.
fn split_instruction(text: &str) -> (String, Vec<Operand>) {
    let mut parts = text.splitn(2, char::is_whitespace);
    let mnemonic = parts.next().unwrap_or("").to_lowercase();
    let rest = parts.next().unwrap_or("").trim();
    let operands = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(parse_operand).collect()
    };
    (mnemonic, operands)
}

fn execute(cpu: &mut CpuState, mnemonic: &str, operands: &[Operand]) -> Result<Transfer, RuntimeError> {
    match mnemonic {
        "mov" => {
            if let [dst, src] = operands {
                let value = cpu.value_of(src);
                cpu.store(dst, value);
            }
            Ok(Transfer::Continue)
        }

        "lea" => {
            if let [dst, Operand::Mem { base, disp }] = operands {
                let addr = cpu.effective_address(*base, *disp);
                cpu.store(dst, addr);
            }
            Ok(Transfer::Continue)
        }

        "add" => binary(cpu, operands, |a, b| a + b),
        "sub" => binary(cpu, operands, |a, b| a - b),
        "imul" => imul(cpu, operands),
        "and" => binary(cpu, operands, |a, b| a & b),
        "or" => binary(cpu, operands, |a, b| a | b),
        "xor" => binary(cpu, operands, |a, b| a ^ b),

        "mul" => {
            if let [src] = operands {
                let rax = cpu.registers.read(Register::Gp(GpRegister::Rax)) as u128;
                let factor = cpu.value_of(src) as u128;
                let product = rax * factor;
                cpu.registers
                    .write(Register::Gp(GpRegister::Rax), product as u64);
                cpu.registers
                    .write(Register::Gp(GpRegister::Rdx), (product >> 64) as u64);
                // Flags reflect the raw 128-bit product, not the masked
                // 64-bit low half (open question 3 in SPEC_FULL.md).
                cpu.flags.update(product as i128, 64);
            }
            Ok(Transfer::Continue)
        }

        "idiv" | "div" => {
            if let [src] = operands {
                let divisor = cpu.value_of(src);
                if divisor != 0 {
                    let dividend = cpu.registers.read(Register::Gp(GpRegister::Rax));
                    cpu.registers
                        .write(Register::Gp(GpRegister::Rax), dividend / divisor);
                    cpu.registers
                        .write(Register::Gp(GpRegister::Rdx), dividend % divisor);
                }
                // Division by zero is a silent no-op: no exception, flags
                // untouched (spec.md §4.4, §7).
            }
            Ok(Transfer::Continue)
        }

        "inc" => unary(cpu, operands, |a| a + 1),
        "dec" => unary(cpu, operands, |a| a - 1),
        "neg" => unary(cpu, operands, |a| -a),
        "not" => unary(cpu, operands, |a| !a),

        "shl" | "sal" => shift(cpu, operands, u64::checked_shl),
        "shr" => shift(cpu, operands, u64::checked_shr),

        "cmp" => compare(cpu, operands, |a, b| a - b),
        "test" => compare(cpu, operands, |a, b| a & b),

        "push" => {
            if let [src] = operands {
                let value = cpu.value_of(src);
                cpu.push(value);
            }
            Ok(Transfer::Continue)
        }

        "pop" => {
            if let [dst] = operands {
                let value = cpu.pop();
                cpu.store(dst, value);
            }
            Ok(Transfer::Continue)
        }

        "nop" => Ok(Transfer::Continue),

        "leave" => {
            let rbp = cpu.registers.read(Register::Gp(GpRegister::Rbp));
            cpu.registers.write(Register::Gp(GpRegister::Rsp), rbp);
            let restored = cpu.pop();
            cpu.registers.write(Register::Gp(GpRegister::Rbp), restored);
            Ok(Transfer::Continue)
        }

        "call" => match operands {
            [target] => Ok(Transfer::Call(target.clone())),
            _ => Ok(Transfer::Continue),
        },

        "ret" => Ok(Transfer::Ret),

        "jmp" => jump(JumpKind::Jmp, operands),
        "je" | "jz" => jump(JumpKind::Je, operands),
        "jne" | "jnz" => jump(JumpKind::Jne, operands),
        "jl" => jump(JumpKind::Jl, operands),
        "jg" => jump(JumpKind::Jg, operands),
        "jle" => jump(JumpKind::Jle, operands),
        "jge" => jump(JumpKind::Jge, operands),

        _ => {
            tracing::warn!(mnemonic, "unrecognized mnemonic, treating as no-op");
            Ok(Transfer::Continue)
        }
    }
}

/// `dst <- op(dst, src)`, masked to 64 bits, with ZF/SF updated from the
/// unmasked result (spec.md §4.4).
fn binary(
    cpu: &mut CpuState,
    operands: &[Operand],
    op: impl Fn(i128, i128) -> i128,
) -> Result<Transfer, RuntimeError> {
    if let [dst, src] = operands {
        let a = cpu.value_of(dst) as i128;
        let b = cpu.value_of(src) as i128;
        let result = op(a, b);
        cpu.store(dst, result as u64);
        cpu.flags.update(result, 64);
    }
    Ok(Transfer::Continue)
}

/// `dst <- op(dst)`, masked to 64 bits, with ZF/SF updated.
fn unary(cpu: &mut CpuState, operands: &[Operand], op: impl Fn(i128) -> i128) -> Result<Transfer, RuntimeError> {
    if let [dst] = operands {
        let a = cpu.value_of(dst) as i128;
        let result = op(a);
        cpu.store(dst, result as u64);
        cpu.flags.update(result, 64);
    }
    Ok(Transfer::Continue)
}

/// Two-operand `imul`: `dst <- dst * src`, masked to 64 bits.
///
/// Unlike [`binary`], this does not widen both operands to `i128` before
/// multiplying: two full-width `u64` factors can produce a product close to
/// `2^128`, which overflows `i128::MAX` and panics in a debug build. Only
/// the low 64 bits of the product ever matter (they are all that's stored,
/// and ZF/SF only ever look at bit 63 of the masked result), so the
/// multiplication is done with a wrapping `u64` multiply, the same way
/// `mul` takes the low 64 bits of its 128-bit product.
fn imul(cpu: &mut CpuState, operands: &[Operand]) -> Result<Transfer, RuntimeError> {
    if let [dst, src] = operands {
        let a = cpu.value_of(dst);
        let b = cpu.value_of(src);
        let result = a.wrapping_mul(b);
        cpu.store(dst, result);
        cpu.flags.update(result as i128, 64);
    }
    Ok(Transfer::Continue)
}

/// `op(a, b)` evaluated for flags only; `dst` is never written (`cmp`,
/// `test`).
fn compare(cpu: &mut CpuState, operands: &[Operand], op: impl Fn(i128, i128) -> i128) -> Result<Transfer, RuntimeError> {
    if let [a, b] = operands {
        let lhs = cpu.value_of(a) as i128;
        let rhs = cpu.value_of(b) as i128;
        cpu.flags.update(op(lhs, rhs), 64);
    }
    Ok(Transfer::Continue)
}

/// `shl`/`shr`/`sal`: logical shift by a count that must fit in 32 bits
/// (mirrors the teacher's `SLL`/`SRL` handling, which rejects counts that
/// don't fit in `u32` rather than silently truncating them).
fn shift(
    cpu: &mut CpuState,
    operands: &[Operand],
    op: impl Fn(u64, u32) -> Option<u64>,
) -> Result<Transfer, RuntimeError> {
    if let [dst, count] = operands {
        let value = cpu.value_of(dst);
        let count = cpu.value_of(count);
        let count = u32::try_from(count).map_err(|_| RuntimeError::ShiftCountOutOfRange)?;
        let result = op(value, count).unwrap_or(0);
        cpu.store(dst, result);
        cpu.flags.update(result as i128, 64);
    }
    Ok(Transfer::Continue)
}

fn jump(kind: JumpKind, operands: &[Operand]) -> Result<Transfer, RuntimeError> {
    match operands {
        [target] => Ok(Transfer::Jump(kind, target.clone())),
        // Missing target: fall through, same as spec.md §4.5's "if target
        // is missing, fall through" — `Continue` already does `pc += 1`.
        _ => Ok(Transfer::Continue),
    }
}
