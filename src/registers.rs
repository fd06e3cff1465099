//! Register file: sixteen 64-bit general-purpose registers plus the four
//! 32-bit low-half aliases `eax/ebx/ecx/edx`.
//!
//! Grounded on the teacher's `constraints::reg_key` module, which proves
//! register-index validity at compile time via a fixed key list; this crate
//! has a much smaller, string-named register set, so the const-generic key
//! trick is replaced by a plain enum, but the "one array, fixed iteration
//! order" shape is kept.

use core::fmt;

/// One of the sixteen 64-bit general-purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum GpRegister {
    Rax,
    Rbx,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

/// The fixed iteration order used everywhere a register list is observable
/// (snapshot serialization, property tests). Matches the order spec.md
/// fixes for the snapshotter.
pub const GP_REGISTER_ORDER: [GpRegister; 16] = [
    GpRegister::Rax,
    GpRegister::Rbx,
    GpRegister::Rcx,
    GpRegister::Rdx,
    GpRegister::Rsi,
    GpRegister::Rdi,
    GpRegister::Rbp,
    GpRegister::Rsp,
    GpRegister::R8,
    GpRegister::R9,
    GpRegister::R10,
    GpRegister::R11,
    GpRegister::R12,
    GpRegister::R13,
    GpRegister::R14,
    GpRegister::R15,
];

/// A 32-bit low-half alias. Writes through an alias preserve the upper 32
/// bits of the backing 64-bit register rather than zero-extending them —
/// a deliberate deviation from native x86-64 semantics, preserved as
/// specified (see the open questions in SPEC_FULL.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AliasRegister {
    Eax,
    Ebx,
    Ecx,
    Edx,
}

/// The fixed iteration order for the four aliases, appended after the
/// sixteen general-purpose registers in every snapshot.
pub const ALIAS_REGISTER_ORDER: [AliasRegister; 4] = [
    AliasRegister::Eax,
    AliasRegister::Ebx,
    AliasRegister::Ecx,
    AliasRegister::Edx,
];

impl AliasRegister {
    /// The 64-bit register this alias is the low half of.
    pub const fn backing(self) -> GpRegister {
        match self {
            AliasRegister::Eax => GpRegister::Rax,
            AliasRegister::Ebx => GpRegister::Rbx,
            AliasRegister::Ecx => GpRegister::Rcx,
            AliasRegister::Edx => GpRegister::Rdx,
        }
    }
}

/// Either a 64-bit register or one of its 32-bit aliases. This is what an
/// [`crate::operand::Operand::Reg`] actually carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// A 64-bit general-purpose register.
    Gp(GpRegister),
    /// A 32-bit low-half alias.
    Alias(AliasRegister),
}

impl Register {
    /// Parse a bare register name, e.g. `"rax"` or `"ecx"`. Returns `None`
    /// for anything else, which callers treat as "not a register".
    pub fn parse(name: &str) -> Option<Register> {
        use AliasRegister::*;
        use GpRegister::*;
        Some(match name {
            "rax" => Register::Gp(Rax),
            "rbx" => Register::Gp(Rbx),
            "rcx" => Register::Gp(Rcx),
            "rdx" => Register::Gp(Rdx),
            "rsi" => Register::Gp(Rsi),
            "rdi" => Register::Gp(Rdi),
            "rbp" => Register::Gp(Rbp),
            "rsp" => Register::Gp(Rsp),
            "r8" => Register::Gp(R8),
            "r9" => Register::Gp(R9),
            "r10" => Register::Gp(R10),
            "r11" => Register::Gp(R11),
            "r12" => Register::Gp(R12),
            "r13" => Register::Gp(R13),
            "r14" => Register::Gp(R14),
            "r15" => Register::Gp(R15),
            "eax" => Register::Alias(Eax),
            "ebx" => Register::Alias(Ebx),
            "ecx" => Register::Alias(Ecx),
            "edx" => Register::Alias(Edx),
            _ => return None,
        })
    }

    /// Name this register would be parsed from, used when a jump/call
    /// target falls back to an operand's textual form.
    pub const fn name(self) -> &'static str {
        match self {
            Register::Gp(GpRegister::Rax) => "rax",
            Register::Gp(GpRegister::Rbx) => "rbx",
            Register::Gp(GpRegister::Rcx) => "rcx",
            Register::Gp(GpRegister::Rdx) => "rdx",
            Register::Gp(GpRegister::Rsi) => "rsi",
            Register::Gp(GpRegister::Rdi) => "rdi",
            Register::Gp(GpRegister::Rbp) => "rbp",
            Register::Gp(GpRegister::Rsp) => "rsp",
            Register::Gp(GpRegister::R8) => "r8",
            Register::Gp(GpRegister::R9) => "r9",
            Register::Gp(GpRegister::R10) => "r10",
            Register::Gp(GpRegister::R11) => "r11",
            Register::Gp(GpRegister::R12) => "r12",
            Register::Gp(GpRegister::R13) => "r13",
            Register::Gp(GpRegister::R14) => "r14",
            Register::Gp(GpRegister::R15) => "r15",
            Register::Alias(AliasRegister::Eax) => "eax",
            Register::Alias(AliasRegister::Ebx) => "ebx",
            Register::Alias(AliasRegister::Ecx) => "ecx",
            Register::Alias(AliasRegister::Edx) => "edx",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn index(reg: GpRegister) -> usize {
    match reg {
        GpRegister::Rax => 0,
        GpRegister::Rbx => 1,
        GpRegister::Rcx => 2,
        GpRegister::Rdx => 3,
        GpRegister::Rsi => 4,
        GpRegister::Rdi => 5,
        GpRegister::Rbp => 6,
        GpRegister::Rsp => 7,
        GpRegister::R8 => 8,
        GpRegister::R9 => 9,
        GpRegister::R10 => 10,
        GpRegister::R11 => 11,
        GpRegister::R12 => 12,
        GpRegister::R13 => 13,
        GpRegister::R14 => 14,
        GpRegister::R15 => 15,
    }
}

/// The sixteen general-purpose registers, backing both the 64-bit names and
/// their 32-bit aliases.
///
/// Invariant: every value stored here is masked to 64 bits (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers([u64; 16]);

impl Registers {
    /// A fresh register file with every register zeroed except `rsp`,
    /// which is initialized to [`crate::consts::STACK_BASE`].
    pub fn new() -> Self {
        let mut gpr = [0u64; 16];
        gpr[index(GpRegister::Rsp)] = crate::consts::STACK_BASE;
        Registers(gpr)
    }

    /// Read a register or alias. Aliases read the low 32 bits of their
    /// backing register, zero-extended to 64 bits.
    pub fn read(&self, reg: Register) -> u64 {
        match reg {
            Register::Gp(gp) => self.0[index(gp)],
            Register::Alias(alias) => self.0[index(alias.backing())] & 0xFFFF_FFFF,
        }
    }

    /// Write a register or alias.
    ///
    /// A 64-bit write is masked to 64 bits. A 32-bit alias write replaces
    /// the low 32 bits of the backing register and **preserves the upper
    /// 32 bits** — real x86-64 zero-extends here; this model intentionally
    /// does not (see SPEC_FULL.md's open questions).
    pub fn write(&mut self, reg: Register, value: u64) {
        match reg {
            Register::Gp(gp) => self.0[index(gp)] = value,
            Register::Alias(alias) => {
                let slot = &mut self.0[index(alias.backing())];
                *slot = (*slot & 0xFFFF_FFFF_0000_0000) | (value & 0xFFFF_FFFF);
            }
        }
    }

    /// Read a register or alias by its textual name. Returns 0 for any name
    /// that doesn't resolve to a register, matching the looser "reading an
    /// unknown operand yields 0" rule used throughout this model.
    pub fn read_by_name(&self, name: &str) -> u64 {
        Register::parse(name).map_or(0, |r| self.read(r))
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsp_initializes_to_stack_base() {
        let regs = Registers::new();
        assert_eq!(regs.read(Register::Gp(GpRegister::Rsp)), crate::consts::STACK_BASE);
    }

    #[test]
    fn alias_write_preserves_upper_bits() {
        let mut regs = Registers::new();
        regs.write(Register::Gp(GpRegister::Rax), 0xDEAD_BEEF_0000_0000);
        regs.write(Register::Alias(AliasRegister::Eax), 0x1234_5678);
        assert_eq!(
            regs.read(Register::Gp(GpRegister::Rax)),
            0xDEAD_BEEF_1234_5678
        );
        assert_eq!(regs.read(Register::Alias(AliasRegister::Eax)), 0x1234_5678);
    }

    #[test]
    fn unresolved_name_reads_zero() {
        let regs = Registers::new();
        assert_eq!(regs.read_by_name("ax"), 0);
    }

    #[test]
    fn parse_roundtrips_through_name() {
        for reg in GP_REGISTER_ORDER {
            let r = Register::Gp(reg);
            assert_eq!(Register::parse(r.name()), Some(r));
        }
        for alias in ALIAS_REGISTER_ORDER {
            let r = Register::Alias(alias);
            assert_eq!(Register::parse(r.name()), Some(r));
        }
    }
}
