//! Flag engine: derives `ZF`/`SF` from an arithmetic or logic result.
//!
//! `CF` is tracked but, per spec.md §9, never written by any instruction in
//! this model — a known limitation carried over from the source the
//! interpreter was distilled from, not a bug introduced here. The signed
//! conditional jumps (`jl`/`jge`/`jg`/`jle`) read `SF XOR CF` the way a real
//! CPU reads `SF XOR OF`; because `CF` is always 0 here, those jumps behave
//! like `js`/`jns` in practice. Preserved as specified.

/// The three flags this model tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    /// Zero flag.
    pub zf: bool,
    /// Sign flag.
    pub sf: bool,
    /// Carry flag. Declared for the conditional-jump predicates that read
    /// it, but never assigned.
    pub cf: bool,
}

impl Flags {
    /// A fresh flag set with everything cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive `ZF`/`SF` from `result`, masked to `width` bits (spec.md §4.3).
    ///
    /// `result` is the *unmasked* mathematical result — callers must not
    /// mask it themselves first. `mul`/`imul` rely on this: they pass the
    /// full 128-bit product and this function masks down to `width` before
    /// testing the flags (open question 3 in SPEC_FULL.md).
    pub fn update(&mut self, result: i128, width: u32) {
        let mask: u128 = if width < 64 {
            (1u128 << width) - 1
        } else {
            u64::MAX as u128
        };
        let masked = (result as u128) & mask;
        self.zf = masked == 0;
        let sign_bit = if width < 64 { width - 1 } else { 63 };
        self.sf = (masked >> sign_bit) & 1 == 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_result_sets_zf() {
        let mut flags = Flags::new();
        flags.update(0, 64);
        assert!(flags.zf);
        assert!(!flags.sf);
    }

    #[test]
    fn negative_result_sets_sf() {
        let mut flags = Flags::new();
        flags.update(-4, 64);
        assert!(!flags.zf);
        assert!(flags.sf);
    }

    #[test]
    fn cf_is_never_touched() {
        let mut flags = Flags::new();
        flags.cf = false;
        flags.update(-1, 64);
        assert!(!flags.cf);
    }
}
