//! # Register File
//!
//! 17 slots of 32 bits, addressed by index:
//!
//! - **R0-R14**: General purpose. `BL` does not write R14, programs set it themselves.
//! - **R15 (PC)**: Address of the *next* instruction to fetch, used as is.
//! - **16 (CPSR)**: Status register, condition flags in bits 28-31.
//!
//! Register banking and the pipeline-visible `PC + 8` read value are not modelled:
//! reading R15 returns exactly the address of the instruction being executed.

use serde::{Deserialize, Serialize};

use crate::cpu::psr::Psr;

/// Link Register index, the usual `BX` return register.
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

/// Status register index.
pub const REG_CPSR: usize = 0x10;

pub const REGISTER_COUNT: usize = 17;

/// The whole register file. Cloning it gives a snapshot of the CPU state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers([u32; REGISTER_COUNT]);

impl Registers {
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PROGRAM_COUNTER] = new_value;
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        Psr::from_raw(self.0[REG_CPSR])
    }

    pub fn set_cpsr(&mut self, psr: Psr) {
        self.0[REG_CPSR] = psr.into();
    }

    /// # Panics
    ///
    /// Panics if `reg` is not below [`REGISTER_COUNT`].
    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(
            reg < REGISTER_COUNT,
            "Invalid register index: {reg} (0x{reg:X})"
        );
        self.0[reg] = new_value;
    }

    /// # Panics
    ///
    /// Panics if `reg` is not below [`REGISTER_COUNT`]. See [`Self::get`].
    #[must_use]
    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg]
    }

    /// Value of register `reg`, `None` past the CPSR slot.
    #[must_use]
    pub fn get(&self, reg: usize) -> Option<u32> {
        self.0.get(reg).copied()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u32> {
        self.0.as_slice().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_zeroed() {
        let registers = Registers::default();

        assert_eq!(registers.to_vec(), vec![0; 17]);
        assert_eq!(registers.program_counter(), 0);
        assert_eq!(u32::from(registers.cpsr()), 0);
    }

    #[test]
    fn program_counter_and_cpsr_are_indexed_slots() {
        let mut registers = Registers::default();

        registers.set_program_counter(0x8000);
        registers.set_register_at(REG_CPSR, 0x4000_0000);

        assert_eq!(registers.register_at(REG_PROGRAM_COUNTER), 0x8000);
        assert!(registers.cpsr().zero_flag());
        assert!(!registers.cpsr().sign_flag());
    }

    #[test]
    fn set_cpsr_keeps_other_registers() {
        let mut registers = Registers::default();
        registers.set_register_at(3, 42);

        let mut cpsr = registers.cpsr();
        cpsr.set_sign_flag(true);
        registers.set_cpsr(cpsr);

        assert_eq!(registers.register_at(3), 42);
        assert_eq!(registers.register_at(REG_CPSR), 0x8000_0000);
    }

    #[test]
    fn get_stops_after_cpsr() {
        let mut registers = Registers::default();
        registers.set_register_at(REG_CPSR, 0x1000_0000);

        assert_eq!(registers.get(REG_CPSR), Some(0x1000_0000));
        assert_eq!(registers.get(REGISTER_COUNT), None);
        assert_eq!(registers.get(usize::MAX), None);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn register_at_panics_past_cpsr() {
        let registers = Registers::default();
        let _ = registers.register_at(REGISTER_COUNT);
    }

    #[test]
    #[should_panic(expected = "Invalid register index")]
    fn rejects_register_17() {
        let mut registers = Registers::default();
        registers.set_register_at(17, 1);
    }
}
