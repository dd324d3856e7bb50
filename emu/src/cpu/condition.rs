//! # Conditional Execution
//!
//! Every instruction carries a condition in bits 31-28. The instruction only
//! runs when the condition holds for the current CPSR flags; otherwise it is
//! skipped and the program counter moves on by one word.
//!
//! ```text
//! ┌───────┬────────┬─────────────────────┬──────────────────┐
//! │ Code  │ Suffix │     Meaning         │  Flags Tested    │
//! ├───────┼────────┼─────────────────────┼──────────────────┤
//! │ 0000  │   EQ   │ Equal               │ Z=1              │
//! │ 0001  │   NE   │ Not equal           │ Z=0              │
//! │ 0010  │   CS   │ Carry set           │ C=1              │
//! │ 0011  │   CC   │ Carry clear         │ C=0              │
//! │ 0100  │   MI   │ Minus / negative    │ N=1              │
//! │ 0101  │   PL   │ Plus / non-negative │ N=0              │
//! │ 0110  │   VS   │ Overflow set        │ V=1              │
//! │ 0111  │   VC   │ Overflow clear      │ V=0              │
//! │ 1000  │   HI   │ Higher (unsigned)   │ C=1 AND Z=0      │
//! │ 1001  │   LS   │ Lower/same (uns.)   │ C=0 OR Z=1       │
//! │ 1010  │   GE   │ ≥ (signed)          │ N=V              │
//! │ 1011  │   LT   │ < (signed)          │ N≠V              │
//! │ 1100  │   GT   │ > (signed)          │ Z=0 AND N=V      │
//! │ 1101  │   LE   │ ≤ (signed)          │ Z=1 OR N≠V       │
//! │ 1110  │   AL   │ Always              │ -                │
//! │ 1111  │   -    │ Reserved            │ decode error     │
//! └───────┴────────┴─────────────────────┴──────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::cpu::psr::Psr;
use crate::error::EmulatorError;

/// Condition codes accepted by the decoder. The reserved `0b1111` encoding has
/// no variant and is rejected by [`Condition::try_from`].
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    EQ = 0x0,
    NE = 0x1,
    CS = 0x2,
    CC = 0x3,
    MI = 0x4,
    PL = 0x5,
    VS = 0x6,
    VC = 0x7,
    HI = 0x8,
    LS = 0x9,
    GE = 0xA,
    LT = 0xB,
    GT = 0xC,
    LE = 0xD,
    AL = 0xE,
}

impl TryFrom<u32> for Condition {
    type Error = EmulatorError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            _ => return Err(EmulatorError::InvalidConditionCode { code }),
        })
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EQ => f.write_str("EQ"),
            Self::NE => f.write_str("NE"),
            Self::CS => f.write_str("CS"),
            Self::CC => f.write_str("CC"),
            Self::MI => f.write_str("MI"),
            Self::PL => f.write_str("PL"),
            Self::VS => f.write_str("VS"),
            Self::VC => f.write_str("VC"),
            Self::HI => f.write_str("HI"),
            Self::LS => f.write_str("LS"),
            Self::GE => f.write_str("GE"),
            Self::LT => f.write_str("LT"),
            Self::GT => f.write_str("GT"),
            Self::LE => f.write_str("LE"),
            Self::AL => Ok(()),
        }
    }
}

/// Whether an instruction with the raw 4-bit `code` executes under `flags`.
pub fn is_satisfied(code: u32, flags: Psr) -> Result<bool, EmulatorError> {
    Condition::try_from(code).map(|cond| flags.can_execute(cond))
}
