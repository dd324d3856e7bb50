use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::EmulatorError;

/// Data processing opcodes (bits 24-21) supported by the ALU.
///
/// The other nine encodings (RSB, ADC, SBC, RSC, TST, TEQ, CMN, BIC, MVN)
/// are rejected when the instruction is decoded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArmModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Add = 0x4,
    Cmp = 0xA,
    Orr = 0xC,
    Mov = 0xD,
}

impl Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Add => f.write_str("ADD"),
            Self::Cmp => f.write_str("CMP"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
        }
    }
}

impl TryFrom<u32> for ArmModeAluInstruction {
    type Error = EmulatorError;

    fn try_from(alu_op_code: u32) -> Result<Self, Self::Error> {
        use ArmModeAluInstruction::{Add, And, Cmp, Eor, Mov, Orr, Sub};
        Ok(match alu_op_code {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x4 => Add,
            0xA => Cmp,
            0xC => Orr,
            0xD => Mov,
            opcode => return Err(EmulatorError::UnsupportedOpcode { opcode }),
        })
    }
}

impl ArmModeAluInstruction {
    /// Computes the result for operands `x` (Rn) and `y` (operand2), modulo 2^32.
    /// Only the result is produced: carry and overflow are never computed.
    #[must_use]
    pub const fn compute(self, x: u32, y: u32) -> u32 {
        match self {
            Self::And => x & y,
            Self::Eor => x ^ y,
            Self::Sub | Self::Cmp => x.wrapping_sub(y),
            Self::Add => x.wrapping_add(y),
            Self::Orr => x | y,
            Self::Mov => y,
        }
    }

    /// Whether the result is stored in Rd. CMP only updates flags.
    #[must_use]
    pub const fn writes_result(self) -> bool {
        !matches!(self, Self::Cmp)
    }

    /// MOV still reads Rn (its result ignores it) but the assembly form omits it.
    pub(crate) const fn uses_rn(self) -> bool {
        !matches!(self, Self::Mov)
    }
}

/// Operand2 as found in bits 11-0.
///
/// The immediate form is the raw 12-bit value (no rotation is applied) and the
/// register form indexes the register file with the whole field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum AluSecondOperandInfo {
    Immediate { value: u32 },
    Register { register: u32 },
}

impl Display for AluSecondOperandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate { value } => write!(f, "#{value}"),
            Self::Register { register } => write!(f, "R{register}"),
        }
    }
}
