//! # ARM Instruction Decoding
//!
//! Classifies a 32-bit word into one of the supported instruction families and
//! extracts its fields.
//!
//! ## Decoding Priority
//!
//! Encodings overlap, so the checks run in a fixed order and the first match wins:
//!
//! ```text
//! ┌───┬─────────────────────┬──────────────────────────────────────────────┐
//! │ # │ Family              │ Pattern                                      │
//! ├───┼─────────────────────┼──────────────────────────────────────────────┤
//! │ 1 │ Branch and Exchange │ bits 27-4  == 0x12FFF1                       │
//! │ 2 │ Branch (B/BL)       │ bits 27-25 == 101                            │
//! │ 3 │ Software Interrupt  │ bits 31-24 == 0xEF                           │
//! │ 4 │ Load (LDR)          │ bits 27-26 == 01, bit 20 == 1                │
//! │ 5 │ Store (STR)         │ bits 27-26 == 01, bit 20 == 0                │
//! │ 6 │ Multiply (MUL)      │ bits 31-26 == 111000, bits 7-4 == 1001       │
//! │ 7 │ Data Processing     │ anything else                                │
//! └───┴─────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! The multiply pattern includes the condition field, so only `AL` multiplies
//! are recognized; a conditional `MULEQ` decodes as data processing (AND).
//!
//! ## Data Processing Fields
//!
//! ```text
//! 31-28  27-26  25  24-21  20  19-16  15-12  11-0
//! [Cond] [ 00 ] [I] [Code] [S] [ Rn ] [ Rd ] [Operand2]
//! ```
//!
//! I=1: operand2 is the 12-bit field taken as an unsigned literal.
//! I=0: operand2 is the register indexed by the 12-bit field.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::bitwise::{Bits, extract};
use crate::cpu::arm::alu_instruction::{AluSecondOperandInfo, ArmModeAluInstruction};
use crate::cpu::condition::Condition;
use crate::cpu::registers::REGISTER_COUNT;
use crate::error::EmulatorError;

const BRANCH_AND_EXCHANGE_PATTERN: u32 = 0x12_FFF1;
const SOFTWARE_INTERRUPT_PATTERN: u32 = 0xEF;
const MULTIPLY_HIGH_PATTERN: u32 = 0b11_1000;
const MULTIPLY_LOW_PATTERN: u32 = 0b1001;

/// Instruction family, the result of the classification step alone.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArmModeInstructionKind {
    BranchAndExchange,
    Branch,
    SoftwareInterrupt,
    Load,
    Store,
    Multiply,
    DataProcessing,
}

impl From<u32> for ArmModeInstructionKind {
    fn from(op_code: u32) -> Self {
        if extract(op_code, 27, 4) == BRANCH_AND_EXCHANGE_PATTERN {
            Self::BranchAndExchange
        } else if extract(op_code, 27, 25) == 0b101 {
            Self::Branch
        } else if extract(op_code, 31, 24) == SOFTWARE_INTERRUPT_PATTERN {
            Self::SoftwareInterrupt
        } else if extract(op_code, 27, 26) == 0b01 {
            if op_code.get_bit(20) {
                Self::Load
            } else {
                Self::Store
            }
        } else if extract(op_code, 31, 26) == MULTIPLY_HIGH_PATTERN
            && extract(op_code, 7, 4) == MULTIPLY_LOW_PATTERN
        {
            Self::Multiply
        } else {
            Self::DataProcessing
        }
    }
}

/// A decoded instruction with the fields its handler needs.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeInstruction {
    DataProcessing {
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    },
    /// `Rd := Rs * Rm`, Rd being bits 19-16.
    Multiply { rd: u32, rs: u32, rm: u32 },
    /// Reads a word at the address in `base_register`. Offsets and write-back are not modelled.
    Load { rd: u32, base_register: u32 },
    /// Writes the low byte of `rd` at the address in `base_register`, whatever the B bit says.
    Store { rd: u32, base_register: u32 },
    /// `offset` is already shifted and sign-extended.
    Branch { link: bool, offset: i32 },
    BranchAndExchange { register: u32 },
    /// Stops the emulation. `comment` is the 24-bit immediate.
    SoftwareInterrupt { comment: u32 },
}

impl TryFrom<u32> for ArmModeInstruction {
    type Error = EmulatorError;

    fn try_from(op_code: u32) -> Result<Self, Self::Error> {
        let rn = extract(op_code, 19, 16);
        let rd = extract(op_code, 15, 12);

        Ok(match ArmModeInstructionKind::from(op_code) {
            ArmModeInstructionKind::BranchAndExchange => Self::BranchAndExchange {
                register: extract(op_code, 3, 0),
            },
            ArmModeInstructionKind::Branch => {
                // 24-bit word offset to a 26-bit byte offset. Bit 24 (link) does
                // not take part in the offset.
                let offset = (extract(op_code, 23, 0) << 2).sign_extended(26) as i32;
                Self::Branch {
                    link: op_code.get_bit(24),
                    offset,
                }
            }
            ArmModeInstructionKind::SoftwareInterrupt => Self::SoftwareInterrupt {
                comment: extract(op_code, 23, 0),
            },
            ArmModeInstructionKind::Load => Self::Load {
                rd,
                base_register: rn,
            },
            ArmModeInstructionKind::Store => Self::Store {
                rd,
                base_register: rn,
            },
            ArmModeInstructionKind::Multiply => Self::Multiply {
                rd: rn,
                rs: extract(op_code, 11, 8),
                rm: extract(op_code, 3, 0),
            },
            ArmModeInstructionKind::DataProcessing => {
                let alu_instruction = ArmModeAluInstruction::try_from(extract(op_code, 24, 21))?;
                let field = extract(op_code, 11, 0);
                let op2 = if op_code.get_bit(25) {
                    AluSecondOperandInfo::Immediate { value: field }
                } else if (field as usize) < REGISTER_COUNT {
                    AluSecondOperandInfo::Register { register: field }
                } else {
                    return Err(EmulatorError::InvalidRegisterOperand { field });
                };

                Self::DataProcessing {
                    alu_instruction,
                    set_conditions: op_code.get_bit(20),
                    rn,
                    destination: rd,
                    op2,
                }
            }
        })
    }
}

impl ArmModeInstruction {
    #[must_use]
    pub const fn kind(&self) -> ArmModeInstructionKind {
        match self {
            Self::DataProcessing { .. } => ArmModeInstructionKind::DataProcessing,
            Self::Multiply { .. } => ArmModeInstructionKind::Multiply,
            Self::Load { .. } => ArmModeInstructionKind::Load,
            Self::Store { .. } => ArmModeInstructionKind::Store,
            Self::Branch { .. } => ArmModeInstructionKind::Branch,
            Self::BranchAndExchange { .. } => ArmModeInstructionKind::BranchAndExchange,
            Self::SoftwareInterrupt { .. } => ArmModeInstructionKind::SoftwareInterrupt,
        }
    }

    #[must_use]
    pub fn disassembler(&self, condition: Condition) -> String {
        match self {
            Self::DataProcessing {
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
            } => {
                // CMP always sets flags, the S suffix is implied.
                let set_string = if *set_conditions && alu_instruction.writes_result() {
                    "S"
                } else {
                    ""
                };
                if !alu_instruction.writes_result() {
                    format!("{alu_instruction}{condition} R{rn}, {op2}")
                } else if alu_instruction.uses_rn() {
                    format!("{alu_instruction}{condition}{set_string} R{destination}, R{rn}, {op2}")
                } else {
                    format!("{alu_instruction}{condition}{set_string} R{destination}, {op2}")
                }
            }
            Self::Multiply { rd, rs, rm } => format!("MUL{condition} R{rd}, R{rm}, R{rs}"),
            Self::Load { rd, base_register } => format!("LDR{condition} R{rd}, [R{base_register}]"),
            Self::Store { rd, base_register } => format!("STR{condition} R{rd}, [R{base_register}]"),
            Self::Branch { link, offset } => {
                let link = if *link { "L" } else { "" };
                format!("B{link}{condition} #{offset:+}")
            }
            Self::BranchAndExchange { register } => format!("BX{condition} R{register}"),
            Self::SoftwareInterrupt { comment } => format!("SWI{condition} #0x{comment:X}"),
        }
    }
}

/// A fully decoded word: condition, instruction and the raw value.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct ArmModeOpcode {
    pub condition: Condition,
    pub instruction: ArmModeInstruction,
    pub raw: u32,
}

impl ArmModeOpcode {
    /// Decodes the instruction part of `raw`, the condition being already known.
    pub fn with_condition(raw: u32, condition: Condition) -> Result<Self, EmulatorError> {
        Ok(Self {
            condition,
            instruction: ArmModeInstruction::try_from(raw)?,
            raw,
        })
    }
}

impl TryFrom<u32> for ArmModeOpcode {
    type Error = EmulatorError;

    fn try_from(op_code: u32) -> Result<Self, Self::Error> {
        let condition = Condition::try_from(extract(op_code, 31, 28))?;
        Self::with_condition(op_code, condition)
    }
}

impl Display for ArmModeOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.instruction.disassembler(self.condition))
    }
}
