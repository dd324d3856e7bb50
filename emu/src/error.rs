use thiserror::Error;

/// Fatal conditions raised while executing a single instruction.
///
/// A step that returns one of these has not modified registers or memory.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorError {
    /// Condition field holds the reserved `0b1111` value.
    #[error("invalid condition code {code:#06b}")]
    InvalidConditionCode { code: u32 },

    /// Data processing opcode outside of AND, EOR, SUB, ADD, CMP, ORR and MOV.
    #[error("unsupported data processing opcode {opcode:#06b}")]
    UnsupportedOpcode { opcode: u32 },

    /// `address + length` does not fit in the backing memory.
    #[error(
        "out of bounds memory access at {address:#010X} (length {length}, capacity {capacity:#X})"
    )]
    OutOfBoundsAccess {
        address: u32,
        length: usize,
        capacity: usize,
    },

    /// Register-form operand2 field that does not name one of the 17 registers.
    /// Shifted register operands are not modelled.
    #[error("operand2 field {field:#05X} does not name a register")]
    InvalidRegisterOperand { field: u32 },
}

/// An [`EmulatorError`] raised by [`Arm7tdmi::run`](crate::cpu::arm7tdmi::Arm7tdmi::run),
/// along with where it happened.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("emulation fault at pc {pc:#010X} after {steps} steps")]
pub struct Fault {
    /// Address of the instruction that failed. The pc register still holds it.
    pub pc: u32,

    /// Steps completed before the failing one.
    pub steps: u64,

    #[source]
    pub source: EmulatorError,
}
