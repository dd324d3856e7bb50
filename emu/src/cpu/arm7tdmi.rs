use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::bitwise::extract;
use crate::cpu::arm::instructions::{ArmModeInstruction, ArmModeOpcode};
use crate::cpu::arm::operations::SIZE_OF_INSTRUCTION;
use crate::cpu::condition::Condition;
use crate::cpu::psr::Psr;
use crate::cpu::registers::Registers;
use crate::error::{EmulatorError, Fault};
use crate::memory::internal_memory::{InternalMemory, MEMORY_SIZE};

/// Why the emulated program stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// The fetched word was `0x00000000`.
    ZeroInstruction,
    /// A `SWI` instruction was executed.
    SoftwareInterrupt { comment: u32 },
}

/// Result of a successful [`Arm7tdmi::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halt(HaltReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunExit {
    Halted(HaltReason),
    StepLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Instructions that completed with [`StepOutcome::Continue`], skipped ones included.
    pub steps: u64,
    pub exit: RunExit,
}

/// One emulated CPU with its own memory. Independent instances share nothing.
#[derive(Debug)]
pub struct Arm7tdmi {
    pub(crate) memory: InternalMemory,
    pub(crate) registers: Registers,
}

impl Default for Arm7tdmi {
    fn default() -> Self {
        Self::with_memory_size(MEMORY_SIZE)
    }
}

impl Arm7tdmi {
    #[must_use]
    pub fn with_memory_size(capacity: usize) -> Self {
        Self {
            memory: InternalMemory::new(capacity),
            registers: Registers::default(),
        }
    }

    /// Zero-fills memory and every register.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers = Registers::default();
    }

    /// Copies a loadable segment at `address`. Nothing is written if it does not fit.
    pub fn load_segment(&mut self, address: u32, data: &[u8]) -> Result<(), EmulatorError> {
        self.memory.write(address, data)?;
        debug!(
            address = format_args!("{address:#010X}"),
            len = data.len(),
            "segment loaded"
        );
        Ok(())
    }

    pub const fn set_entry_point(&mut self, address: u32) {
        self.registers.set_program_counter(address);
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        self.registers.cpsr()
    }

    #[must_use]
    pub const fn memory(&self) -> &InternalMemory {
        &self.memory
    }

    pub fn memory_window(&self, address: u32, length: usize) -> Result<&[u8], EmulatorError> {
        self.memory.read(address, length)
    }

    fn fetch_arm(&self, pc: u32) -> Result<u32, EmulatorError> {
        self.memory.read_word(pc)
    }

    /// Fetches, decodes and executes the instruction at the program counter.
    ///
    /// On error nothing has been modified, the program counter included.
    pub fn step(&mut self) -> Result<StepOutcome, EmulatorError> {
        let pc = self.registers.program_counter();

        let raw = self.fetch_arm(pc)?;
        if raw == 0 {
            debug!(pc = format_args!("{pc:#010X}"), "zero instruction, halting");
            return Ok(StepOutcome::Halt(HaltReason::ZeroInstruction));
        }

        let condition = Condition::try_from(extract(raw, 31, 28))?;
        if !self.registers.cpsr().can_execute(condition) {
            trace!(
                pc = format_args!("{pc:#010X}"),
                raw = format_args!("{raw:#010X}"),
                ?condition,
                "condition not met"
            );
            self.registers
                .set_program_counter(pc.wrapping_add(SIZE_OF_INSTRUCTION));
            return Ok(StepOutcome::Continue);
        }

        let op_code = ArmModeOpcode::with_condition(raw, condition)?;
        trace!(
            pc = format_args!("{pc:#010X}"),
            raw = format_args!("{raw:#010X}"),
            "{op_code}"
        );

        self.execute_at(pc, &op_code)
    }

    /// Executes an already decoded instruction as if it sat at the current program counter.
    /// The condition is not evaluated.
    pub fn execute_arm(&mut self, op_code: &ArmModeOpcode) -> Result<StepOutcome, EmulatorError> {
        self.execute_at(self.registers.program_counter(), op_code)
    }

    fn execute_at(&mut self, pc: u32, op_code: &ArmModeOpcode) -> Result<StepOutcome, EmulatorError> {
        use ArmModeInstruction::{
            Branch, BranchAndExchange, DataProcessing, Load, Multiply, SoftwareInterrupt, Store,
        };

        let next_pc = match op_code.instruction {
            DataProcessing {
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
            } => self.data_processing(pc, alu_instruction, set_conditions, rn, destination, op2),
            Multiply { rd, rs, rm } => self.multiply(pc, rd, rs, rm),
            Load { rd, base_register } => self.load(pc, rd, base_register)?,
            Store { rd, base_register } => self.store(pc, rd, base_register)?,
            Branch { offset, .. } => Self::branch(pc, offset),
            BranchAndExchange { register } => self.branch_and_exchange(register),
            SoftwareInterrupt { comment } => {
                debug!(
                    pc = format_args!("{pc:#010X}"),
                    comment, "software interrupt, halting"
                );
                return Ok(StepOutcome::Halt(HaltReason::SoftwareInterrupt { comment }));
            }
        };

        self.registers.set_program_counter(next_pc);
        Ok(StepOutcome::Continue)
    }

    /// Steps until the program halts, an instruction faults or `max_steps`
    /// instructions have run. `None` means no limit.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<RunSummary, Fault> {
        let mut steps = 0;
        loop {
            if max_steps.is_some_and(|max| steps >= max) {
                debug!(steps, "step limit reached");
                return Ok(RunSummary {
                    steps,
                    exit: RunExit::StepLimitReached,
                });
            }

            let pc = self.registers.program_counter();
            match self.step() {
                Ok(StepOutcome::Continue) => steps += 1,
                Ok(StepOutcome::Halt(reason)) => {
                    return Ok(RunSummary {
                        steps,
                        exit: RunExit::Halted(reason),
                    });
                }
                Err(source) => {
                    warn!(
                        pc = format_args!("{pc:#010X}"),
                        steps,
                        error = %source,
                        "emulation fault"
                    );
                    return Err(Fault { pc, steps, source });
                }
            }
        }
    }
}
