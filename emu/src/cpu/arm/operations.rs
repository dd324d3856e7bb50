use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{AluSecondOperandInfo, ArmModeAluInstruction};
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::error::EmulatorError;

pub const SIZE_OF_INSTRUCTION: u32 = 4;

/// Offset between the executing instruction and the base of a branch target.
pub const BRANCH_PREFETCH_OFFSET: u32 = 8;

// Every handler receives the address of the executing instruction and returns the
// address of the next one. Handlers validate memory accesses before mutating state.
impl Arm7tdmi {
    pub(crate) fn data_processing(
        &mut self,
        pc: u32,
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    ) -> u32 {
        let op1 = self.registers.register_at(rn as usize);
        let op2 = match op2 {
            AluSecondOperandInfo::Immediate { value } => value,
            AluSecondOperandInfo::Register { register } => {
                self.registers.register_at(register as usize)
            }
        };

        let result = alu_instruction.compute(op1, op2);

        if set_conditions {
            let mut cpsr = self.registers.cpsr();
            cpsr.set_result_flags(result);
            self.registers.set_cpsr(cpsr);
        }

        if alu_instruction.writes_result() {
            // Writing R15 here has no visible effect: the step stores the next pc afterwards.
            self.registers
                .set_register_at(destination as usize, result);
        }

        pc.wrapping_add(SIZE_OF_INSTRUCTION)
    }

    pub(crate) fn multiply(&mut self, pc: u32, rd: u32, rs: u32, rm: u32) -> u32 {
        let rs_operand_value = self.registers.register_at(rs as usize);
        let rm_operand_value = self.registers.register_at(rm as usize);

        self.registers.set_register_at(
            rd as usize,
            rs_operand_value.wrapping_mul(rm_operand_value),
        );

        pc.wrapping_add(SIZE_OF_INSTRUCTION)
    }

    pub(crate) fn load(&mut self, pc: u32, rd: u32, base_register: u32) -> Result<u32, EmulatorError> {
        let address = self.registers.register_at(base_register as usize);
        let value = self.memory.read_word(address)?;

        self.registers.set_register_at(rd as usize, value);

        Ok(pc.wrapping_add(SIZE_OF_INSTRUCTION))
    }

    /// Only the low byte of Rd reaches memory.
    pub(crate) fn store(&mut self, pc: u32, rd: u32, base_register: u32) -> Result<u32, EmulatorError> {
        let address = self.registers.register_at(base_register as usize);
        let value = self.registers.register_at(rd as usize);

        self.memory.write_at(address, value.get_byte(0))?;

        Ok(pc.wrapping_add(SIZE_OF_INSTRUCTION))
    }

    /// B and BL behave the same: no return address is written to r14.
    pub(crate) const fn branch(pc: u32, offset: i32) -> u32 {
        pc.wrapping_add_signed(offset)
            .wrapping_add(BRANCH_PREFETCH_OFFSET)
    }

    /// Only ARM state exists, so the Thumb bit and bit 1 of the target are dropped.
    pub(crate) fn branch_and_exchange(&self, register: u32) -> u32 {
        let mut target = self.registers.register_at(register as usize);
        target.set_bit_off(0);
        target.set_bit_off(1);
        target
    }
}
