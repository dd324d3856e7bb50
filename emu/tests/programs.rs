use emu::cpu::registers::REG_LR;
use emu::{Arm7tdmi, EmulatorError, HaltReason, RunExit, RunSummary};
use pretty_assertions::assert_eq;

fn load(program: &[u32]) -> Arm7tdmi {
    let mut cpu = Arm7tdmi::default();
    let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    cpu.load_segment(0, &bytes).unwrap();
    cpu.set_entry_point(0);
    cpu
}

#[test]
fn countdown_loop() {
    let mut cpu = load(&[
        0xE3A0_0005, // MOV R0, #5
        0xE3A0_1000, // MOV R1, #0
        0xE081_1000, // loop: ADD R1, R1, R0
        0xE250_0001, // SUBS R0, R0, #1
        0x1AFF_FFFC, // BNE loop
        0xEF00_0000, // SWI #0
    ]);

    let summary = cpu.run(Some(1_000)).unwrap();

    assert_eq!(
        summary,
        RunSummary {
            steps: 17,
            exit: RunExit::Halted(HaltReason::SoftwareInterrupt { comment: 0 }),
        }
    );
    assert_eq!(cpu.registers().register_at(0), 0);
    assert_eq!(cpu.registers().register_at(1), 15);
    assert!(cpu.cpsr().zero_flag());
    assert_eq!(cpu.registers().program_counter(), 0x14);
}

#[test]
fn call_and_return() {
    let mut cpu = load(&[
        0xE3A0_0003, // MOV R0, #3
        0xE3A0_E00C, // MOV LR, #0xC
        0xEB00_0001, // BL double
        0xE1A0_2000, // MOV R2, R0
        0xEF00_0001, // SWI #1
        0xE080_0000, // double: ADD R0, R0, R0
        0xE12F_FF1E, // BX LR
    ]);

    let summary = cpu.run(None).unwrap();

    assert_eq!(summary.steps, 6);
    assert_eq!(
        summary.exit,
        RunExit::Halted(HaltReason::SoftwareInterrupt { comment: 1 })
    );
    assert_eq!(cpu.registers().register_at(0), 6);
    assert_eq!(cpu.registers().register_at(2), 6);
    assert_eq!(cpu.registers().register_at(REG_LR), 0xC);
}

#[test]
fn store_then_load() {
    let mut cpu = load(&[
        0xE3A0_11AB, // MOV R1, #0x1AB
        0xE3A0_2800, // MOV R2, #0x800
        0xE582_1000, // STR R1, [R2]
        0xE592_3000, // LDR R3, [R2]
        0x0000_0000,
    ]);

    let summary = cpu.run(None).unwrap();

    assert_eq!(summary.exit, RunExit::Halted(HaltReason::ZeroInstruction));
    assert_eq!(cpu.registers().register_at(3), 0xAB);
    assert_eq!(cpu.memory_window(0x800, 4).unwrap(), &[0xAB, 0, 0, 0]);
}

#[test]
fn compare_selects_one_branch() {
    let mut cpu = load(&[
        0xE3A0_0007, // MOV R0, #7
        0xE350_0007, // CMP R0, #7
        0x03A0_1001, // MOVEQ R1, #1
        0x13A0_2001, // MOVNE R2, #1
        0x0000_0000,
    ]);

    let summary = cpu.run(None).unwrap();

    assert_eq!(summary.steps, 4);
    assert_eq!(cpu.registers().register_at(1), 1);
    assert_eq!(cpu.registers().register_at(2), 0);
}

#[test]
fn running_off_the_end_of_memory_faults() {
    let mut cpu = Arm7tdmi::with_memory_size(8);
    cpu.load_segment(0, &[0x01, 0x00, 0xA0, 0xE3, 0x02, 0x00, 0xA0, 0xE3])
        .unwrap();

    let fault = cpu.run(None).unwrap_err();

    assert_eq!(fault.pc, 8);
    assert_eq!(fault.steps, 2);
    assert_eq!(
        fault.source,
        EmulatorError::OutOfBoundsAccess {
            address: 8,
            length: 4,
            capacity: 8,
        }
    );
    assert_eq!(cpu.registers().register_at(0), 2);
}
