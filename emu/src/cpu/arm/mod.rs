//! # ARM Instruction Set (reduced)
//!
//! Every word carries a condition in bits 31-28; the rest selects one of the
//! supported families:
//!
//! | Family              | Mnemonics                          |
//! |---------------------|------------------------------------|
//! | Data Processing     | AND, EOR, SUB, ADD, CMP, ORR, MOV  |
//! | Multiply            | MUL                                |
//! | Single Data Transfer| LDR (word), STR (low byte)         |
//! | Branch              | B, BL                              |
//! | Branch and Exchange | BX (ARM state only)                |
//! | Software Interrupt  | SWI (halts)                        |
//!
//! Operand2 is never shifted or rotated.
//!
//! ## Submodules
//!
//! - [`instructions`] - Decoding (`TryFrom<u32>`) and disassembly
//! - [`operations`] - Execution
//! - [`alu_instruction`] - ALU ops and operand2

#[allow(clippy::cast_possible_truncation)]
pub mod alu_instruction;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::similar_names)]
pub mod instructions;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::similar_names)]
pub mod operations;
