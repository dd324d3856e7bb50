#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

pub mod cpu;
pub mod error;
pub mod memory;

pub use bitwise::extract;
pub use cpu::arm7tdmi::{Arm7tdmi, HaltReason, RunExit, RunSummary, StepOutcome};
pub use error::{EmulatorError, Fault};
