use std::path::PathBuf;

use clap::Parser;

const DEFAULT_MAX_STEPS: u64 = 1_000_000;
const DEFAULT_MEMORY_KIB: usize = 512;

#[derive(Parser, Debug)]
#[command(
    name = "armlet",
    version,
    about = "Runs ARM ELF images on a reduced ARM7 instruction-set emulator."
)]
pub struct Args {
    /// ELF images to run. A directory runs every `*.elf` inside it, in name order.
    #[arg(required = true, value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Stop each image after this many instructions (0 means no limit)
    #[arg(long, value_name = "STEPS", default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Emulated memory size in KiB
    #[arg(long, value_name = "KIB", default_value_t = DEFAULT_MEMORY_KIB)]
    pub memory_kib: usize,

    /// Fail the image unless r0 holds this value when it halts
    #[arg(long, value_name = "VALUE", value_parser = parse_word)]
    pub expect_r0: Option<u32>,

    /// Print the final state of each image as JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    /// Write logs to a timestamped file in the temp directory instead of stdout
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub log_file: bool,
}

impl Args {
    pub const fn step_limit(&self) -> Option<u64> {
        match self.max_steps {
            0 => None,
            max => Some(max),
        }
    }

    /// Memory size in bytes. Addresses are 32 bits wide, so 4 GiB is the ceiling.
    pub fn memory_size(&self) -> anyhow::Result<usize> {
        self.memory_kib
            .checked_mul(1024)
            .filter(|size| u64::try_from(*size).is_ok_and(|size| size <= 1 << 32))
            .ok_or_else(|| anyhow::anyhow!("--memory-kib {} is too large", self.memory_kib))
    }
}

/// Accepts decimal or `0x` prefixed hexadecimal.
fn parse_word(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid value `{value}`: {e}"))
}
