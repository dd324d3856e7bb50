mod config;
mod elf;
mod logging;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};

use emu::cpu::registers::{REG_CPSR, REG_LR, REG_PROGRAM_COUNTER, Registers};
use emu::{Arm7tdmi, HaltReason, RunExit};

use crate::config::Args;
use crate::elf::LoadableImage;
use crate::logging::LogKind;

/// How a single image ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Outcome {
    Halted { reason: HaltReason },
    StepLimitReached,
    Fault { pc: u32, error: String },
}

#[derive(Debug, Serialize)]
struct ImageReport {
    image: PathBuf,
    steps: u64,
    outcome: Outcome,
    registers: Registers,
    passed: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_kind = if args.log_file {
        LogKind::File
    } else {
        LogKind::Console
    };
    let _guard = logging::init(log_kind)?;

    let memory_size = args.memory_size()?;
    let images = collect_images(&args.images)?;
    if images.is_empty() {
        bail!("no ELF image found");
    }

    let mut failures = 0;
    for path in &images {
        match run_image(path, &args, memory_size) {
            Ok(report) => {
                if !report.passed {
                    failures += 1;
                }
                if args.json {
                    println!("{}", serde_json::to_string(&report)?);
                } else {
                    print!("{}", render_report(&report));
                }
            }
            Err(e) => {
                error!(image = %path.display(), "{e:#}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} images failed", images.len());
    }
    info!(images = images.len(), "all images passed");
    Ok(())
}

/// Expands directories into their `*.elf` files, sorted by name. Plain files are kept as given.
fn collect_images(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = fs::read_dir(path)
                .with_context(|| format!("failed to read directory {}", path.display()))?
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("failed to list directory {}", path.display()))?;
            found.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "elf"));
            found.sort();
            if found.is_empty() {
                warn!(directory = %path.display(), "no *.elf file");
            }
            images.extend(found);
        } else {
            images.push(path.clone());
        }
    }
    Ok(images)
}

/// Runs one image on a fresh emulator.
fn run_image(path: &Path, args: &Args, memory_size: usize) -> anyhow::Result<ImageReport> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let image = LoadableImage::parse(&bytes)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut cpu = Arm7tdmi::with_memory_size(memory_size);
    image.load_into(&mut cpu)?;
    info!(
        image = %path.display(),
        entry = format_args!("{:#010X}", image.entry),
        segments = image.segments.len(),
        "running"
    );

    let (steps, outcome) = match cpu.run(args.step_limit()) {
        Ok(summary) => match summary.exit {
            RunExit::Halted(reason) => (summary.steps, Outcome::Halted { reason }),
            RunExit::StepLimitReached => {
                warn!(image = %path.display(), steps = summary.steps, "step limit reached");
                (summary.steps, Outcome::StepLimitReached)
            }
        },
        Err(fault) => (
            fault.steps,
            Outcome::Fault {
                pc: fault.pc,
                error: fault.source.to_string(),
            },
        ),
    };

    let registers = *cpu.registers();
    let passed = matches!(outcome, Outcome::Halted { .. })
        && args
            .expect_r0
            .is_none_or(|expected| registers.register_at(0) == expected);

    if let Some(expected) = args
        .expect_r0
        .filter(|expected| registers.register_at(0) != *expected)
    {
        warn!(
            image = %path.display(),
            r0 = format_args!("{:#010X}", registers.register_at(0)),
            expected = format_args!("{expected:#010X}"),
            "unexpected r0"
        );
    }

    Ok(ImageReport {
        image: path.to_path_buf(),
        steps,
        outcome,
        registers,
        passed,
    })
}

fn render_report(report: &ImageReport) -> String {
    let mut out = String::new();

    let outcome = match &report.outcome {
        Outcome::Halted {
            reason: HaltReason::ZeroInstruction,
        } => "halted on zero instruction".to_owned(),
        Outcome::Halted {
            reason: HaltReason::SoftwareInterrupt { comment },
        } => format!("halted on SWI #0x{comment:X}"),
        Outcome::StepLimitReached => "step limit reached".to_owned(),
        Outcome::Fault { pc, error } => format!("fault at {pc:#010X}: {error}"),
    };
    let status = if report.passed { "ok" } else { "FAILED" };
    let _ = writeln!(
        out,
        "{}: {outcome} after {} steps [{status}]",
        report.image.display(),
        report.steps
    );

    let registers = &report.registers;
    for reg in 0..REG_CPSR {
        let name = match reg {
            REG_LR => "lr".to_owned(),
            REG_PROGRAM_COUNTER => "pc".to_owned(),
            reg => format!("r{reg}"),
        };
        let _ = write!(out, "  {name:>3} = {:#010X}", registers.register_at(reg));
        if reg % 4 == 3 {
            out.push('\n');
        }
    }

    let cpsr = registers.cpsr();
    let flag = |on: bool, name: char| if on { name } else { '-' };
    let _ = writeln!(
        out,
        "  cpsr = {:#010X} [{}{}{}{}]",
        registers.register_at(REG_CPSR),
        flag(cpsr.sign_flag(), 'N'),
        flag(cpsr.zero_flag(), 'Z'),
        flag(cpsr.carry_flag(), 'C'),
        flag(cpsr.overflow_flag(), 'V'),
    );

    out
}
