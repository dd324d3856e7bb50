//! Extraction of the loadable part of an ELF32 image.
//!
//! Only `PT_LOAD` program headers matter: their file bytes are copied at their
//! physical address. Sections, symbols and `p_memsz` padding are ignored since
//! the emulated memory starts zeroed.

use anyhow::{Context, ensure};
use goblin::elf::Elf;
use goblin::elf::header::EM_ARM;
use goblin::elf::program_header::PT_LOAD;

use emu::Arm7tdmi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub address: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadableImage {
    pub entry: u32,
    pub segments: Vec<Segment>,
}

impl LoadableImage {
    pub fn parse(bytes: &[u8]) -> anyhow::Result<Self> {
        let elf = Elf::parse(bytes).context("not a valid ELF image")?;
        ensure!(!elf.is_64, "only 32-bit ELF images are supported");
        ensure!(elf.little_endian, "only little-endian ELF images are supported");
        ensure!(
            elf.header.e_machine == EM_ARM,
            "unexpected machine type {}",
            elf.header.e_machine
        );

        let entry = u32::try_from(elf.entry).context("entry point does not fit in 32 bits")?;

        let mut segments = Vec::new();
        for header in &elf.program_headers {
            if header.p_type != PT_LOAD || header.p_filesz == 0 {
                continue;
            }

            let address = u32::try_from(header.p_paddr)
                .context("segment address does not fit in 32 bits")?;
            let data = usize::try_from(header.p_offset)
                .ok()
                .zip(usize::try_from(header.p_filesz).ok())
                .and_then(|(offset, size)| bytes.get(offset..offset.checked_add(size)?))
                .with_context(|| {
                    format!("segment at {address:#010X} extends past the end of the file")
                })?;

            segments.push(Segment {
                address,
                data: data.to_vec(),
            });
        }

        Ok(Self { entry, segments })
    }

    /// Writes every segment and points pc at the entry.
    pub fn load_into(&self, cpu: &mut Arm7tdmi) -> anyhow::Result<()> {
        for segment in &self.segments {
            cpu.load_segment(segment.address, &segment.data)
                .with_context(|| {
                    format!(
                        "segment at {:#010X} ({} bytes) does not fit in memory",
                        segment.address,
                        segment.data.len()
                    )
                })?;
        }
        cpu.set_entry_point(self.entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu::{HaltReason, RunExit};
    use pretty_assertions::assert_eq;

    const EHSIZE: u32 = 52;
    const PHENTSIZE: u32 = 32;

    struct Header {
        p_type: u32,
        paddr: u32,
        data: Vec<u8>,
    }

    /// Builds an ARM ELF32 executable with one program header per entry,
    /// file contents placed right after the program header table.
    fn build_elf(entry: u32, headers: &[Header]) -> Vec<u8> {
        let phnum = headers.len() as u32;
        let mut out = Vec::new();

        out.extend_from_slice(&[0x7F, b'E', b'L', b'F', 1, 1, 1, 0]);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&2_u16.to_le_bytes()); // ET_EXEC
        out.extend_from_slice(&40_u16.to_le_bytes()); // EM_ARM
        out.extend_from_slice(&1_u32.to_le_bytes());
        out.extend_from_slice(&entry.to_le_bytes());
        out.extend_from_slice(&EHSIZE.to_le_bytes()); // e_phoff
        out.extend_from_slice(&0_u32.to_le_bytes()); // e_shoff
        out.extend_from_slice(&0x0500_0000_u32.to_le_bytes());
        out.extend_from_slice(&(EHSIZE as u16).to_le_bytes());
        out.extend_from_slice(&(PHENTSIZE as u16).to_le_bytes());
        out.extend_from_slice(&(phnum as u16).to_le_bytes());
        out.extend_from_slice(&40_u16.to_le_bytes());
        out.extend_from_slice(&0_u16.to_le_bytes());
        out.extend_from_slice(&0_u16.to_le_bytes());
        assert_eq!(out.len(), EHSIZE as usize);

        let mut offset = EHSIZE + PHENTSIZE * phnum;
        for header in headers {
            let size = header.data.len() as u32;
            for field in [
                header.p_type,
                offset,
                header.paddr,
                header.paddr,
                size,
                size,
                5,
                4,
            ] {
                out.extend_from_slice(&field.to_le_bytes());
            }
            offset += size;
        }

        for header in headers {
            out.extend_from_slice(&header.data);
        }
        out
    }

    fn words(program: &[u32]) -> Vec<u8> {
        program.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn extracts_load_segments() {
        let bytes = build_elf(
            0x100,
            &[
                Header {
                    p_type: PT_LOAD,
                    paddr: 0x100,
                    data: words(&[0xE3A0_0001, 0xEF00_0000]),
                },
                // PT_NOTE
                Header {
                    p_type: 4,
                    paddr: 0x400,
                    data: vec![0xFF; 4],
                },
                Header {
                    p_type: PT_LOAD,
                    paddr: 0x800,
                    data: vec![1, 2, 3],
                },
            ],
        );

        let image = LoadableImage::parse(&bytes).unwrap();

        assert_eq!(
            image,
            LoadableImage {
                entry: 0x100,
                segments: vec![
                    Segment {
                        address: 0x100,
                        data: words(&[0xE3A0_0001, 0xEF00_0000]),
                    },
                    Segment {
                        address: 0x800,
                        data: vec![1, 2, 3],
                    },
                ],
            }
        );
    }

    #[test]
    fn loaded_image_runs() {
        let bytes = build_elf(
            0x100,
            &[Header {
                p_type: PT_LOAD,
                paddr: 0x100,
                data: words(&[0xE3A0_0001, 0xEF00_0000]),
            }],
        );
        let image = LoadableImage::parse(&bytes).unwrap();
        let mut cpu = Arm7tdmi::default();

        image.load_into(&mut cpu).unwrap();
        let summary = cpu.run(Some(10)).unwrap();

        assert_eq!(
            summary.exit,
            RunExit::Halted(HaltReason::SoftwareInterrupt { comment: 0 })
        );
        assert_eq!(cpu.registers().register_at(0), 1);
    }

    #[test]
    fn truncated_segment_is_rejected() {
        let mut bytes = build_elf(
            0,
            &[Header {
                p_type: PT_LOAD,
                paddr: 0,
                data: vec![0; 8],
            }],
        );
        bytes.truncate(bytes.len() - 4);

        assert!(LoadableImage::parse(&bytes).is_err());
    }

    #[test]
    fn segment_past_memory_is_rejected() {
        let bytes = build_elf(
            0,
            &[Header {
                p_type: PT_LOAD,
                paddr: 0x10,
                data: vec![0; 8],
            }],
        );
        let image = LoadableImage::parse(&bytes).unwrap();
        let mut cpu = Arm7tdmi::with_memory_size(0x10);

        assert!(image.load_into(&mut cpu).is_err());
    }

    #[test]
    fn garbage_is_not_an_image() {
        assert!(LoadableImage::parse(b"definitely not an elf file").is_err());
    }
}
