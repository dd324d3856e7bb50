use std::fmt;
use std::ops::Range;

use crate::error::EmulatorError;

/// Capacity of the reference configuration (512 `KBytes`).
pub const MEMORY_SIZE: usize = 512 * 1024;

/// Zero-initialized linear memory, from 0x00000000 to `capacity - 1`.
///
/// Every access is bounds-checked before anything is read or written, so a
/// rejected access never leaves a partial write behind.
#[derive(Clone, PartialEq, Eq)]
pub struct InternalMemory {
    bytes: Vec<u8>,
}

impl Default for InternalMemory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl fmt::Debug for InternalMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalMemory")
            .field("capacity", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl InternalMemory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Zero-fills the whole memory, keeping its capacity.
    pub fn reset(&mut self) {
        self.bytes.fill(0);
    }

    fn range(&self, address: u32, length: usize) -> Result<Range<usize>, EmulatorError> {
        let out_of_bounds = || EmulatorError::OutOfBoundsAccess {
            address,
            length,
            capacity: self.bytes.len(),
        };

        let start = usize::try_from(address).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(length).ok_or_else(out_of_bounds)?;
        if end > self.bytes.len() {
            return Err(out_of_bounds());
        }

        Ok(start..end)
    }

    /// Returns `length` bytes starting at `address`.
    pub fn read(&self, address: u32, length: usize) -> Result<&[u8], EmulatorError> {
        let range = self.range(address, length)?;
        Ok(&self.bytes[range])
    }

    /// Copies `data` to memory starting at `address`.
    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<(), EmulatorError> {
        let range = self.range(address, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    pub fn read_at(&self, address: u32) -> Result<u8, EmulatorError> {
        Ok(self.read(address, 1)?[0])
    }

    pub fn write_at(&mut self, address: u32, value: u8) -> Result<(), EmulatorError> {
        self.write(address, &[value])
    }

    /// Reads 4 bytes at `address` as a little-endian word. No alignment is required.
    pub fn read_word(&self, address: u32) -> Result<u32, EmulatorError> {
        let b = self.read(address, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_zeroed() {
        let im = InternalMemory::default();

        assert_eq!(im.capacity(), 512 * 1024);
        assert_eq!(im.read(0, 16).unwrap(), &[0; 16]);
        assert_eq!(im.read_word(0x0007_FFFC).unwrap(), 0);
    }

    #[test]
    fn test_write_and_read() {
        let mut im = InternalMemory::default();

        im.write(0x100, &[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(im.read(0x100, 5).unwrap(), &[1, 2, 3, 4, 5]);
        assert_eq!(im.read_at(0x102).unwrap(), 3);
        assert_eq!(im.read_word(0x100).unwrap(), 0x0403_0201);
        assert_eq!(im.read_word(0x101).unwrap(), 0x0504_0302);
    }

    #[test]
    fn test_last_byte() {
        let mut im = InternalMemory::new(0x10);

        im.write_at(0xF, 5).unwrap();

        assert_eq!(im.read_at(0xF).unwrap(), 5);
        assert_eq!(im.read(0xC, 4).unwrap(), &[0, 0, 0, 5]);
    }

    #[test]
    fn rejects_out_of_bounds_read() {
        let im = InternalMemory::new(0x10);

        assert_eq!(
            im.read_word(0xD),
            Err(EmulatorError::OutOfBoundsAccess {
                address: 0xD,
                length: 4,
                capacity: 0x10
            })
        );
        assert!(im.read_at(0x10).is_err());
        assert!(im.read(u32::MAX, 4).is_err());

        // An empty read right at the end is still inside the array.
        assert_eq!(im.read(0x10, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn rejected_write_leaves_memory_untouched() {
        let mut im = InternalMemory::new(0x10);

        let result = im.write(0xE, &[1, 2, 3]);

        assert!(matches!(
            result,
            Err(EmulatorError::OutOfBoundsAccess { address: 0xE, .. })
        ));
        assert_eq!(im.read(0, 0x10).unwrap(), &[0; 0x10]);
    }

    #[test]
    fn reset_clears_content() {
        let mut im = InternalMemory::new(0x20);
        im.write(0, &[0xFF; 0x20]).unwrap();

        im.reset();

        assert_eq!(im.capacity(), 0x20);
        assert_eq!(im.read(0, 0x20).unwrap(), &[0; 0x20]);
    }
}
