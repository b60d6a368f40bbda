use super::{FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, LoadError};

pub const MEMORY_SIZE: usize = 4096;
pub const ROM_START_ADDRESS: usize = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_START_ADDRESS;

/// Mask applied to every computed address: the address space is 12 bits wide.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// 4KB of byte-addressable memory.
///
/// Addresses are wrapped to 12 bits on every access, so no operation can
/// reach outside `0x000..=0xFFF`. Everything below `ROM_START_ADDRESS`,
/// including the font, is read-only once the machine is built.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the font set loaded at `FONT_START_ADDRESS`.
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        Self { bytes }
    }

    /// Copies `rom` to the program area, zeroing whatever program space it doesn't cover.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }

        let program_area = &mut self.bytes[ROM_START_ADDRESS..];
        program_area.fill(0);
        program_area[..rom.len()].copy_from_slice(rom);

        Ok(())
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[usize::from(addr & ADDRESS_MASK)]
    }

    /// Stores `value` unless `addr` lands in the interpreter area. Returns whether it was stored.
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        let addr = usize::from(addr & ADDRESS_MASK);
        if addr < ROM_START_ADDRESS {
            return false;
        }

        self.bytes[addr] = value;
        true
    }

    /// Reads the big-endian instruction word at `addr` and `addr + 1`.
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_loaded_at_start() {
        let memory = Memory::new();
        assert_eq!(&memory.as_slice()[..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(memory.read(0x4F), 0x80);
        assert_eq!(memory.read(0x50), 0);
    }

    #[test]
    fn program_is_copied_to_0x200() {
        let mut memory = Memory::new();
        memory.load_program(&[0x12, 0x34]).unwrap();
        assert_eq!(memory.read_word(0x200), 0x1234);
        assert_eq!(memory.read(0x202), 0);
    }

    #[test]
    fn program_of_max_size_fits() {
        let mut memory = Memory::new();
        let rom = vec![0xAA; MAX_ROM_SIZE];
        memory.load_program(&rom).unwrap();
        assert_eq!(memory.read(0xFFF), 0xAA);
    }

    #[test]
    fn oversized_program_is_rejected_without_writing() {
        let mut memory = Memory::new();
        let rom = vec![0xAA; MAX_ROM_SIZE + 1];
        let err = memory.load_program(&rom).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ProgramTooLarge {
                size: 3585,
                max_size: 3584
            }
        ));
        assert_eq!(memory.read(0x200), 0);
    }

    #[test]
    fn addresses_wrap_to_12_bits() {
        let mut memory = Memory::new();
        assert!(memory.write(0x1234, 0x56));
        assert_eq!(memory.read(0x234), 0x56);

        assert!(memory.write(0xFFF, 0xAB));
        assert_eq!(memory.read_word(0xFFF), 0xABF0);
    }

    #[test]
    fn interpreter_area_is_read_only() {
        let mut memory = Memory::new();
        assert!(!memory.write(0x000, 0x12));
        assert!(!memory.write(0x1FF, 0x12));
        // 0x1000 wraps to 0x000
        assert!(!memory.write(0x1000, 0x12));
        assert_eq!(&memory.as_slice()[..FONT.len()], &FONT);
        assert_eq!(memory.read(0x1FF), 0);

        assert!(memory.write(0x200, 0x12));
    }
}
