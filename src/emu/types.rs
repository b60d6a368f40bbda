use std::path::PathBuf;

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the CHIP-8 display buffer representation
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];

/// Result of a single CPU cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Result {
    /// Continue executing instructions in the current frame.
    Continue,
    /// The display changed. The host may render before continuing
    /// to limit the display update rate to the frame rate.
    Drew,
    /// FX0A is waiting for a key press. The program counter still points at the
    /// instruction, so the next cycle will check the keypad again.
    WaitingForKey,
}

/// Errors raised while placing a program into memory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("Failed to read ROM file {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Machine faults raised while executing instructions.
///
/// Any of these returned from a cycle halts the machine.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("Stack overflow at {address:#05X}: call depth exceeded capacity of {capacity}")]
    StackOverflow { capacity: usize, address: u16 },

    #[error("Stack underflow at {address:#05X}: return with empty call stack")]
    StackUnderflow { address: u16 },

    #[error("Unknown opcode {opcode:#06X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("Machine is halted after a previous fault")]
    Halted,
}

/// Rejected host timing settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CPU rate must be a finite number of Hz in ({min}, {max}], got {cpu_hz}")]
    InvalidCpuHz { cpu_hz: f32, min: f32, max: f32 },
}
