pub mod emu;
mod nibble;

pub use emu::{
    Chip8, Chip8Config, Chip8Error, Chip8Result, Chip8Runner, ConfigError, DISPLAY_X, DISPLAY_Y,
    Display, LoadError, Opcode, OpcodeALU, Quirks, RunnerConfig, RunnerStatus,
    UnknownOpcodePolicy, read_rom,
};
pub use nibble::u4;
