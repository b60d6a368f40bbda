mod chip8;
mod config;
mod display;
mod execute;
mod font;
mod keypad;
mod memory;
mod opcode;
mod rom;
mod runner;
mod stack;
mod timers;
mod types;

pub use chip8::*;
pub use config::*;
pub use display::*;
pub use font::*;
pub use keypad::*;
pub use memory::*;
pub use opcode::*;
pub use rom::*;
pub use runner::*;
pub use stack::*;
pub use timers::*;
pub use types::*;
