use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};

use super::{
    ADDRESS_MASK, CallStack, Chip8Config, Chip8Error, Chip8Result, Display, Framebuffer, Keypad,
    LoadError, Memory, Opcode, ROM_START_ADDRESS, Timers,
};
use crate::u4;

/// CHIP-8 virtual machine state
pub struct Chip8 {
    /// 4KB memory, font at the bottom and the program from 0x200
    pub(crate) memory: Memory,
    /// Display buffer: 64x32 monochrome pixels
    pub(crate) display: Framebuffer,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u16,
    /// Index register: used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Call stack for subroutine returns
    pub(crate) stack: CallStack,

    pub(crate) timers: Timers,
    pub(crate) keypad: Keypad,

    pub(crate) rng: StdRng,
    pub(crate) config: Chip8Config,
    /// Set once a fault has stopped execution
    pub(crate) halted: bool,
    /// Instructions that already logged a warning
    pub(crate) diagnosed: HashSet<(u16, Opcode)>,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Chip8Config::default())
    }

    pub fn with_config(config: Chip8Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Chip8 {
            memory: Memory::new(),
            display: Framebuffer::new(),
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: CallStack::new(config.stack_capacity),
            timers: Timers::default(),
            keypad: Keypad::default(),
            rng,
            config,
            halted: false,
            diagnosed: HashSet::new(),
        }
    }

    /// Loads a ROM into the program area starting at 0x200.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.memory.load_program(rom)?;
        self.pc = ROM_START_ADDRESS as u16;

        log::debug!("Loaded {} byte program at {:#05X}", rom.len(), self.pc);
        Ok(())
    }

    /// Executes a single CPU cycle (fetch, decode, execute).
    ///
    /// A returned error is fatal: the machine refuses to run any further cycles.
    pub fn execute_cycle(&mut self) -> Result<Chip8Result, Chip8Error> {
        if self.halted {
            return Err(Chip8Error::Halted);
        }

        let address = self.pc;
        let raw = self.memory.read_word(address);
        let opcode = Opcode::decode(raw);
        log::trace!("{address:03X}: {raw:04X}  {opcode}");

        let result = self.execute(address, opcode);
        if let Err(err) = &result {
            log::error!("Halting at {address:#05X}: {err}");
            // Leave PC on the faulting instruction
            self.pc = address;
            self.halted = true;
        }

        result
    }

    /// Updates the delay and sound timers. Should be called at 60Hz.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// Returns true if the sound timer is greater than zero, indicating a beep should be played.
    pub fn should_beep(&self) -> bool {
        self.timers.is_beeping()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad.set(key, pressed);
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn get_display_pixel(&self, y: usize, x: usize) -> bool {
        self.display.pixel(y, x)
    }

    pub fn display(&self) -> &Display<bool> {
        self.display.pixels()
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn stack(&self) -> &[u16] {
        self.stack.frames()
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay()
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound()
    }

    pub fn keypad(&self) -> &[bool; 16] {
        self.keypad.keys()
    }

    pub fn config(&self) -> &Chip8Config {
        &self.config
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// True the first time an instruction at `address` asks to warn, so a
    /// looping program logs each problem once.
    pub(crate) fn first_diagnostic(&mut self, address: u16, opcode: Opcode) -> bool {
        self.diagnosed.insert((address, opcode))
    }

    /// Moves the program counter, keeping it inside the 12-bit address space.
    pub(crate) fn set_pc(&mut self, addr: u16) {
        self.pc = addr & ADDRESS_MASK;
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
