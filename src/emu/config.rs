use super::DEFAULT_STACK_CAPACITY;

/// Points where historical interpreters disagree on instruction behavior.
///
/// The defaults follow the common modern interpretation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8xy6 / 8xyE shift Vy into Vx instead of shifting Vx in place.
    pub shift_uses_vy: bool,
    /// Fx55 / Fx65 leave I pointing past the last register transferred.
    pub load_store_increments_index: bool,
    /// 8xy1 / 8xy2 / 8xy3 reset VF to 0.
    pub logic_resets_vf: bool,
}

/// What to do when an instruction doesn't decode to anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Treat as a no-op without telling anyone.
    Ignore,
    /// Treat as a no-op and log a warning.
    #[default]
    Warn,
    /// Halt the machine with `Chip8Error::UnknownOpcode`.
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chip8Config {
    pub quirks: Quirks,
    pub stack_capacity: usize,
    pub unknown_opcode_policy: UnknownOpcodePolicy,
    /// Seed for Cxnn. `None` seeds once from the operating system.
    pub rng_seed: Option<u64>,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Self {
            quirks: Quirks::default(),
            stack_capacity: DEFAULT_STACK_CAPACITY,
            unknown_opcode_policy: UnknownOpcodePolicy::default(),
            rng_seed: None,
        }
    }
}
