use super::{Chip8, Chip8Error, Chip8Result, ConfigError, TIMER_HZ};
use crate::u4;

pub const DEFAULT_CPU_HZ: f32 = 700.0;
/// Upper bound on the instruction rate, so a single update can't run unbounded work.
pub const MAX_CPU_HZ: f32 = 100_000.0;

const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerConfig {
    /// Instructions executed per second of emulated time.
    cpu_hz: f32,
}

impl RunnerConfig {
    /// Accepts finite rates in `(0, MAX_CPU_HZ]`.
    pub fn new(cpu_hz: f32) -> Result<Self, ConfigError> {
        if !(cpu_hz.is_finite() && cpu_hz > 0.0 && cpu_hz <= MAX_CPU_HZ) {
            return Err(ConfigError::InvalidCpuHz {
                cpu_hz,
                min: 0.0,
                max: MAX_CPU_HZ,
            });
        }

        Ok(Self { cpu_hz })
    }

    pub fn cpu_hz(&self) -> f32 {
        self.cpu_hz
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
        }
    }
}

/// What the host should do after an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerStatus {
    /// The program is blocked on Fx0A.
    pub waiting_for_key: bool,
    /// The sound timer is running.
    pub beeping: bool,
}

/// High-level emulator runner that manages timing internally.
///
/// CPU cycles and 60Hz timer ticks are paced by separate accumulators,
/// so the instruction rate never changes how fast the timers count down.
pub struct Chip8Runner {
    chip8: Chip8,
    cpu_time_step: f32,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self::with_config(chip8, RunnerConfig::default())
    }

    pub fn with_config(chip8: Chip8, config: RunnerConfig) -> Self {
        Self {
            chip8,
            cpu_time_step: 1.0 / config.cpu_hz,
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Update emulator by delta time, handles both CPU and timer cycles.
    ///
    /// Runs as many CPU cycles and timer updates as needed based on the elapsed time `dt`.
    /// Returns early if a frame has to be rendered before the next CPU cycle.
    pub fn update(&mut self, dt: f32) -> Result<RunnerStatus, Chip8Error> {
        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= TIMER_TIME_STEP {
            self.timer_dt_accumulator -= TIMER_TIME_STEP;
            self.chip8.tick_timers();
        }

        let mut waiting_for_key = false;
        while self.cpu_dt_accumulator >= self.cpu_time_step {
            self.cpu_dt_accumulator -= self.cpu_time_step;

            match self.chip8.execute_cycle()? {
                Chip8Result::Continue => {}
                result @ (Chip8Result::Drew | Chip8Result::WaitingForKey) => {
                    // If we need to wait for the next frame we stop executing cycles.
                    // We clear the accumulator to avoid "catching up" in the next frame.
                    self.cpu_dt_accumulator = 0.0;
                    waiting_for_key = result == Chip8Result::WaitingForKey;
                    break;
                }
            }
        }

        Ok(RunnerStatus {
            waiting_for_key,
            beeping: self.chip8.should_beep(),
        })
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.chip8.set_key(key, pressed)
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }
}
