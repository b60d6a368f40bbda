pub const TIMER_HZ: f32 = 60.0;

/// Delay and sound timers. Both count down by one per 60Hz tick and stop at zero.
#[derive(Default)]
pub struct Timers {
    pub(crate) delay: u8,
    pub(crate) sound: u8,
}

impl Timers {
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Sound plays for as long as the sound timer is non-zero.
    pub fn is_beeping(&self) -> bool {
        self.sound > 0
    }
}
