use crate::u4;

/// The 16-key hex keypad, `true` meaning pressed.
#[derive(Default)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn set(&mut self, key: u4, pressed: bool) {
        self.keys[key] = pressed;
    }

    pub fn is_pressed(&self, key: u4) -> bool {
        self.keys[key]
    }

    /// Lowest-numbered key currently held down.
    pub fn first_pressed(&self) -> Option<u4> {
        self.keys
            .iter()
            .position(|&pressed| pressed)
            .map(|key| u4::new(key as u8))
    }

    pub fn keys(&self) -> &[bool; 16] {
        &self.keys
    }
}
