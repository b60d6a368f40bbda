use super::{DISPLAY_X, DISPLAY_Y, Display};

/// 64x32 monochrome framebuffer.
pub struct Framebuffer {
    pixels: Display<bool>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            pixels: [[false; DISPLAY_X]; DISPLAY_Y],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_X]; DISPLAY_Y];
    }

    /// XORs a sprite onto the screen, one byte per row, most significant bit leftmost.
    ///
    /// The origin wraps around the screen, but the sprite itself is clipped at the
    /// right and bottom edges. Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let x_pos = x as usize % DISPLAY_X;
        let y_pos = y as usize % DISPLAY_Y;

        // Don't draw out of bounds
        let row_count = std::cmp::min(rows.len(), DISPLAY_Y - y_pos);
        let col_count = std::cmp::min(8, DISPLAY_X - x_pos);

        let mut any_erased = false;
        for (row, sprite_byte) in rows.iter().take(row_count).enumerate() {
            for col in 0..col_count {
                if (sprite_byte & (0x80 >> col)) == 0 {
                    continue;
                }

                let pixel = &mut self.pixels[y_pos + row][x_pos + col];
                if *pixel {
                    any_erased = true;
                }
                *pixel ^= true;
            }
        }

        any_erased
    }

    /// Get the state of a pixel (true = on, false = off).
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.pixels[y][x]
    }

    pub fn pixels(&self) -> &Display<bool> {
        &self.pixels
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
