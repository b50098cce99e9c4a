//! Page-packed pixel buffer matching the SSD1306 memory layout
//!
//! Pixels are packed vertically: each byte covers an 8-pixel column slice of
//! one page, bit 0 at the top. Byte `page * 128 + x` holds pixels
//! `(x, page*8)` through `(x, page*8 + 7)`.

use crate::ssd1306::{FRAMEBUFFER_LEN, HEIGHT, WIDTH};

/// An owned full-frame buffer, 1024 bytes, all pixels initially off.
pub struct Framebuffer {
    buf: [u8; FRAMEBUFFER_LEN],
}

impl Framebuffer {
    /// A blank frame.
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAMEBUFFER_LEN],
        }
    }

    /// Switches every pixel off.
    pub fn clear(&mut self) {
        self.buf = [0; FRAMEBUFFER_LEN];
    }

    /// Sets or clears one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }

        let index = (y / 8) * WIDTH + x;
        let mask = 1 << (y % 8);
        if on {
            self.buf[index] |= mask;
        } else {
            self.buf[index] &= !mask;
        }
    }

    /// The wire-format bytes, in transfer order.
    pub fn as_bytes(&self) -> &[u8; FRAMEBUFFER_LEN] {
        &self.buf
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
