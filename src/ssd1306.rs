//! SSD1306 panel protocol over the I2C engine
//!
//! Every transaction starts with a control byte: `0x80` marks the next byte
//! as a command, `0x40` marks the rest of the transaction as display data.
//! Commands that take arguments are just consecutive command transfers, so
//! ordering within a command list is significant.
//!
//! The panel's 128×64 pixel array is addressed as 8 pages of 128 columns,
//! one byte per column per page; see [`crate::framebuffer`] for the packing.

use crate::i2c::{Error, I2c, I2cBlock};

/// Panel width in pixels.
pub const WIDTH: usize = 128;
/// Panel height in pixels.
pub const HEIGHT: usize = 64;
/// Number of 8-pixel-tall pages.
pub const PAGES: usize = HEIGHT / 8;
/// Length of a full-frame transfer in bytes.
pub const FRAMEBUFFER_LEN: usize = WIDTH * PAGES;

/// The panel's fixed 7-bit bus address.
pub const ADDRESS: u8 = 0x3C;

/// Control byte announcing a single command byte.
const CONTROL_CMD: u8 = 0x80;
/// Control byte announcing a display-data stream.
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 command bytes.
pub struct Cmd;
#[allow(missing_docs)]
impl Cmd {
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const START_LINE: u8 = 0x40;
    pub const CONTRAST: u8 = 0x81;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const MULTIPLEX: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const DISPLAY_OFFSET: u8 = 0xD3;
    pub const CLOCK_DIV: u8 = 0xD5;
    pub const PRECHARGE: u8 = 0xD9;
    pub const COM_PINS: u8 = 0xDA;
    pub const VCOM_DETECT: u8 = 0xDB;
}

/// Bring-up sequence for a 128×64 panel running from the internal charge
/// pump, in datasheet order. Command/argument pairs must stay adjacent.
pub const INIT_SEQUENCE: &[u8] = &[
    Cmd::DISPLAY_OFF,
    Cmd::CLOCK_DIV,
    0x80,
    Cmd::MULTIPLEX,
    (HEIGHT - 1) as u8,
    Cmd::DISPLAY_OFFSET,
    0x00,
    Cmd::START_LINE,
    Cmd::CHARGE_PUMP,
    0x14,
    Cmd::MEMORY_MODE,
    0x00, // horizontal addressing
    Cmd::SEG_REMAP | 0x01,
    Cmd::COM_SCAN_DEC,
    Cmd::COM_PINS,
    0x12,
    Cmd::CONTRAST,
    0xCF,
    Cmd::PRECHARGE,
    0xF1,
    Cmd::VCOM_DETECT,
    0x40,
    Cmd::ALL_ON_RESUME,
    Cmd::NORMAL_DISPLAY,
    Cmd::DISPLAY_ON,
];

/// SSD1306 panel driven through an [`I2c`] engine.
///
/// Drive-only: there is no read-back path. [`Ssd1306::init`] must complete
/// before the first framebuffer transfer or the panel shows garbage.
pub struct Ssd1306<B: I2cBlock> {
    i2c: I2c<B>,
}

impl<B: I2cBlock> Ssd1306<B> {
    /// Wraps an engine already bound to the panel's address.
    pub fn new(i2c: I2c<B>) -> Self {
        Self { i2c }
    }

    /// Runs the bring-up command table. The panel is dark but addressable
    /// before this; lit and cursor-reset after.
    pub fn init(&mut self) -> Result<(), Error> {
        self.send_command_list(INIT_SEQUENCE)
    }

    /// Issues a single command as its own `[0x80, cmd]` transaction.
    pub fn send_command(&mut self, cmd: u8) -> Result<(), Error> {
        self.i2c.write(&[CONTROL_CMD, cmd])
    }

    /// Issues one command transaction per element, in order.
    pub fn send_command_list(&mut self, cmds: &[u8]) -> Result<(), Error> {
        for &cmd in cmds {
            self.send_command(cmd)?;
        }
        Ok(())
    }

    /// Streams a full frame to the panel.
    ///
    /// Resets the write cursor to the top-left first (column 0..=127, page
    /// 0..=7) so a frame can never land mid-page, then sends the whole
    /// buffer as one data transaction. `buf` must be exactly
    /// [`FRAMEBUFFER_LEN`] bytes.
    pub fn send_framebuffer(&mut self, buf: &[u8]) -> Result<(), Error> {
        if buf.len() != FRAMEBUFFER_LEN {
            return Err(Error::InvalidBufferLength);
        }

        self.send_command_list(&[
            Cmd::COLUMN_ADDR,
            0,
            (WIDTH - 1) as u8,
            Cmd::PAGE_ADDR,
            0,
            (PAGES - 1) as u8,
        ])?;

        self.i2c
            .write_iter(core::iter::once(CONTROL_DATA).chain(buf.iter().copied()))
    }

    /// Streams a [`Framebuffer`](crate::framebuffer::Framebuffer) to the
    /// panel.
    pub fn flush(&mut self, fb: &crate::framebuffer::Framebuffer) -> Result<(), Error> {
        self.send_framebuffer(fb.as_bytes())
    }

    /// Releases the engine.
    pub fn release(self) -> I2c<B> {
        self.i2c
    }
}
