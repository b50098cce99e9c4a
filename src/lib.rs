//! Bring-up driver for an SSD1306 OLED panel on the RP2040's I2C controller
//!
//! Two strictly layered parts:
//!
//! - [`i2c`]: a blocking, polled-FIFO transaction engine for the DW_apb_i2c
//!   block, writing to a single fixed target address. No interrupts, no DMA.
//! - [`ssd1306`]: the panel protocol built on the engine. It frames command
//!   and data bytes with the SSD1306 control-byte convention and owns the
//!   bring-up command table and the 1024-byte framebuffer transfer.
//!
//! [`framebuffer`] carries the page-packed pixel layout the panel expects, so
//! rendering code can fill a buffer without knowing the wire format.
//!
//! The engine is generic over [`i2c::I2cBlock`], the register-level view of
//! the controller. On hardware that view is a `rp2040-pac` I2C register
//! block; the crate's tests drive the same code through a simulated block.
//!
//! Pad and pin-function configuration is up to the caller and must happen
//! before the controller is constructed.

#![warn(missing_docs)]
#![no_std]

pub use rp2040_pac as pac;

pub mod framebuffer;
pub mod i2c;
pub mod ssd1306;
