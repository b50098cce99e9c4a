//! Inter-Integrated Circuit (I2C) bus, controller mode, polled
//!
//! A blocking transaction engine for the RP2040's DW_apb_i2c block. The
//! target address is latched once at construction and every transfer goes to
//! it; the engine busy-polls the transmit FIFO and the bus-activity status
//! bit instead of taking interrupts. See [Chapter 4 Section 3](https://datasheets.raspberrypi.org/rp2040/rp2040_datasheet.pdf)
//! for more details.
//!
//! By default a write does not return until the controller reports the bus
//! idle again, and a slave that stretches the clock forever therefore blocks
//! forever. [`I2c::set_poll_budget`] bounds every poll loop and surfaces
//! [`Error::BusTimeout`] instead, for callers that need a diagnosable hang.

mod controller;

pub use controller::SubsystemReset;

/// I2C error
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A poll loop exhausted its budget while the bus stayed busy.
    ///
    /// Only produced when a budget was set with [`I2c::set_poll_budget`].
    BusTimeout,
    /// The buffer passed to a transfer had an invalid length.
    InvalidBufferLength,
    /// Target address not in the 7-bit range.
    AddressOutOfRange(u8),
    /// Target address matches an I2C reserved range.
    AddressReserved(u8),
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        embedded_hal::i2c::ErrorKind::Other
    }
}

/// Bus timing mode programmed into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedClass {
    /// Standard mode, up to 100 kHz.
    Standard,
    /// Fast mode, up to 400 kHz.
    Fast,
}

/// SCL and SDA timing counts, in system-clock cycles.
///
/// Computed from the system clock and the requested bus frequency by
/// [`BusTiming::from_clocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// SCL high period.
    pub scl_hcnt: u16,
    /// SCL low period.
    pub scl_lcnt: u16,
    /// Spike suppression length.
    pub spklen: u8,
    /// SDA hold time after the falling edge of SCL.
    pub sda_tx_hold: u16,
}

/// Register-level view of the I2C controller block.
///
/// The engine drives the controller exclusively through this trait. The
/// RP2040 register blocks implement it (see [`crate::pac`]); tests implement
/// it over a simulated bus.
pub trait I2cBlock {
    /// Disable the controller so it can be reconfigured.
    fn disable(&mut self);
    /// Enable the controller.
    fn enable(&mut self);
    /// Program controller-only operation at the given speed class.
    ///
    /// Must be called while the controller is disabled.
    fn configure_controller(&mut self, speed: SpeedClass);
    /// Program the SCL/SDA timing counts.
    fn set_timing(&mut self, timing: BusTiming);
    /// Latch the 7-bit target address. Must be called while disabled.
    fn set_target(&mut self, addr: u8);
    /// The transmit FIFO has room for at least one more entry.
    fn tx_fifo_not_full(&mut self) -> bool;
    /// Push one byte into the data/command FIFO. `stop` marks it as the
    /// final byte of the transaction, making the hardware generate a STOP
    /// condition after it goes out.
    fn write_byte(&mut self, byte: u8, stop: bool);
    /// The bus is mid-transaction.
    fn bus_active(&mut self) -> bool;
}

/// I2C transaction engine bound to a single target address.
///
/// Owns the register block exclusively for its whole lifetime; there is no
/// shared state and no locking because nothing else may touch the block.
pub struct I2c<B: I2cBlock> {
    block: B,
    poll_budget: Option<u32>,
}

fn i2c_reserved_addr(addr: u8) -> bool {
    (addr & 0x78) == 0 || (addr & 0x78) == 0x78
}

impl<B: I2cBlock> I2c<B> {
    /// Configures the controller and latches the target address.
    ///
    /// Programs controller-only operation at `speed` with the given timing
    /// counts. Call exactly once, after pad configuration and subsystem
    /// reset; the engine assumes strictly sequential use from then on.
    pub fn new(mut block: B, speed: SpeedClass, timing: BusTiming, addr: u8) -> Result<Self, Error> {
        if addr >= 0x80 {
            return Err(Error::AddressOutOfRange(addr));
        }
        if i2c_reserved_addr(addr) {
            return Err(Error::AddressReserved(addr));
        }

        block.disable();
        block.configure_controller(speed);
        block.set_timing(timing);
        block.set_target(addr);
        block.enable();

        Ok(Self {
            block,
            poll_budget: None,
        })
    }

    /// Bounds every poll loop to `budget` iterations, or restores the
    /// default unbounded spin with `None`.
    ///
    /// With a budget set, a stuck bus surfaces as [`Error::BusTimeout`]
    /// instead of blocking the caller forever.
    pub fn set_poll_budget(&mut self, budget: Option<u32>) {
        self.poll_budget = budget;
    }

    /// Writes `bytes` to the target as one transaction.
    ///
    /// Blocks until every byte has been accepted by the FIFO and the bus has
    /// returned to idle. The last byte is marked so the hardware generates
    /// the STOP condition.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidBufferLength);
        }
        self.write_iter(bytes.iter().copied())
    }

    /// Like [`I2c::write`], but streams from an iterator.
    ///
    /// Lets a caller prepend framing bytes without staging the whole
    /// transaction in memory.
    pub fn write_iter<U>(&mut self, bytes: U) -> Result<(), Error>
    where
        U: IntoIterator<Item = u8>,
    {
        let mut bytes = bytes.into_iter().peekable();
        if bytes.peek().is_none() {
            return Err(Error::InvalidBufferLength);
        }

        while let Some(byte) = bytes.next() {
            let last = bytes.peek().is_none();

            // wait until there is space in the FIFO to write the next byte
            self.poll(|block| block.tx_fifo_not_full())?;
            self.block.write_byte(byte, last);
        }

        // The FIFO accepting the last byte only means it is queued; the
        // transaction has fully drained once the activity bit clears.
        self.poll(|block| !block.bus_active())
    }

    /// Releases the underlying register block.
    pub fn free(self) -> B {
        self.block
    }

    fn poll(&mut self, mut ready: impl FnMut(&mut B) -> bool) -> Result<(), Error> {
        match self.poll_budget {
            None => {
                while !ready(&mut self.block) {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            Some(budget) => {
                for _ in 0..budget {
                    if ready(&mut self.block) {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                Err(Error::BusTimeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::i2c_reserved_addr;

    #[test]
    fn reserved_address_ranges() {
        assert!(i2c_reserved_addr(0x00));
        assert!(i2c_reserved_addr(0x07));
        assert!(i2c_reserved_addr(0x78));
        assert!(i2c_reserved_addr(0x7F));
        assert!(!i2c_reserved_addr(0x3C));
        assert!(!i2c_reserved_addr(0x08));
        assert!(!i2c_reserved_addr(0x77));
    }
}
