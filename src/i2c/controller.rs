//! RP2040 construction path: subsystem reset, SCL timing and the register
//! writes behind [`I2cBlock`].

use core::ops::Deref;

use fugit::HertzU32;
use rp2040_pac::{i2c0::RegisterBlock as Block, RESETS};

use super::{BusTiming, Error, I2c, I2cBlock, SpeedClass};

/// Reset control for an I2C block.
///
/// Cycling the subsystem reset puts the controller into a known state before
/// it is configured.
pub trait SubsystemReset {
    /// Assert the subsystem reset.
    fn reset_bring_down(&self, resets: &mut RESETS);
    /// Deassert the subsystem reset and wait for the block to come back.
    fn reset_bring_up(&self, resets: &mut RESETS);
}

macro_rules! generate_reset {
    ($I2CX:ident, $i2cx:ident) => {
        impl SubsystemReset for rp2040_pac::$I2CX {
            fn reset_bring_down(&self, resets: &mut RESETS) {
                resets.reset().modify(|_, w| w.$i2cx().set_bit());
            }
            fn reset_bring_up(&self, resets: &mut RESETS) {
                resets.reset().modify(|_, w| w.$i2cx().clear_bit());
                while resets.reset_done().read().$i2cx().bit_is_clear() {}
            }
        }
    };
}

generate_reset!(I2C0, i2c0);
generate_reset!(I2C1, i2c1);

impl BusTiming {
    /// Derives SCL counts and SDA hold time for `bus_freq` from the system
    /// clock feeding the controller.
    ///
    /// Panics on divisor combinations the hardware cannot represent, which
    /// for the supported 100 kHz/400 kHz classes only happens with an
    /// implausibly slow system clock.
    pub fn from_clocks(system_clock: HertzU32, bus_freq: HertzU32) -> BusTiming {
        let freq = bus_freq.to_Hz();
        assert!(freq <= 1_000_000);
        assert!(freq > 0);

        let freq_in = system_clock.to_Hz();

        // There are some subtleties to I2C timing which we are completely ignoring here
        // See: https://github.com/raspberrypi/pico-sdk/blob/bfcbefafc5d2a210551a4d9d80b4303d4ae0adf7/src/rp2_common/hardware_i2c/i2c.c#L69
        let period = (freq_in + freq / 2) / freq;
        let lcnt = period * 3 / 5; // spend 3/5 (60%) of the period low
        let hcnt = period - lcnt; // and 2/5 (40%) of the period high

        // Check for out-of-range divisors:
        assert!(hcnt <= 0xffff);
        assert!(lcnt <= 0xffff);
        assert!(hcnt >= 8);
        assert!(lcnt >= 8);

        // Per I2C-bus specification a device in standard or fast mode must
        // internally provide a hold time of at least 300ns for the SDA signal to
        // bridge the undefined region of the falling edge of SCL. A smaller hold
        // time of 120ns is used for fast mode plus.
        let sda_tx_hold_count = if freq < 1_000_000 {
            // sda_tx_hold_count = freq_in [cycles/s] * 300ns * (1s / 1e9ns)
            // Reduce 300/1e9 to 3/1e7 to avoid numbers that don't fit in uint.
            // Add 1 to avoid division truncation.
            ((freq_in * 3) / 10_000_000) + 1
        } else {
            // fast mode plus requires a clk_in > 32MHz
            assert!(freq_in >= 32_000_000);

            // sda_tx_hold_count = freq_in [cycles/s] * 120ns * (1s / 1e9ns)
            // Reduce 120/1e9 to 3/25e6 to avoid numbers that don't fit in uint.
            // Add 1 to avoid division truncation.
            ((freq_in * 3) / 25_000_000) + 1
        };
        assert!(sda_tx_hold_count <= lcnt - 2);

        BusTiming {
            scl_hcnt: hcnt as u16,
            scl_lcnt: lcnt as u16,
            spklen: if lcnt < 16 { 1 } else { (lcnt / 16) as u8 },
            sda_tx_hold: sda_tx_hold_count as u16,
        }
    }
}

impl<T: Deref<Target = Block>> I2cBlock for T {
    fn disable(&mut self) {
        self.ic_enable().write(|w| w.enable().disabled());
    }

    fn enable(&mut self) {
        self.ic_enable().write(|w| w.enable().enabled());
    }

    fn configure_controller(&mut self, speed: SpeedClass) {
        self.ic_con().modify(|_, w| {
            match speed {
                SpeedClass::Standard => w.speed().standard(),
                SpeedClass::Fast => w.speed().fast(),
            };
            w.master_mode().enabled();
            w.ic_slave_disable().slave_disabled();
            w.ic_restart_en().enabled();
            w.tx_empty_ctrl().enabled()
        });

        // Clear FIFO threshold
        self.ic_tx_tl().write(|w| unsafe { w.tx_tl().bits(0) });
        self.ic_rx_tl().write(|w| unsafe { w.rx_tl().bits(0) });
    }

    fn set_timing(&mut self, timing: BusTiming) {
        unsafe {
            self.ic_fs_scl_hcnt()
                .write(|w| w.ic_fs_scl_hcnt().bits(timing.scl_hcnt));
            self.ic_fs_scl_lcnt()
                .write(|w| w.ic_fs_scl_lcnt().bits(timing.scl_lcnt));
            self.ic_fs_spklen()
                .write(|w| w.ic_fs_spklen().bits(timing.spklen));
            self.ic_sda_hold()
                .modify(|_r, w| w.ic_sda_tx_hold().bits(timing.sda_tx_hold));
        }
    }

    fn set_target(&mut self, addr: u8) {
        self.ic_tar()
            .write(|w| unsafe { w.ic_tar().bits(addr as u16) });
    }

    fn tx_fifo_not_full(&mut self) -> bool {
        self.ic_status().read().tfnf().bit_is_set()
    }

    fn write_byte(&mut self, byte: u8, stop: bool) {
        self.ic_data_cmd().write(|w| {
            if stop {
                w.stop().enable();
            } else {
                w.stop().disable();
            }
            unsafe { w.dat().bits(byte) }
        });
    }

    fn bus_active(&mut self) -> bool {
        self.ic_status().read().activity().bit_is_set()
    }
}

impl<T: SubsystemReset + Deref<Target = Block>> I2c<T> {
    /// Resets the block and configures it as a controller bound to `addr`.
    ///
    /// Pin-function and pad configuration for SDA/SCL must already have
    /// happened; this routine only touches the I2C block itself. The speed
    /// class is derived from `freq`: standard mode up to 100 kHz, fast mode
    /// above it.
    pub fn new_controller(
        i2c: T,
        freq: HertzU32,
        resets: &mut RESETS,
        system_clock: HertzU32,
        addr: u8,
    ) -> Result<Self, Error> {
        i2c.reset_bring_down(resets);
        i2c.reset_bring_up(resets);

        let speed = if freq.to_Hz() <= 100_000 {
            SpeedClass::Standard
        } else {
            SpeedClass::Fast
        };
        let timing = BusTiming::from_clocks(system_clock, freq);

        I2c::new(i2c, speed, timing, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::RateExtU32;

    #[test]
    fn fast_mode_timing_at_125mhz() {
        let timing = BusTiming::from_clocks(125_000_000.Hz(), 400_000.Hz());

        // period = 313 system cycles, split 60/40 low/high
        assert_eq!(timing.scl_lcnt, 187);
        assert_eq!(timing.scl_hcnt, 126);
        assert_eq!(timing.spklen, 11);
        // 300ns hold at 125MHz, rounded up
        assert_eq!(timing.sda_tx_hold, 38);
    }

    #[test]
    fn standard_mode_timing_at_125mhz() {
        let timing = BusTiming::from_clocks(125_000_000.Hz(), 100_000.Hz());

        assert_eq!(timing.scl_lcnt + timing.scl_hcnt, 1250);
        assert!(timing.scl_lcnt > timing.scl_hcnt);
    }
}
