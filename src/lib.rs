//! # Driver for the Microchip MCP4725 12-bit I2C DAC
//!
//! This is a platform-agnostic driver built on the [`embedded-hal`] 1.0 I2C
//! trait. It formats the chip's register-programming frames and exchanges
//! them over an injected bus handle; any HAL that implements
//! [`embedded_hal::i2c::I2c`] will do.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//!
//! # Usage example
//!
//! ```
//! use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
//! use mcp4725::{Mcp4725, PowerDown};
//!
//! # let i2c = Mock::new(&[
//! #     Transaction::write(0x62, vec![0x40, 0x80, 0x00]),
//! #     Transaction::write(0x62, vec![0x42, 0x00, 0x00]),
//! # ]);
//! let mut dac = Mcp4725::new(i2c, mcp4725::DEFAULT_ADDRESS);
//!
//! // Drive the output to mid-scale, then shut the output stage down.
//! dac.set_voltage(2048)?;
//! dac.power_down(PowerDown::OneKOhm)?;
//! # let mut i2c = dac.release();
//! # i2c.done();
//! # Ok::<(), mcp4725::Error<embedded_hal::i2c::ErrorKind>>(())
//! ```
//!
//! Values are 12-bit codes in a `u16`; the reference voltage and the
//! resulting output voltage are the board's business. Anything above the low
//! 12 bits of a value is silently truncated by the frame arithmetic, the same
//! way the chip itself ignores those bit positions.
//!
//! The bus must already be configured and running when the driver is
//! constructed. [`BusMode::frequency`] lists the clock rates the chip
//! accepts, including the 400 kHz fast mode.

#![no_std]

mod command;
mod status;

use embedded_hal::i2c::I2c;
use fugit::HertzU32 as Hertz;
use fugit::RateExtU32;

pub use command::PowerDown;
pub use status::{Readback, Status};

/// Bus address with the A0 pin tied to ground (the common breakout default).
/// Tie A0 to VCC for `0x63`.
pub const DEFAULT_ADDRESS: u8 = 0x62;

/// Default readback budget for [`Mcp4725::read_eeprom`]. A five-byte readback
/// takes roughly 150 µs on a 400 kHz bus, so 400 attempts cover the chip's
/// worst-case 50 ms EEPROM write time.
const DEFAULT_EEPROM_RETRIES: u16 = 400;

/// I2C clock rates the chip accepts.
///
/// The driver does not own the bus clock; configure the bus master with the
/// rate returned by [`frequency`](BusMode::frequency) before constructing the
/// driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusMode {
    /// Standard mode, 100 kHz
    Standard,
    /// Fast mode, 400 kHz
    Fast,
    /// High-speed mode, 3.4 MHz
    HighSpeed,
}

impl BusMode {
    /// Clock rate to configure the bus master with for this mode.
    pub fn frequency(self) -> Hertz {
        match self {
            BusMode::Standard => 100.kHz(),
            BusMode::Fast => 400.kHz(),
            BusMode::HighSpeed => 3_400.kHz(),
        }
    }
}

/// Driver error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transport failure (NACK, arbitration loss, ...), propagated from
    /// the underlying implementation.
    I2c(E),
    /// The EEPROM write cycle was still running after the retry budget was
    /// spent.
    Busy,
}

/// MCP4725 driver over an injected I2C bus handle.
///
/// The 7-bit address is fixed at construction. All operations are synchronous
/// and block for the duration of one bus transaction; the only iteration the
/// driver performs on its own is the bounded retry budget of
/// [`read_eeprom`](Mcp4725::read_eeprom).
#[derive(Debug)]
pub struct Mcp4725<I2C> {
    i2c: I2C,
    address: u8,
    eeprom_retries: u16,
}

impl<I2C: I2c> Mcp4725<I2C> {
    /// Creates a driver for the device at `address` (7-bit).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Mcp4725 {
            i2c,
            address,
            eeprom_retries: DEFAULT_EEPROM_RETRIES,
        }
    }

    /// Replaces the readback budget used by
    /// [`read_eeprom`](Mcp4725::read_eeprom).
    pub fn set_eeprom_retry_limit(&mut self, retries: u16) {
        self.eeprom_retries = retries;
    }

    /// Writes `value` to the DAC register.
    ///
    /// Only the low 12 bits are used; anything above them is truncated by the
    /// frame arithmetic.
    pub fn set_voltage(&mut self, value: u16) -> Result<(), Error<I2C::Error>> {
        let frame = command::normal_frame(command::WRITE_DAC, PowerDown::Normal, value);
        self.i2c.write(self.address, &frame).map_err(Error::I2c)
    }

    /// Writes `value` to the DAC register and the EEPROM, so the chip powers
    /// up with it after a reset.
    ///
    /// The EEPROM write cycle keeps running inside the chip for up to 50 ms
    /// after this call returns; poll
    /// [`try_read_eeprom`](Mcp4725::try_read_eeprom) or call
    /// [`read_eeprom`](Mcp4725::read_eeprom) to wait for it.
    pub fn set_voltage_and_save(&mut self, value: u16) -> Result<(), Error<I2C::Error>> {
        let frame = command::normal_frame(command::WRITE_DAC_AND_EEPROM, PowerDown::Normal, value);
        self.i2c.write(self.address, &frame).map_err(Error::I2c)
    }

    /// Writes `value` with the two-byte fast-mode frame.
    ///
    /// Saves a byte per update compared to
    /// [`set_voltage`](Mcp4725::set_voltage) but cannot touch the EEPROM.
    pub fn set_voltage_fast(&mut self, value: u16) -> Result<(), Error<I2C::Error>> {
        let frame = command::fast_frame(PowerDown::Normal, value);
        self.i2c.write(self.address, &frame).map_err(Error::I2c)
    }

    /// Disables the output stage and pulls the output pin to ground through
    /// the selected resistance. The DAC register is cleared to zero.
    ///
    /// Passing [`PowerDown::Normal`] wakes the device with the output at code
    /// zero; any subsequent write wakes it as well.
    pub fn power_down(&mut self, mode: PowerDown) -> Result<(), Error<I2C::Error>> {
        let frame = command::normal_frame(command::WRITE_DAC, mode, 0);
        self.i2c.write(self.address, &frame).map_err(Error::I2c)
    }

    /// Reads the chip's full five-byte readback: status flags, the active
    /// DAC register and the EEPROM contents.
    pub fn read(&mut self) -> Result<Readback, Error<I2C::Error>> {
        let mut frame = [0u8; 5];
        self.i2c
            .read(self.address, &mut frame)
            .map_err(Error::I2c)?;
        Ok(Readback::parse(&frame))
    }

    /// Current DAC register value.
    pub fn read_dac_register(&mut self) -> Result<u16, Error<I2C::Error>> {
        Ok(self.read()?.dac)
    }

    /// Value stored in the EEPROM.
    ///
    /// Returns [`nb::Error::WouldBlock`] while a previous
    /// [`set_voltage_and_save`](Mcp4725::set_voltage_and_save) is still
    /// committing; the stored bytes of the readback are not valid until the
    /// ready flag comes up.
    pub fn try_read_eeprom(&mut self) -> nb::Result<u16, Error<I2C::Error>> {
        let readback = self.read()?;
        if readback.status.contains(Status::READY) {
            Ok(readback.eeprom)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Blocking form of [`try_read_eeprom`](Mcp4725::try_read_eeprom):
    /// re-reads until the ready flag comes up, giving up with [`Error::Busy`]
    /// once the retry budget is spent.
    ///
    /// Each attempt is a full five-byte bus read, so the budget bounds the
    /// stall a stuck device can cause. Tune it with
    /// [`set_eeprom_retry_limit`](Mcp4725::set_eeprom_retry_limit).
    pub fn read_eeprom(&mut self) -> Result<u16, Error<I2C::Error>> {
        for _ in 0..self.eeprom_retries {
            match self.try_read_eeprom() {
                Ok(value) => return Ok(value),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Err(Error::Busy)
    }

    /// General call wake-up (address `0x00`): every MCP4725 on the bus
    /// clears its power-down bits.
    pub fn wake_up(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(command::GENERAL_CALL, &[command::GENERAL_CALL_WAKE_UP])
            .map_err(Error::I2c)
    }

    /// General call reset (address `0x00`): every MCP4725 on the bus reloads
    /// its DAC register from EEPROM.
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(command::GENERAL_CALL, &[command::GENERAL_CALL_RESET])
            .map_err(Error::I2c)
    }

    /// Releases the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
