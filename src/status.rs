//! Readback-frame decoding.
//!
//! The chip answers a read with five bytes: a status byte, the DAC register
//! value in the same 8/4 split the write frames use, and the EEPROM contents
//! with the stored power-down bits folded into the fourth byte:
//!
//! ```text
//! [RDY POR x x x PD1 PD0 x] [D11..D4] [D3..D0 0 0 0 0] [x PD1 PD0 x D11..D8] [D7..D0]
//! ```

use crate::command::PowerDown;

bitflags::bitflags! {
    /// Flag bits of the readback status byte.
    pub struct Status: u8 {
        /// The EEPROM write cycle has settled; the stored value in the
        /// readback is valid.
        const READY = 1 << 7;
        /// The device has completed power-on reset and is operating.
        const POR = 1 << 6;
    }
}

/// Snapshot of everything the chip reports in one five-byte readback.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Readback {
    /// Status flags.
    pub status: Status,
    /// Power state the output stage is currently in.
    pub power_down: PowerDown,
    /// Current DAC register value.
    pub dac: u16,
    /// Power state stored in EEPROM, applied on power-up.
    pub eeprom_power_down: PowerDown,
    /// Output value stored in EEPROM, applied on power-up.
    pub eeprom: u16,
}

impl Readback {
    pub(crate) fn parse(frame: &[u8; 5]) -> Self {
        Readback {
            status: Status::from_bits_truncate(frame[0]),
            power_down: PowerDown::from_bits(frame[0] >> 1),
            dac: dac_value(frame[1], frame[2]),
            eeprom_power_down: PowerDown::from_bits(frame[3] >> 5),
            eeprom: eeprom_value(frame[3], frame[4]),
        }
    }
}

/// Reassembles the DAC register value from readback bytes 1 and 2.
pub(crate) fn dac_value(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 4 | (lo as u16) >> 4
}

/// Reassembles the EEPROM value from readback bytes 3 and 4.
pub(crate) fn eeprom_value(hi: u8, lo: u8) -> u16 {
    ((hi & 0x0F) as u16) << 8 | lo as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{self, PowerDown};

    #[test]
    fn write_encoding_survives_dac_readback() {
        for value in 0..=4095u16 {
            let [_, hi, lo] = command::normal_frame(command::WRITE_DAC, PowerDown::Normal, value);
            assert_eq!(dac_value(hi, lo), value);
        }
    }

    #[test]
    fn eeprom_readback_recovers_any_value() {
        for value in 0..=4095u16 {
            // Stored power-down bits sit above the value nibble and must not
            // leak into the result.
            let hi = 0b0110_0000 | (value >> 8) as u8;
            assert_eq!(eeprom_value(hi, value as u8), value);
        }
    }

    #[test]
    fn parse_full_frame() {
        let readback = Readback::parse(&[0b1100_0100, 0x80, 0x00, 0b0010_1000, 0xFF]);
        assert_eq!(readback.status, Status::READY | Status::POR);
        assert_eq!(readback.power_down, PowerDown::HundredKOhm);
        assert_eq!(readback.dac, 0x800);
        assert_eq!(readback.eeprom_power_down, PowerDown::OneKOhm);
        assert_eq!(readback.eeprom, 0x8FF);
    }

    #[test]
    fn parse_busy_frame() {
        let readback = Readback::parse(&[0b0100_0000, 0x00, 0x00, 0x00, 0x00]);
        assert!(!readback.status.contains(Status::READY));
        assert_eq!(readback.power_down, PowerDown::Normal);
    }
}
