//! Command formatting for the MCP4725 register protocol.
//!
//! The chip understands two wire formats. The normal-speed format carries an
//! explicit command byte selecting the target registers, followed by two data
//! bytes. The fast-mode format folds the power-down bits into the first data
//! byte and halves the transaction length, at the cost of the EEPROM option.
//!
//! ```text
//! Normal speed: [C2 C1 C0 x x PD1 PD0 x] [D11..D4] [D3 D2 D1 D0 0 0 0 0]
//! Fast mode:    [0 0 PD1 PD0 D11..D8] [D7..D0]
//! ```

/// Write the DAC register only.
pub(crate) const WRITE_DAC: u8 = 0x40;
/// Write the DAC register and the EEPROM; the chip reloads the stored value
/// on power-up.
pub(crate) const WRITE_DAC_AND_EEPROM: u8 = 0x60;

/// I2C general call address, listened to by every device on the bus.
pub(crate) const GENERAL_CALL: u8 = 0x00;
/// General call command: reload the DAC register from EEPROM.
pub(crate) const GENERAL_CALL_RESET: u8 = 0x06;
/// General call command: clear the power-down bits.
pub(crate) const GENERAL_CALL_WAKE_UP: u8 = 0x09;

/// Power state selector carried in every write frame.
///
/// In the three power-down states the output stage is disabled and the output
/// pin is pulled to ground through the selected resistance. Any write with
/// the bits at `Normal` wakes the device again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerDown {
    /// Output stage active
    Normal = 0b00,
    /// Output pulled to ground through 1 kΩ
    OneKOhm = 0b01,
    /// Output pulled to ground through 100 kΩ
    HundredKOhm = 0b10,
    /// Output pulled to ground through 500 kΩ
    FiveHundredKOhm = 0b11,
}

impl PowerDown {
    pub(crate) fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a 2-bit power-down field out of a readback frame.
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => PowerDown::Normal,
            0b01 => PowerDown::OneKOhm,
            0b10 => PowerDown::HundredKOhm,
            _ => PowerDown::FiveHundredKOhm,
        }
    }
}

/// Packs a normal-speed frame: command byte, then the 12 significant bits of
/// `value` split 8/4 across the two data bytes. Bits above the low 12 do not
/// survive the shifts.
pub(crate) fn normal_frame(command: u8, mode: PowerDown, value: u16) -> [u8; 3] {
    [
        command | mode.bits() << 1,
        (value >> 4) as u8,
        (value << 4) as u8,
    ]
}

/// Packs a fast-mode frame: power-down bits and the top nibble of `value`,
/// then the low byte.
pub(crate) fn fast_frame(mode: PowerDown, value: u16) -> [u8; 2] {
    [mode.bits() << 4 | ((value >> 8) as u8 & 0x0F), value as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_frame_selects_command() {
        assert_eq!(
            normal_frame(WRITE_DAC, PowerDown::Normal, 2048),
            [0x40, 0x80, 0x00]
        );
        assert_eq!(
            normal_frame(WRITE_DAC_AND_EEPROM, PowerDown::Normal, 2048),
            [0x60, 0x80, 0x00]
        );
    }

    #[test]
    fn normal_frame_splits_value_8_4() {
        for value in 0..=4095u16 {
            let [_, hi, lo] = normal_frame(WRITE_DAC, PowerDown::Normal, value);
            assert_eq!(hi, (value >> 4) as u8);
            assert_eq!(lo, ((value & 0xF) << 4) as u8);
        }
    }

    #[test]
    fn power_down_frames() {
        assert_eq!(
            normal_frame(WRITE_DAC, PowerDown::OneKOhm, 0),
            [0x42, 0x00, 0x00]
        );
        assert_eq!(
            normal_frame(WRITE_DAC, PowerDown::HundredKOhm, 0),
            [0x44, 0x00, 0x00]
        );
        assert_eq!(
            normal_frame(WRITE_DAC, PowerDown::FiveHundredKOhm, 0),
            [0x46, 0x00, 0x00]
        );
    }

    #[test]
    fn fast_frame_layout() {
        assert_eq!(fast_frame(PowerDown::Normal, 2048), [0x08, 0x00]);
        assert_eq!(fast_frame(PowerDown::Normal, 4095), [0x0F, 0xFF]);
        for value in 0..=4095u16 {
            let [hi, lo] = fast_frame(PowerDown::Normal, value);
            assert_eq!(hi, (value >> 8) as u8);
            assert_eq!(lo, (value & 0xFF) as u8);
        }
    }

    #[test]
    fn fast_frame_carries_power_down_bits() {
        assert_eq!(fast_frame(PowerDown::FiveHundredKOhm, 0x0123), [0x31, 0x23]);
    }

    #[test]
    fn oversized_values_truncate_to_12_bits() {
        assert_eq!(
            normal_frame(WRITE_DAC, PowerDown::Normal, 0xF800),
            normal_frame(WRITE_DAC, PowerDown::Normal, 0x0800)
        );
        assert_eq!(
            fast_frame(PowerDown::Normal, 0xF800),
            fast_frame(PowerDown::Normal, 0x0800)
        );
    }

    #[test]
    fn power_down_field_round_trips() {
        for mode in [
            PowerDown::Normal,
            PowerDown::OneKOhm,
            PowerDown::HundredKOhm,
            PowerDown::FiveHundredKOhm,
        ] {
            assert_eq!(PowerDown::from_bits(mode.bits()), mode);
        }
    }
}
