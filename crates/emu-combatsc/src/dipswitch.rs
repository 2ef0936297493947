//! DIP switch definitions.
//!
//! Each switch is a named bit group on one input port. Settings are the
//! port bits for that group; everything is active-low the way the board
//! reads it, so "Off" is usually the bit set.

use crate::config::BoardKind;
use crate::error::DipError;
use crate::input::PortId;

/// One selectable value of a DIP switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DipSetting {
    pub value: u8,
    pub label: &'static str,
}

/// A named bit group on an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DipSwitch {
    pub name: &'static str,
    pub port: PortId,
    pub mask: u8,
    pub default: u8,
    /// Physical switch positions, e.g. `SW1:1,2,3,4`.
    pub location: &'static str,
    pub settings: &'static [DipSetting],
}

impl DipSwitch {
    /// Find a setting by label (case-insensitive).
    #[must_use]
    pub fn setting(&self, label: &str) -> Option<&'static DipSetting> {
        self.settings
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(label))
    }
}

const fn s(value: u8, label: &'static str) -> DipSetting {
    DipSetting { value, label }
}

const COIN_A: &[DipSetting] = &[
    s(0x02, "4 Coins/1 Credit"),
    s(0x05, "3 Coins/1 Credit"),
    s(0x08, "2 Coins/1 Credit"),
    s(0x04, "3 Coins/2 Credits"),
    s(0x01, "4 Coins/3 Credits"),
    s(0x0F, "1 Coin/1 Credit"),
    s(0x03, "3 Coins/4 Credits"),
    s(0x07, "2 Coins/3 Credits"),
    s(0x0E, "1 Coin/2 Credits"),
    s(0x06, "2 Coins/5 Credits"),
    s(0x0D, "1 Coin/3 Credits"),
    s(0x0C, "1 Coin/4 Credits"),
    s(0x0B, "1 Coin/5 Credits"),
    s(0x0A, "1 Coin/6 Credits"),
    s(0x09, "1 Coin/7 Credits"),
    s(0x00, "Free Play"),
];

// Same table shifted into the high nibble; 0x00 disables slot B.
const COIN_B: &[DipSetting] = &[
    s(0x20, "4 Coins/1 Credit"),
    s(0x50, "3 Coins/1 Credit"),
    s(0x80, "2 Coins/1 Credit"),
    s(0x40, "3 Coins/2 Credits"),
    s(0x10, "4 Coins/3 Credits"),
    s(0xF0, "1 Coin/1 Credit"),
    s(0x30, "3 Coins/4 Credits"),
    s(0x70, "2 Coins/3 Credits"),
    s(0xE0, "1 Coin/2 Credits"),
    s(0x60, "2 Coins/5 Credits"),
    s(0xD0, "1 Coin/3 Credits"),
    s(0xC0, "1 Coin/4 Credits"),
    s(0xB0, "1 Coin/5 Credits"),
    s(0xA0, "1 Coin/6 Credits"),
    s(0x90, "1 Coin/7 Credits"),
    s(0x00, "None"),
];

const CABINET: &[DipSetting] = &[s(0x00, "Upright"), s(0x04, "Cocktail")];

const DIFFICULTY: &[DipSetting] = &[
    s(0x60, "Easy"),
    s(0x40, "Normal"),
    s(0x20, "Difficult"),
    s(0x00, "Very Difficult"),
];

const DEMO_SOUNDS: &[DipSetting] = &[s(0x80, "Off"), s(0x00, "On")];
const FLIP_SCREEN: &[DipSetting] = &[s(0x10, "Off"), s(0x00, "On")];
const SERVICE_MODE: &[DipSetting] = &[s(0x40, "Off"), s(0x00, "On")];
const ALLOW_CONTINUE: &[DipSetting] = &[s(0x10, "No"), s(0x00, "Yes")];

// Unused switches: "Off" is the factory position.
const UNUSED_01_OFF_SET: &[DipSetting] = &[s(0x01, "Off"), s(0x00, "On")];
const UNUSED_02_OFF_SET: &[DipSetting] = &[s(0x02, "Off"), s(0x00, "On")];
const UNUSED_04_OFF_CLEAR: &[DipSetting] = &[s(0x00, "Off"), s(0x04, "On")];
const UNUSED_08_OFF_SET: &[DipSetting] = &[s(0x08, "Off"), s(0x00, "On")];
const UNUSED_10_OFF_SET: &[DipSetting] = &[s(0x10, "Off"), s(0x00, "On")];
const UNUSED_20_OFF_CLEAR: &[DipSetting] = &[s(0x00, "Off"), s(0x20, "On")];
const UNUSED_80_OFF_CLEAR: &[DipSetting] = &[s(0x00, "Off"), s(0x80, "On")];

const fn dip(
    name: &'static str,
    port: PortId,
    mask: u8,
    default: u8,
    location: &'static str,
    settings: &'static [DipSetting],
) -> DipSwitch {
    DipSwitch {
        name,
        port,
        mask,
        default,
        location,
        settings,
    }
}

/// Switches on the Konami GX611 board (all five sets).
pub const KONAMI_DIPS: &[DipSwitch] = &[
    dip("Coin A", PortId::Dsw1, 0x0F, 0x0F, "SW1:1,2,3,4", COIN_A),
    dip("Coin B", PortId::Dsw1, 0xF0, 0xF0, "SW1:5,6,7,8", COIN_B),
    dip("Unknown SW2:1", PortId::Dsw2, 0x01, 0x01, "SW2:1", UNUSED_01_OFF_SET),
    dip("Unknown SW2:2", PortId::Dsw2, 0x02, 0x02, "SW2:2", UNUSED_02_OFF_SET),
    dip("Cabinet", PortId::Dsw2, 0x04, 0x00, "SW2:3", CABINET),
    dip("Unknown SW2:4", PortId::Dsw2, 0x08, 0x08, "SW2:4", UNUSED_08_OFF_SET),
    dip("Unknown SW2:5", PortId::Dsw2, 0x10, 0x10, "SW2:5", UNUSED_10_OFF_SET),
    dip("Difficulty", PortId::Dsw2, 0x60, 0x60, "SW2:6,7", DIFFICULTY),
    dip("Demo Sounds", PortId::Dsw2, 0x80, 0x00, "SW2:8", DEMO_SOUNDS),
    dip("Flip Screen", PortId::Dsw3, 0x10, 0x10, "SW3:1", FLIP_SCREEN),
    dip("Unknown SW3:2", PortId::Dsw3, 0x20, 0x00, "SW3:2", UNUSED_20_OFF_CLEAR),
    dip("Service Mode", PortId::Dsw3, 0x40, 0x40, "SW3:3", SERVICE_MODE),
    dip("Unknown SW3:4", PortId::Dsw3, 0x80, 0x00, "SW3:4", UNUSED_80_OFF_CLEAR),
];

/// Switches on the bootleg board. No SW3; cabinet select is gone and SW2:5
/// enables continues.
pub const BOOTLEG_DIPS: &[DipSwitch] = &[
    dip("Coin A", PortId::Dsw1, 0x0F, 0x0F, "SW1:1,2,3,4", COIN_A),
    dip("Coin B", PortId::Dsw1, 0xF0, 0xF0, "SW1:5,6,7,8", COIN_B),
    dip("Unknown SW2:1", PortId::Dsw2, 0x01, 0x01, "SW2:1", UNUSED_01_OFF_SET),
    dip("Unknown SW2:2", PortId::Dsw2, 0x02, 0x02, "SW2:2", UNUSED_02_OFF_SET),
    dip("Unknown SW2:3", PortId::Dsw2, 0x04, 0x00, "SW2:3", UNUSED_04_OFF_CLEAR),
    dip("Unknown SW2:4", PortId::Dsw2, 0x08, 0x08, "SW2:4", UNUSED_08_OFF_SET),
    dip("Allow Continue", PortId::Dsw2, 0x10, 0x00, "SW2:5", ALLOW_CONTINUE),
    dip("Difficulty", PortId::Dsw2, 0x60, 0x60, "SW2:6,7", DIFFICULTY),
    dip("Demo Sounds", PortId::Dsw2, 0x80, 0x00, "SW2:8", DEMO_SOUNDS),
];

/// Switch table for a board.
#[must_use]
pub const fn dip_switches(board: BoardKind) -> &'static [DipSwitch] {
    match board {
        BoardKind::Konami => KONAMI_DIPS,
        BoardKind::Bootleg => BOOTLEG_DIPS,
    }
}

/// Current positions of every switch on a board.
#[derive(Debug, Clone)]
pub struct DipBank {
    switches: &'static [DipSwitch],
    values: Vec<u8>,
}

impl DipBank {
    /// All switches at their factory defaults.
    #[must_use]
    pub fn new(board: BoardKind) -> Self {
        let switches = dip_switches(board);
        Self {
            switches,
            values: switches.iter().map(|d| d.default).collect(),
        }
    }

    /// The switch definitions.
    #[must_use]
    pub fn switches(&self) -> &'static [DipSwitch] {
        self.switches
    }

    fn index_of(&self, name: &str) -> Result<usize, DipError> {
        self.switches
            .iter()
            .position(|d| d.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DipError::UnknownSwitch(name.to_string()))
    }

    /// Select a setting by switch name and setting label.
    pub fn set(&mut self, name: &str, label: &str) -> Result<(), DipError> {
        let index = self.index_of(name)?;
        let switch = &self.switches[index];
        let setting = switch.setting(label).ok_or_else(|| DipError::UnknownSetting {
            switch: switch.name.to_string(),
            setting: label.to_string(),
        })?;
        self.values[index] = setting.value;
        Ok(())
    }

    /// Label of the current setting of a switch.
    #[must_use]
    pub fn current(&self, name: &str) -> Option<&'static str> {
        let index = self.index_of(name).ok()?;
        let value = self.values[index];
        self.switches[index]
            .settings
            .iter()
            .find(|s| s.value == value)
            .map(|s| s.label)
    }

    /// Bits contributed to a port: `(mask, value)`.
    #[must_use]
    pub fn port_bits(&self, port: PortId) -> (u8, u8) {
        self.switches
            .iter()
            .zip(&self.values)
            .filter(|(d, _)| d.port == port)
            .fold((0, 0), |(mask, value), (d, &v)| {
                (mask | d.mask, value | (v & d.mask))
            })
    }

    /// Return every switch to its default.
    pub fn reset_defaults(&mut self) {
        for (value, switch) in self.values.iter_mut().zip(self.switches) {
            *value = switch.default;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fit_their_masks() {
        for table in [KONAMI_DIPS, BOOTLEG_DIPS] {
            for d in table {
                assert!(d.settings.iter().any(|s| s.value == d.default), "{}", d.name);
                for setting in d.settings {
                    assert_eq!(setting.value & !d.mask, 0, "{}: {}", d.name, setting.label);
                }
            }
        }
    }

    #[test]
    fn switches_on_a_port_do_not_overlap() {
        for table in [KONAMI_DIPS, BOOTLEG_DIPS] {
            for port in [PortId::Dsw1, PortId::Dsw2, PortId::Dsw3] {
                let mut seen = 0u8;
                for d in table.iter().filter(|d| d.port == port) {
                    assert_eq!(seen & d.mask, 0, "{} overlaps", d.name);
                    seen |= d.mask;
                }
            }
        }
    }

    #[test]
    fn default_port_values() {
        let konami = DipBank::new(BoardKind::Konami);
        assert_eq!(konami.port_bits(PortId::Dsw1), (0xFF, 0xFF));
        assert_eq!(konami.port_bits(PortId::Dsw2), (0xFF, 0x7B));
        assert_eq!(konami.port_bits(PortId::Dsw3), (0xF0, 0x50));

        let bootleg = DipBank::new(BoardKind::Bootleg);
        assert_eq!(bootleg.port_bits(PortId::Dsw2), (0xFF, 0x6B));
        assert_eq!(bootleg.port_bits(PortId::Dsw3), (0x00, 0x00));
    }

    #[test]
    fn set_and_read_back() {
        let mut dips = DipBank::new(BoardKind::Konami);
        dips.set("difficulty", "very difficult").unwrap();
        assert_eq!(dips.current("Difficulty"), Some("Very Difficult"));
        assert_eq!(dips.port_bits(PortId::Dsw2).1 & 0x60, 0x00);

        dips.set("Coin A", "Free Play").unwrap();
        assert_eq!(dips.port_bits(PortId::Dsw1).1, 0xF0);

        dips.reset_defaults();
        assert_eq!(dips.current("Coin A"), Some("1 Coin/1 Credit"));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut dips = DipBank::new(BoardKind::Bootleg);
        assert_eq!(
            dips.set("Flip Screen", "On"),
            Err(DipError::UnknownSwitch("Flip Screen".to_string()))
        );
        assert!(matches!(
            dips.set("Allow Continue", "Maybe"),
            Err(DipError::UnknownSetting { .. })
        ));
    }
}
