//! Bank-select register.
//!
//! The main CPU sees one 16 KiB window at $4000-$7FFF. A control byte picks
//! which of ten ROM banks appears there, which of the two K007121 circuits
//! the $2000 page and scroll registers talk to, and (on the Konami board)
//! the tilemap priority.
//!
//! On the bootleg the value 0x1F also turns the window into an I/O area.

use emu_core::Stateful;
use serde::{Deserialize, Serialize};

/// Number of switchable ROM banks.
pub const BANK_COUNT: usize = 10;
/// Size of one bank.
pub const BANK_SIZE: usize = 0x4000;
/// Offset of bank 0 within the main CPU region.
pub const BANK_BASE: usize = 0x10000;

/// Value of `last_select` after reset, never produced by a masked write.
const SELECT_SENTINEL: u8 = 0xFF;

/// One of the two video circuits (K007121 + page + scroll table).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCircuit {
    #[default]
    Zero,
    One,
}

impl VideoCircuit {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }

    /// Circuit selected by bit 6 of a control byte.
    #[must_use]
    pub const fn from_bit6(value: u8) -> Self {
        if value & 0x40 != 0 { Self::One } else { Self::Zero }
    }
}

/// What the $4000-$7FFF window does on the bootleg board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMode {
    /// Read-only banked ROM; writes are dropped.
    #[default]
    BankedRom,
    /// Writes go to the I/O dispatcher, $4400-$4403 read the input ports.
    IoWindow,
}

/// Decoded fields of a bank-select byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankControl {
    pub circuit: VideoCircuit,
    pub priority: bool,
    pub bank: u8,
}

/// Split a control byte into circuit, priority and bank number.
///
/// Bit 4 set selects one of banks 0-7 from bits 1-3; clear selects bank 8
/// or 9 from bit 0.
#[must_use]
pub const fn decode(value: u8) -> BankControl {
    let bank = if value & 0x10 != 0 {
        (value & 0x0E) >> 1
    } else {
        8 + (value & 0x01)
    };
    BankControl {
        circuit: VideoCircuit::from_bit6(value),
        priority: value & 0x20 != 0,
        bank,
    }
}

/// Byte offset of a bank within the main CPU region.
#[must_use]
pub const fn bank_offset(bank: u8) -> usize {
    BANK_BASE + bank as usize * BANK_SIZE
}

/// Banked-window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSelector {
    pub(crate) last_select: u8,
    pub(crate) bank: u8,
    pub(crate) window: WindowMode,
}

/// Serializable copy of [`BankSelector`].
pub type BankState = BankSelector;

/// Effect of a bootleg bank write that the board must apply to video state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootlegSelect {
    pub circuit: VideoCircuit,
    /// False when the masked value repeated and nothing but the page moved.
    pub changed: bool,
}

impl BankSelector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_select: SELECT_SENTINEL,
            bank: 8,
            window: WindowMode::BankedRom,
        }
    }

    #[must_use]
    pub const fn bank(&self) -> u8 {
        self.bank
    }

    #[must_use]
    pub const fn window(&self) -> WindowMode {
        self.window
    }

    #[must_use]
    pub const fn last_select(&self) -> u8 {
        self.last_select
    }

    /// Offset of the mapped bank within the main CPU region.
    #[must_use]
    pub const fn offset(&self) -> usize {
        bank_offset(self.bank)
    }

    /// Konami board write to $0410. The caller applies circuit and priority.
    pub fn write_konami(&mut self, value: u8) -> BankControl {
        let control = decode(value);
        self.bank = control.bank;
        log::debug!("bank select {value:#04x} -> bank {}", control.bank);
        control
    }

    /// Bootleg write to $0500.
    ///
    /// Bit 6 always rebinds the page. The rest only acts when the low five
    /// bits differ from the previous write; 0x1F maps bank 9 and opens the
    /// I/O window.
    pub fn write_bootleg(&mut self, value: u8) -> BootlegSelect {
        let circuit = VideoCircuit::from_bit6(value);
        let masked = value & 0x1F;
        if masked == self.last_select {
            return BootlegSelect {
                circuit,
                changed: false,
            };
        }
        self.last_select = masked;
        let window = if masked == 0x1F {
            // The I/O configuration reads through bank 9 regardless of bit 4.
            self.bank = 9;
            WindowMode::IoWindow
        } else {
            self.bank = decode(masked).bank;
            WindowMode::BankedRom
        };
        if window != self.window {
            log::debug!("bootleg window -> {window:?}");
        }
        self.window = window;
        BootlegSelect {
            circuit,
            changed: true,
        }
    }
}

impl Default for BankSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Stateful for BankSelector {
    type State = BankState;

    /// Sentinel select value, bank 8, plain ROM window.
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&self) -> BankState {
        *self
    }

    fn restore(&mut self, state: &BankState) {
        *self = *state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_bank_formula() {
        assert_eq!(decode(0x00).bank, 8);
        assert_eq!(decode(0x01).bank, 9);
        assert_eq!(decode(0x10).bank, 0);
        assert_eq!(decode(0x1E).bank, 7);
        assert_eq!(decode(0x1F).bank, 7);
        assert_eq!(decode(0x13).bank, 1);
    }

    #[test]
    fn decode_circuit_and_priority() {
        let c = decode(0x60);
        assert_eq!(c.circuit, VideoCircuit::One);
        assert!(c.priority);
        let c = decode(0x9F);
        assert_eq!(c.circuit, VideoCircuit::Zero);
        assert!(!c.priority);
    }

    #[test]
    fn bank_offsets() {
        assert_eq!(bank_offset(0), 0x10000);
        assert_eq!(bank_offset(9), 0x34000);
        assert!(bank_offset(9) + BANK_SIZE <= 0x38000);
    }

    #[test]
    fn bootleg_io_window_toggles() {
        let mut sel = BankSelector::new();
        let r = sel.write_bootleg(0x1F);
        assert!(r.changed);
        assert_eq!(sel.window(), WindowMode::IoWindow);
        assert_eq!(sel.bank(), 9);

        sel.write_bootleg(0x10);
        assert_eq!(sel.window(), WindowMode::BankedRom);
        assert_eq!(sel.bank(), 0);
    }

    #[test]
    fn bootleg_repeat_write_only_moves_page() {
        let mut sel = BankSelector::new();
        sel.write_bootleg(0x12);
        let r = sel.write_bootleg(0x52);
        assert!(!r.changed);
        assert_eq!(r.circuit, VideoCircuit::One);
        assert_eq!(sel.bank(), 1);
    }

    #[test]
    fn reset_restores_sentinel() {
        let mut sel = BankSelector::new();
        sel.write_bootleg(0x1F);
        sel.reset();
        assert_eq!(sel.last_select(), 0xFF);
        assert_eq!(sel.window(), WindowMode::BankedRom);
        assert_eq!(sel.bank(), 8);
    }
}
