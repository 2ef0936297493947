//! Protection multiplier at $0200-$0206.
//!
//! Two operand latches and a 16-bit product readable a byte at a time.
//! The game writes 0x3F to $0206 before every use; it has no effect.

use emu_core::Stateful;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protection {
    operands: [u8; 2],
}

impl Protection {
    #[must_use]
    pub const fn new() -> Self {
        Self { operands: [0; 2] }
    }

    #[must_use]
    pub const fn operands(&self) -> [u8; 2] {
        self.operands
    }

    /// Write operand `offset` (0 or 1).
    pub fn write(&mut self, offset: usize, value: u8) {
        self.operands[offset & 1] = value;
    }

    /// Offset 0 reads the low byte of the product, 1 the high byte.
    #[must_use]
    pub const fn read(&self, offset: usize) -> u8 {
        let product = self.operands[0] as u16 * self.operands[1] as u16;
        (product >> ((offset & 1) * 8)) as u8
    }

    pub fn clock(&mut self, _value: u8) {}
}

impl Stateful for Protection {
    type State = [u8; 2];

    fn reset(&mut self) {
        self.operands = [0; 2];
    }

    fn snapshot(&self) -> [u8; 2] {
        self.operands
    }

    fn restore(&mut self, state: &[u8; 2]) {
        self.operands = *state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_bytes() {
        let mut p = Protection::new();
        p.write(0, 0xFF);
        p.write(1, 0xFF);
        assert_eq!(p.read(0), 0x01);
        assert_eq!(p.read(1), 0xFE);

        p.write(0, 0x12);
        p.write(1, 0x10);
        assert_eq!(p.read(0), 0x20);
        assert_eq!(p.read(1), 0x01);
    }

    #[test]
    fn clock_changes_nothing() {
        let mut p = Protection::new();
        p.write(0, 3);
        p.write(1, 7);
        p.clock(0x3F);
        assert_eq!(p.read(0), 21);
        assert_eq!(p.operands(), [3, 7]);
    }

    #[test]
    fn reset_clears_operands() {
        let mut p = Protection::new();
        p.write(0, 9);
        p.reset();
        assert_eq!(p.snapshot(), [0, 0]);
    }
}
