//! Trackball decoder for $0404-$0407.
//!
//! The cabinet's counters are free-running 8-bit values. The game wants a
//! sign bit and a 7-bit magnitude, so the board latches a delta whenever
//! the first port of the group is read.

use emu_core::Stateful;
use serde::{Deserialize, Serialize};

/// Raw value of an axis with nothing connected.
pub const ABSENT_AXIS: u8 = 0xFF;

/// Latched position and direction of the four axes
/// (P1 Y, P1 X, P2 Y, P2 X).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trackball {
    pub(crate) pos: [u8; 4],
    pub(crate) sign: [bool; 4],
}

pub type TrackballState = Trackball;

impl Trackball {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: [0; 4],
            sign: [false; 4],
        }
    }

    #[must_use]
    pub const fn positions(&self) -> [u8; 4] {
        self.pos
    }

    #[must_use]
    pub const fn signs(&self) -> [bool; 4] {
        self.sign
    }

    /// Read port `offset` (0-3). Offset 0 resamples all four counters first.
    pub fn read(&mut self, offset: usize, samples: [Option<u8>; 4]) -> u8 {
        let offset = offset & 3;
        if offset == 0 {
            self.sample(samples);
        }
        self.port(offset)
    }

    /// Port value without resampling.
    #[must_use]
    pub const fn port(&self, offset: usize) -> u8 {
        let sign = if self.sign[offset & 3] { 0x80 } else { 0x00 };
        sign | (self.pos[offset & 3] & 0x7F)
    }

    fn sample(&mut self, samples: [Option<u8>; 4]) {
        let mut moved = [false; 4];
        for (i, sample) in samples.into_iter().enumerate() {
            let current = sample.unwrap_or(ABSENT_AXIS);
            let delta = current.wrapping_sub(self.pos[i]);
            moved[i] = delta != 0;
            self.sign[i] = delta & 0x80 != 0;
            self.pos[i] = current;
        }

        // A stationary axis takes its direction from its partner so that
        // straight-line movement reads as a consistent quadrant.
        for (y, x) in [(0, 1), (2, 3)] {
            if moved[y] || moved[x] {
                if !moved[y] {
                    self.sign[y] = !self.sign[x];
                }
                if !moved[x] {
                    self.sign[x] = self.sign[y];
                }
            }
        }
    }
}

impl Stateful for Trackball {
    type State = TrackballState;

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&self) -> TrackballState {
        *self
    }

    fn restore(&mut self, state: &TrackballState) {
        *self = *state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(v: [u8; 4]) -> [Option<u8>; 4] {
        v.map(Some)
    }

    #[test]
    fn pure_x_movement_sets_y_sign_opposite() {
        let mut tb = Trackball::new();
        // X forward by 5, Y still.
        let p0 = tb.read(0, samples([0, 5, 0, 0]));
        assert!(!tb.signs()[1]);
        assert!(tb.signs()[0]);
        assert_eq!(p0, 0x80);
        assert_eq!(tb.read(1, samples([0, 5, 0, 0])), 0x05);
    }

    #[test]
    fn pure_y_movement_copies_sign_to_x() {
        let mut tb = Trackball::new();
        tb.read(0, samples([0xFE, 0, 0, 0]));
        assert!(tb.signs()[0]);
        assert!(tb.signs()[1]);
        assert_eq!(tb.port(0), 0x80 | 0x7E);
        assert_eq!(tb.port(1), 0x80);
    }

    #[test]
    fn diagonal_movement_keeps_raw_signs() {
        let mut tb = Trackball::new();
        tb.read(0, samples([3, 0xFD, 0, 0]));
        let signs = tb.signs();
        assert!(!signs[0]);
        assert!(signs[1]);
    }

    #[test]
    fn idle_pair_keeps_computed_signs() {
        let mut tb = Trackball::new();
        tb.read(0, samples([0, 0, 0, 0]));
        assert_eq!(tb.signs(), [false; 4]);
    }

    #[test]
    fn absent_axes_read_as_ff() {
        let mut tb = Trackball::new();
        let v = tb.read(0, [None; 4]);
        assert_eq!(tb.positions(), [0xFF; 4]);
        assert_eq!(v, 0xFF);
        // Second read: no movement, no correction.
        tb.read(0, [None; 4]);
        assert_eq!(tb.signs(), [false; 4]);
    }

    #[test]
    fn other_offsets_do_not_resample() {
        let mut tb = Trackball::new();
        assert_eq!(tb.read(2, samples([9, 9, 9, 9])), 0x00);
        assert_eq!(tb.positions(), [0; 4]);
    }
}
