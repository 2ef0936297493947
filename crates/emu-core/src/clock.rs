//! Clock configuration and cross-clock conversion.

use crate::Ticks;

/// A processor or crystal clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Frequency in Hz (e.g., `3_579_545` for an NTSC colourburst Z80).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// Ticks in one interleave slice of `1 / slice_hz` seconds.
    #[must_use]
    pub const fn ticks_per_slice(&self, slice_hz: u64) -> Ticks {
        Ticks::new(self.frequency_hz / slice_hz)
    }
}

/// Converts cycle counts of one clock into cycles of another.
///
/// The fractional part of each conversion is carried into the next one, so
/// a long run of conversions never drifts: converting one second's worth of
/// source cycles in any number of pieces yields exactly one second of target
/// cycles.
#[derive(Debug, Clone)]
pub struct SliceClock {
    from_hz: u64,
    to_hz: u64,
    remainder: u64,
}

impl SliceClock {
    #[must_use]
    pub const fn new(from: MasterClock, to: MasterClock) -> Self {
        Self {
            from_hz: from.frequency_hz,
            to_hz: to.frequency_hz,
            remainder: 0,
        }
    }

    /// Target-clock cycles that elapse during `ticks` source-clock cycles.
    pub fn convert(&mut self, ticks: Ticks) -> Ticks {
        let scaled = ticks.get() * self.to_hz + self.remainder;
        self.remainder = scaled % self.from_hz;
        Ticks::new(scaled / self.from_hz)
    }

    /// Drop any carried fraction.
    pub fn reset(&mut self) {
        self.remainder = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_length_at_1200_hz() {
        let main = MasterClock::new(3_000_000);
        assert_eq!(main.ticks_per_slice(1200), Ticks::new(2500));
    }

    #[test]
    fn conversion_carries_fraction() {
        let main = MasterClock::new(3_000_000);
        let audio = MasterClock::new(3_579_545);
        let mut clock = SliceClock::new(main, audio);

        let mut total = Ticks::ZERO;
        for _ in 0..1200 {
            total += clock.convert(Ticks::new(2500));
        }
        assert_eq!(total, Ticks::new(3_579_545));
    }

    #[test]
    fn reset_drops_fraction() {
        let mut clock = SliceClock::new(MasterClock::new(3), MasterClock::new(2));
        assert_eq!(clock.convert(Ticks::new(1)), Ticks::ZERO);
        clock.reset();
        assert_eq!(clock.convert(Ticks::new(1)), Ticks::ZERO);
        assert_eq!(clock.convert(Ticks::new(1)), Ticks::new(1));
    }
}
