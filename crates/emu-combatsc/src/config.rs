//! Board variants and configuration.

use emu_core::{MasterClock, Ticks};
use serde::{Deserialize, Serialize};

/// Interleave quantum between the main and audio CPUs, in Hz.
///
/// The bootleg's sound CPU polls a flag in its RAM that only changes after
/// the main CPU has run; slices of 1/1200 s keep that handshake responsive.
pub const INTERLEAVE_HZ: u64 = 1200;

/// Which printed circuit board a set runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardKind {
    /// Konami GX611: HD6309 + Z80, two K007121s, YM2203 + uPD7759.
    Konami,
    /// Bootleg: HD6309 + Z80, YM2203 + MSM5205, I/O window behind the bank.
    Bootleg,
}

impl BoardKind {
    /// Main CPU clock (HD6309, 12 MHz input, 3 MHz E clock).
    #[must_use]
    pub const fn main_clock(self) -> MasterClock {
        MasterClock::new(3_000_000)
    }

    /// Audio CPU clock (Z80).
    #[must_use]
    pub const fn audio_clock(self) -> MasterClock {
        MasterClock::new(3_579_545)
    }

    /// Main CPU cycles per video frame.
    ///
    /// Konami: 8 MHz pixel clock, 528 × 256 raster (≈59.17 Hz), giving
    /// 528 × 256 × 3 / 8 = 50,688 cycles. Bootleg: a flat 60 Hz.
    #[must_use]
    pub const fn cycles_per_frame(self) -> Ticks {
        match self {
            Self::Konami => Ticks::new(528 * 256 * 3 / 8),
            Self::Bootleg => self.main_clock().ticks_per_frame(60),
        }
    }

    /// Address of the bank-select register on the main CPU bus.
    #[must_use]
    pub const fn bank_select_address(self) -> u16 {
        match self {
            Self::Konami => 0x0410,
            Self::Bootleg => 0x0500,
        }
    }
}

/// Player controls fitted to the cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    /// 8-way joysticks; $0404 reads IN1.
    Joystick,
    /// Trackballs on $0404-$0407.
    Trackball,
}

/// How complete the emulation of a set is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulationStatus {
    pub not_working: bool,
    pub imperfect_colors: bool,
    pub imperfect_sound: bool,
}

impl EmulationStatus {
    const GOOD: Self = Self {
        not_working: false,
        imperfect_colors: false,
        imperfect_sound: false,
    };

    /// True when no flag is raised.
    #[must_use]
    pub const fn is_good(self) -> bool {
        !self.not_working && !self.imperfect_colors && !self.imperfect_sound
    }
}

/// A supported ROM set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Combat School (joystick).
    Combatsc,
    /// Combat School (trackball).
    Combatsct,
    /// Combat School (Japan trackball).
    Combatscj,
    /// Boot Camp (set 1).
    Bootcamp,
    /// Boot Camp (set 2).
    Bootcampa,
    /// Combat School (bootleg).
    Combatscb,
}

impl Variant {
    pub const ALL: [Self; 6] = [
        Self::Combatsc,
        Self::Combatsct,
        Self::Combatscj,
        Self::Bootcamp,
        Self::Bootcampa,
        Self::Combatscb,
    ];

    /// Short set name, as used for ROM directories.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Combatsc => "combatsc",
            Self::Combatsct => "combatsct",
            Self::Combatscj => "combatscj",
            Self::Bootcamp => "bootcamp",
            Self::Bootcampa => "bootcampa",
            Self::Combatscb => "combatscb",
        }
    }

    /// Look a set up by its short name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Combatsc => "Combat School (joystick)",
            Self::Combatsct => "Combat School (trackball)",
            Self::Combatscj => "Combat School (Japan trackball)",
            Self::Bootcamp => "Boot Camp (set 1)",
            Self::Bootcampa => "Boot Camp (set 2)",
            Self::Combatscb => "Combat School (bootleg)",
        }
    }

    #[must_use]
    pub const fn year(self) -> u16 {
        match self {
            Self::Combatsc | Self::Combatscb => 1988,
            _ => 1987,
        }
    }

    #[must_use]
    pub const fn manufacturer(self) -> &'static str {
        match self {
            Self::Combatscb => "bootleg",
            _ => "Konami",
        }
    }

    /// Parent set for clones. `combatsc` is the parent of every other set.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Combatsc => None,
            _ => Some(Self::Combatsc),
        }
    }

    #[must_use]
    pub const fn board(self) -> BoardKind {
        match self {
            Self::Combatscb => BoardKind::Bootleg,
            _ => BoardKind::Konami,
        }
    }

    #[must_use]
    pub const fn controls(self) -> ControlKind {
        match self {
            Self::Combatsc | Self::Combatscb => ControlKind::Joystick,
            _ => ControlKind::Trackball,
        }
    }

    /// Whether $0404 is rebound from the trackball to IN1.
    ///
    /// Only the Konami joystick set does this; the bootleg reads its
    /// joysticks through the I/O window instead.
    #[must_use]
    pub const fn joystick_on_trackball_port(self) -> bool {
        matches!(self, Self::Combatsc)
    }

    #[must_use]
    pub const fn status(self) -> EmulationStatus {
        match self {
            Self::Combatsc => EmulationStatus::GOOD,
            Self::Combatscb => EmulationStatus {
                not_working: false,
                imperfect_colors: true,
                imperfect_sound: true,
            },
            _ => EmulationStatus {
                not_working: true,
                imperfect_colors: false,
                imperfect_sound: false,
            },
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for building a board.
#[derive(Debug, Clone)]
pub struct CombatSchoolConfig {
    /// Which set to emulate.
    pub variant: Variant,
    /// Fail instead of warning when a ROM is missing or mismatched.
    pub strict_roms: bool,
    /// DIP switch overrides as `(switch name, setting label)` pairs.
    pub dips: Vec<(String, String)>,
}

impl CombatSchoolConfig {
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            strict_roms: false,
            dips: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for v in Variant::ALL {
            assert_eq!(Variant::from_name(v.name()), Some(v));
        }
        assert_eq!(Variant::from_name("COMBATSCB"), Some(Variant::Combatscb));
        assert_eq!(Variant::from_name("contra"), None);
    }

    #[test]
    fn only_the_bootleg_uses_the_bootleg_board() {
        for v in Variant::ALL {
            assert_eq!(v.board() == BoardKind::Bootleg, v == Variant::Combatscb);
        }
    }

    #[test]
    fn frame_lengths() {
        assert_eq!(BoardKind::Konami.cycles_per_frame(), Ticks::new(50_688));
        assert_eq!(BoardKind::Bootleg.cycles_per_frame(), Ticks::new(50_000));
    }

    #[test]
    fn trackball_sets_are_flagged_not_working() {
        assert!(Variant::Combatsc.status().is_good());
        assert!(Variant::Bootcamp.status().not_working);
        assert!(Variant::Combatscb.status().imperfect_sound);
    }
}
