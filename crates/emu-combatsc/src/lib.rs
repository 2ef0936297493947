//! Konami Combat School / Boot Camp (GX611) arcade board.
//!
//! The board pairs an HD6309 main CPU with a Z80 sound CPU. Everything
//! between them is modelled here: banked program ROM, two K007121 video
//! circuits sharing one CPU window, the trackball decoder, the protection
//! multiplier, the sound latch and the bootleg board's I/O window. CPU and
//! sound-chip cores are supplied by the host through [`emu_core::Cpu`].
//!
//! Six sets are supported, five on the Konami board and one bootleg; see
//! [`Variant`].

pub mod banking;
mod board;
pub mod bus;
mod combatsc;
mod config;
pub mod dipswitch;
mod error;
pub mod gfx;
pub mod input;
#[cfg(feature = "native")]
pub mod mcp;
pub mod protection;
pub mod romset;
pub mod snapshot;
pub mod sound;
pub mod trackball;
pub mod video;

pub use banking::{BankSelector, VideoCircuit, WindowMode};
pub use board::Board;
pub use bus::{MainBus, SoundBus};
pub use combatsc::CombatSchool;
pub use config::{
    BoardKind, CombatSchoolConfig, ControlKind, EmulationStatus, INTERLEAVE_HZ, Variant,
};
pub use error::{DipError, Error, RomError, SnapshotError};
pub use input::{Button, InputQueue, PortId, TrackballAxis};
pub use romset::{DirectorySource, LoadedRoms, MemorySource, RomReport, RomSource};
pub use snapshot::BoardSnapshot;
