//! Sound-side latches and interrupt signalling.
//!
//! The audio chips themselves (YM2203, uPD7759 on the Konami board,
//! MSM5205 on the bootleg) are host cores. This module holds the registers
//! the two CPUs write to reach them and the handshake between the CPUs.

use emu_core::Stateful;
use serde::{Deserialize, Serialize};

use crate::config::BoardKind;

/// Main CPU → audio CPU command byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundLatch {
    pub(crate) value: u8,
    pub(crate) pending: bool,
}

impl SoundLatch {
    pub fn write(&mut self, value: u8) {
        self.value = value;
        self.pending = true;
    }

    /// Audio CPU read; acknowledges the pending byte.
    pub fn read(&mut self) -> u8 {
        self.pending = false;
        self.value
    }

    #[must_use]
    pub const fn peek(&self) -> u8 {
        self.value
    }

    #[must_use]
    pub const fn pending(&self) -> bool {
        self.pending
    }
}

/// uPD7759 ADPCM speech chip control lines (Konami board).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upd7759 {
    pub port: u8,
    /// START line, bit 1 of $9000.
    pub start: bool,
    /// RESET line, bit 0 of $C000.
    pub reset: bool,
    /// Driven by the host core.
    pub busy: bool,
}

impl Upd7759 {
    /// $B000 read.
    #[must_use]
    pub const fn busy_r(&self) -> u8 {
        self.busy as u8
    }
}

/// YM2203 register file as the audio CPU sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ym2203 {
    pub(crate) address: u8,
    #[serde(with = "register_file")]
    pub(crate) registers: [u8; 256],
    /// Busy/timer flags, driven by the host core.
    pub status: u8,
}

impl Default for Ym2203 {
    fn default() -> Self {
        Self {
            address: 0,
            registers: [0; 256],
            status: 0,
        }
    }
}

impl Ym2203 {
    /// Offset 0 selects a register, offset 1 writes it.
    pub fn write(&mut self, offset: usize, value: u8) {
        if offset & 1 == 0 {
            self.address = value;
        } else {
            // Port A output ($0E) goes nowhere on this board.
            self.registers[usize::from(self.address)] = value;
        }
    }

    /// Offset 0 reads status; offset 1 reads back SSG registers.
    #[must_use]
    pub fn read(&self, offset: usize) -> u8 {
        if offset & 1 == 0 {
            self.status
        } else if self.address < 0x10 {
            self.registers[usize::from(self.address)]
        } else {
            self.status
        }
    }

    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    #[must_use]
    pub const fn register(&self, index: u8) -> u8 {
        self.registers[index as usize]
    }
}

mod register_file {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(regs: &[u8; 256], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(regs)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 256], D::Error> {
        let bytes = Vec::<u8>::deserialize(d)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 256 register bytes"))
    }
}

/// MSM5205 ADPCM control written at $9800 (bootleg).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msm5205 {
    pub data: u8,
    pub reset: bool,
}

/// Everything between the main CPU and the sound chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sound {
    board: BoardKind,
    pub latch: SoundLatch,
    pub upd7759: Upd7759,
    pub ym2203: Ym2203,
    pub msm5205: Msm5205,
    /// Held IRQ from $0418, cleared when the audio CPU takes it.
    pub(crate) irq_held: bool,
    /// Level IRQ from the MSM5205 VCK, cleared by $A800.
    pub(crate) irq_line: bool,
    /// Rising edge of the latch's data-pending output.
    pub(crate) nmi_edge: bool,
    pub(crate) audio_bank: u8,
}

pub type SoundState = Sound;

impl Sound {
    #[must_use]
    pub fn new(board: BoardKind) -> Self {
        Self {
            board,
            latch: SoundLatch::default(),
            upd7759: Upd7759::default(),
            ym2203: Ym2203::default(),
            msm5205: Msm5205::default(),
            irq_held: false,
            irq_line: false,
            nmi_edge: false,
            audio_bank: 0,
        }
    }

    /// Main CPU write to the sound latch.
    ///
    /// On the bootleg the latch's pending output is wired to the audio
    /// CPU's NMI.
    pub fn write_latch(&mut self, value: u8) {
        let was_pending = self.latch.pending();
        self.latch.write(value);
        if self.board == BoardKind::Bootleg && !was_pending {
            self.nmi_edge = true;
        }
    }

    /// Audio CPU read of the sound latch.
    pub fn read_latch(&mut self) -> u8 {
        self.latch.read()
    }

    /// $0418: interrupt the audio CPU (Konami board).
    pub fn trigger_irq(&mut self) {
        self.irq_held = true;
    }

    /// $A800: drop the MSM5205 interrupt (bootleg).
    pub fn ack_irq(&mut self) {
        self.irq_line = false;
    }

    /// MSM5205 VCK: the host ADPCM core wants its next nibble.
    pub fn msm_vck(&mut self) {
        self.irq_line = true;
    }

    /// $9800 (bootleg): audio bank, MSM5205 reset and data nibble.
    pub fn write_msm(&mut self, value: u8) {
        self.audio_bank = value >> 7;
        self.msm5205.reset = value & 0x10 != 0;
        self.msm5205.data = value & 0x0F;
    }

    /// $9000 (Konami): uPD7759 START.
    pub fn write_upd_start(&mut self, value: u8) {
        self.upd7759.start = value & 0x02 != 0;
    }

    /// $C000 (Konami): uPD7759 RESET.
    pub fn write_upd_reset(&mut self, value: u8) {
        self.upd7759.reset = value & 0x01 != 0;
    }

    #[must_use]
    pub const fn irq_held(&self) -> bool {
        self.irq_held
    }

    /// Called once the held IRQ has been accepted.
    pub fn clear_held_irq(&mut self) {
        self.irq_held = false;
    }

    #[must_use]
    pub const fn irq_line(&self) -> bool {
        self.irq_line
    }

    /// Consume a pending NMI edge.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_edge)
    }

    /// Audio ROM bank behind $C000-$FFFF (bootleg).
    #[must_use]
    pub const fn audio_bank(&self) -> u8 {
        self.audio_bank
    }
}

impl Stateful for Sound {
    type State = SoundState;

    fn reset(&mut self) {
        *self = Self::new(self.board);
    }

    fn snapshot(&self) -> SoundState {
        *self
    }

    fn restore(&mut self, state: &SoundState) {
        let board = self.board;
        *self = *state;
        self.board = board;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_read_clears_pending() {
        let mut sound = Sound::new(BoardKind::Konami);
        sound.write_latch(0x42);
        assert!(sound.latch.pending());
        assert_eq!(sound.read_latch(), 0x42);
        assert!(!sound.latch.pending());
        assert!(!sound.take_nmi());
    }

    #[test]
    fn bootleg_latch_raises_nmi_once() {
        let mut sound = Sound::new(BoardKind::Bootleg);
        sound.write_latch(1);
        sound.write_latch(2);
        assert!(sound.take_nmi());
        assert!(!sound.take_nmi());
        sound.read_latch();
        sound.write_latch(3);
        assert!(sound.take_nmi());
    }

    #[test]
    fn msm_control_fields() {
        let mut sound = Sound::new(BoardKind::Bootleg);
        sound.write_msm(0x9A);
        assert_eq!(sound.audio_bank(), 1);
        assert!(sound.msm5205.reset);
        assert_eq!(sound.msm5205.data, 0x0A);
    }

    #[test]
    fn vck_and_ack() {
        let mut sound = Sound::new(BoardKind::Bootleg);
        sound.msm_vck();
        assert!(sound.irq_line());
        sound.ack_irq();
        assert!(!sound.irq_line());
    }

    #[test]
    fn ym2203_register_file() {
        let mut ym = Ym2203::default();
        ym.write(0, 0x07);
        ym.write(1, 0x38);
        assert_eq!(ym.read(1), 0x38);
        ym.write(0, 0x27);
        ym.write(1, 0x15);
        assert_eq!(ym.register(0x27), 0x15);
        assert_eq!(ym.read(1), 0x00);
    }

    #[test]
    fn upd_lines() {
        let mut sound = Sound::new(BoardKind::Konami);
        sound.write_upd_start(0x02);
        sound.write_upd_reset(0x00);
        assert!(sound.upd7759.start);
        assert!(!sound.upd7759.reset);
        assert_eq!(sound.upd7759.busy_r(), 0);
    }
}
