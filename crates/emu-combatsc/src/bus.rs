//! Main-CPU and audio-CPU address maps.
//!
//! Each bus view borrows the board for the duration of a CPU slice.
//! Addresses are first decoded to a target, then the target is read or
//! written; `peek` reuses the decode without side effects.
//!
//! Konami main CPU:
//! ```text
//! $0000-$0007  K007121 control (W)     $0404-$0407  trackball / IN1
//! $001F        reads 0                 $0408        coin counters
//! $0020-$005F  scroll RAM              $040C        video register
//! $0200-$0201  protection multiplier   $0410        bank select
//! $0206        protection clock        $0414        sound latch
//! $0400-$0403  IN0 DSW3 DSW1 DSW2      $0418        audio IRQ
//! $041C        watchdog                $0600-$06FF  palette
//! $0800-$1FFF  RAM                     $2000-$3FFF  video page
//! $4000-$7FFF  banked ROM              $8000-$FFFF  ROM
//! ```
//!
//! The bootleg replaces everything below $0500 with RAM, moves bank select
//! to $0500 and reaches I/O through the banked window.

#![allow(clippy::cast_possible_truncation)]

use emu_core::Bus;

use crate::banking::WindowMode;
use crate::board::Board;
use crate::config::BoardKind;
use crate::input::PortId;

/// Where a main-CPU address lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainTarget {
    Control(usize),
    Zero,
    Scroll(usize),
    Protection(usize),
    ProtectionClock,
    Port(PortId),
    Trackball(usize),
    CoinCounter,
    VideoRegister,
    BankSelect,
    SoundLatch,
    AudioIrq,
    Watchdog,
    LowRam(usize),
    Palette(usize),
    WorkRam(usize),
    Video(usize),
    Window(usize),
    Rom(usize),
    Unmapped,
}

fn decode_main(kind: BoardKind, addr: u16) -> MainTarget {
    use MainTarget as T;
    let a = usize::from(addr);
    match (kind, addr) {
        (BoardKind::Konami, 0x0000..=0x0007) => T::Control(a),
        (BoardKind::Konami, 0x001F) => T::Zero,
        (BoardKind::Konami, 0x0020..=0x005F) => T::Scroll(a - 0x20),
        (BoardKind::Konami, 0x0200..=0x0201) => T::Protection(a - 0x200),
        (BoardKind::Konami, 0x0206) => T::ProtectionClock,
        (BoardKind::Konami, 0x0400) => T::Port(PortId::In0),
        (BoardKind::Konami, 0x0401) => T::Port(PortId::Dsw3),
        (BoardKind::Konami, 0x0402) => T::Port(PortId::Dsw1),
        (BoardKind::Konami, 0x0403) => T::Port(PortId::Dsw2),
        (BoardKind::Konami, 0x0404..=0x0407) => T::Trackball(a - 0x404),
        (BoardKind::Konami, 0x0408) => T::CoinCounter,
        (BoardKind::Konami, 0x040C) => T::VideoRegister,
        (BoardKind::Konami, 0x0410) => T::BankSelect,
        (BoardKind::Konami, 0x0414) => T::SoundLatch,
        (BoardKind::Konami, 0x0418) => T::AudioIrq,
        (BoardKind::Konami, 0x041C) => T::Watchdog,
        (BoardKind::Bootleg, 0x0000..=0x04FF) => T::LowRam(a),
        (BoardKind::Bootleg, 0x0500) => T::BankSelect,
        (_, 0x0600..=0x06FF) => T::Palette(a - 0x600),
        (_, 0x0800..=0x1FFF) => T::WorkRam(a - 0x800),
        (_, 0x2000..=0x3FFF) => T::Video(a - 0x2000),
        (_, 0x4000..=0x7FFF) => T::Window(a - 0x4000),
        (_, 0x8000..=0xFFFF) => T::Rom(a),
        _ => T::Unmapped,
    }
}

/// Main CPU (HD6309) view of the board.
pub struct MainBus<'a> {
    board: &'a mut Board,
}

impl<'a> MainBus<'a> {
    pub fn new(board: &'a mut Board) -> Self {
        Self { board }
    }

    /// Read without side effects: the trackball does not resample.
    #[must_use]
    pub fn peek(board: &Board, addr: u16) -> u8 {
        match decode_main(board.kind(), addr) {
            MainTarget::Trackball(offset) => board.trackball_peek(offset),
            target => read_plain(board, target).unwrap_or(0),
        }
    }
}

/// Reads that need only shared access. `None` for targets with read side
/// effects.
fn read_plain(board: &Board, target: MainTarget) -> Option<u8> {
    let value = match target {
        MainTarget::Zero | MainTarget::BankSelect => 0,
        MainTarget::Scroll(offset) => board.video.read_scroll(offset),
        MainTarget::Protection(offset) => board.protection.read(offset),
        MainTarget::Port(port) => board.input.read(port),
        MainTarget::LowRam(offset) => board.low_ram[offset],
        MainTarget::Palette(offset) => board.palette[offset],
        MainTarget::WorkRam(offset) => board.work_ram[offset],
        MainTarget::Video(offset) => board.video.read_page(offset),
        MainTarget::Window(offset) => match board.window_mode() {
            WindowMode::IoWindow if (0x400..=0x403).contains(&offset) => {
                board.bootleg_io_read(offset - 0x400)
            }
            _ => board.banked_rom(offset),
        },
        MainTarget::Rom(addr) => board.main_rom(addr),
        MainTarget::Trackball(_) => return None,
        MainTarget::Control(_)
        | MainTarget::ProtectionClock
        | MainTarget::CoinCounter
        | MainTarget::VideoRegister
        | MainTarget::SoundLatch
        | MainTarget::AudioIrq
        | MainTarget::Watchdog
        | MainTarget::Unmapped => 0xFF,
    };
    Some(value)
}

impl Bus for MainBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        let target = decode_main(self.board.kind(), addr);
        match target {
            MainTarget::Trackball(offset) => self.board.trackball_read(offset),
            _ => read_plain(self.board, target).unwrap_or(0xFF),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        let board = &mut *self.board;
        match decode_main(board.kind(), addr) {
            MainTarget::Control(offset) => board.video.write_control(offset, value),
            MainTarget::Scroll(offset) => board.video.write_scroll(offset, value),
            MainTarget::Protection(offset) => board.protection.write(offset, value),
            MainTarget::ProtectionClock => board.protection.clock(value),
            MainTarget::CoinCounter => board.coins.write(value),
            MainTarget::VideoRegister => {
                board.video.write_vreg(value);
            }
            MainTarget::BankSelect => match board.kind() {
                BoardKind::Konami => board.bank_select_konami(value),
                BoardKind::Bootleg => board.bank_select_bootleg(value),
            },
            MainTarget::SoundLatch => board.sound.write_latch(value),
            MainTarget::AudioIrq => board.sound.trigger_irq(),
            MainTarget::Watchdog => board.kick_watchdog(),
            MainTarget::LowRam(offset) => board.low_ram[offset] = value,
            MainTarget::Palette(offset) => board.palette[offset] = value,
            MainTarget::WorkRam(offset) => board.work_ram[offset] = value,
            MainTarget::Video(offset) => board.video.write_page(offset, value),
            MainTarget::Window(offset) => {
                if board.window_mode() == WindowMode::IoWindow {
                    board.bootleg_io_write(offset, value);
                }
            }
            MainTarget::Zero
            | MainTarget::Port(_)
            | MainTarget::Trackball(_)
            | MainTarget::Rom(_)
            | MainTarget::Unmapped => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Audio CPU
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SoundTarget {
    Rom(usize),
    Ram(usize),
    UpdStart,
    UpdPort,
    UpdBusy,
    UpdReset,
    Latch,
    Ym2203(usize),
    /// Bootleg read-only YM2203 mirror at $9008.
    Ym2203Mirror(usize),
    Msm,
    IrqAck,
    BankedRom(usize),
    Unmapped,
}

fn decode_sound(kind: BoardKind, addr: u16) -> SoundTarget {
    use SoundTarget as T;
    let a = usize::from(addr);
    match (kind, addr) {
        (_, 0x0000..=0x7FFF) => T::Rom(a),
        (_, 0x8000..=0x87FF) => T::Ram(a - 0x8000),
        (BoardKind::Konami, 0x9000) => T::UpdStart,
        (BoardKind::Konami, 0xA000) => T::UpdPort,
        (BoardKind::Konami, 0xB000) => T::UpdBusy,
        (BoardKind::Konami, 0xC000) => T::UpdReset,
        (BoardKind::Konami, 0xD000) => T::Latch,
        (BoardKind::Konami, 0xE000..=0xE001) => T::Ym2203(a - 0xE000),
        (BoardKind::Bootleg, 0x9000..=0x9001) => T::Ym2203(a - 0x9000),
        (BoardKind::Bootleg, 0x9008..=0x9009) => T::Ym2203Mirror(a - 0x9008),
        (BoardKind::Bootleg, 0x9800) => T::Msm,
        (BoardKind::Bootleg, 0xA000) => T::Latch,
        (BoardKind::Bootleg, 0xA800) => T::IrqAck,
        (BoardKind::Bootleg, 0xC000..=0xFFFF) => T::BankedRom(a - 0xC000),
        _ => T::Unmapped,
    }
}

/// Audio CPU (Z80) view of the board.
pub struct SoundBus<'a> {
    board: &'a mut Board,
}

impl<'a> SoundBus<'a> {
    pub fn new(board: &'a mut Board) -> Self {
        Self { board }
    }

    /// Read without acknowledging the sound latch.
    #[must_use]
    pub fn peek(board: &Board, addr: u16) -> u8 {
        match decode_sound(board.kind(), addr) {
            SoundTarget::Latch => board.sound.latch.peek(),
            target => sound_read_plain(board, target),
        }
    }
}

fn sound_read_plain(board: &Board, target: SoundTarget) -> u8 {
    match target {
        SoundTarget::Rom(addr) => board.audio_rom(addr),
        SoundTarget::Ram(offset) => board.audio_ram[offset],
        SoundTarget::UpdBusy => board.sound.upd7759.busy_r(),
        SoundTarget::Ym2203(offset) | SoundTarget::Ym2203Mirror(offset) => {
            board.sound.ym2203.read(offset)
        }
        SoundTarget::BankedRom(offset) => board.banked_audio_rom(offset),
        SoundTarget::Latch => board.sound.latch.peek(),
        SoundTarget::UpdStart
        | SoundTarget::UpdPort
        | SoundTarget::UpdReset
        | SoundTarget::Msm
        | SoundTarget::IrqAck
        | SoundTarget::Unmapped => 0xFF,
    }
}

impl Bus for SoundBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        match decode_sound(self.board.kind(), addr) {
            SoundTarget::Latch => self.board.sound.read_latch(),
            target => sound_read_plain(self.board, target),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        let target = decode_sound(self.board.kind(), addr);
        let sound = &mut self.board.sound;
        match target {
            SoundTarget::Ram(offset) => self.board.audio_ram[offset] = value,
            SoundTarget::UpdStart => sound.write_upd_start(value),
            SoundTarget::UpdPort => sound.upd7759.port = value,
            SoundTarget::UpdReset => sound.write_upd_reset(value),
            SoundTarget::Ym2203(offset) => sound.ym2203.write(offset, value),
            SoundTarget::Msm => sound.write_msm(value),
            SoundTarget::IrqAck => sound.ack_irq(),
            SoundTarget::Rom(_)
            | SoundTarget::Latch
            | SoundTarget::UpdBusy
            | SoundTarget::Ym2203Mirror(_)
            | SoundTarget::BankedRom(_)
            | SoundTarget::Unmapped => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CombatSchoolConfig, Variant};
    use crate::romset::LoadedRoms;

    fn board(variant: Variant) -> Board {
        let mut roms = LoadedRoms::blank(variant);
        let mut main: Vec<u8> = (0..0x40000usize).map(|i| (i >> 14) as u8).collect();
        main[0x8000] = 0x5A;
        roms.set_region("maincpu", main);
        let audio: Vec<u8> = (0..0x10000usize).map(|i| (i >> 14) as u8 | 0x80).collect();
        roms.set_region("audiocpu", audio);
        Board::new(&CombatSchoolConfig::new(variant), roms).unwrap()
    }

    #[test]
    fn konami_ports() {
        let mut b = board(Variant::Combatsct);
        let mut bus = b.main_bus();
        assert_eq!(bus.read(0x0400), 0xFF);
        assert_eq!(bus.read(0x0401), 0x5F);
        assert_eq!(bus.read(0x0403), 0x7B);
        assert_eq!(bus.read(0x001F), 0x00);
        assert_eq!(bus.read(0x0410), 0x00);
    }

    #[test]
    fn konami_bank_switching() {
        let mut b = board(Variant::Combatsc);
        let mut bus = b.main_bus();
        // Bank 8 after reset: region offset 0x30000, tagged 0x0C.
        assert_eq!(bus.read(0x4000), 0x0C);
        bus.write(0x0410, 0x12);
        // Bank 1: 0x14000.
        assert_eq!(bus.read(0x4000), 0x05);
        assert_eq!(bus.read(0x8000), 0x5A);
        // Window writes are dropped.
        bus.write(0x4000, 0x99);
        assert_eq!(bus.read(0x4000), 0x05);
    }

    #[test]
    fn konami_circuit_switch_rebinds_scroll() {
        let mut b = board(Variant::Combatsc);
        let mut bus = b.main_bus();
        bus.write(0x0020, 0x11);
        bus.write(0x2000, 0x22);
        bus.write(0x0410, 0x40);
        assert_eq!(bus.read(0x0020), 0x00);
        assert_eq!(bus.read(0x2000), 0x00);
        bus.write(0x0410, 0x00);
        assert_eq!(bus.read(0x0020), 0x11);
        assert_eq!(bus.read(0x2000), 0x22);
    }

    #[test]
    fn protection_through_bus() {
        let mut b = board(Variant::Combatsc);
        let mut bus = b.main_bus();
        bus.write(0x0206, 0x3F);
        bus.write(0x0200, 200);
        bus.write(0x0201, 100);
        assert_eq!(bus.read(0x0200), (20_000u16 & 0xFF) as u8);
        assert_eq!(bus.read(0x0201), (20_000u16 >> 8) as u8);
    }

    #[test]
    fn bootleg_io_window() {
        let mut b = board(Variant::Combatscb);
        {
            let mut bus = b.main_bus();
            bus.write(0x0500, 0x1F);
            assert_eq!(bus.read(0x4400), 0xFF);
            assert_eq!(bus.read(0x4403), 0x6B);
            // Outside the port range the window still reads bank 9.
            assert_eq!(bus.read(0x4000), 0x0D);
            bus.write(0x4C00, 0x21);
            bus.write(0x4800, 0x42);
            bus.write(0x4123, 0x77);
            bus.write(0x4400, 0x60);
        }
        assert_eq!(b.video.vreg(), 0x21);
        assert_eq!(b.sound.latch.peek(), 0x42);
        assert_eq!(b.io_ram()[0x123], 0x77);
        assert!(b.video.priority());
        assert_eq!(b.video.scroll_circuit().index(), 1);

        let mut bus = b.main_bus();
        bus.write(0x0500, 0x10);
        assert_eq!(bus.read(0x4400), 0x04);
        bus.write(0x4123, 0x00);
        drop(bus);
        assert_eq!(b.io_ram()[0x123], 0x77);
    }

    #[test]
    fn bootleg_low_ram_and_no_konami_registers() {
        let mut b = board(Variant::Combatscb);
        let mut bus = b.main_bus();
        bus.write(0x0410, 0x12);
        assert_eq!(bus.read(0x0410), 0x12);
        bus.write(0x0000, 0x33);
        assert_eq!(bus.read(0x0000), 0x33);
        drop(bus);
        assert_eq!(b.bank.bank(), 8);
        assert_eq!(b.video.control_registers(crate::banking::VideoCircuit::Zero)[0], 0);
    }

    #[test]
    fn konami_sound_map() {
        let mut b = board(Variant::Combatsc);
        b.main_bus().write(0x0414, 0x81);
        b.main_bus().write(0x0418, 0x00);
        assert!(b.sound.irq_held());
        let mut bus = b.sound_bus();
        assert_eq!(bus.read(0xD000), 0x81);
        bus.write(0xE000, 0x07);
        bus.write(0xE001, 0x3F);
        assert_eq!(bus.read(0xE001), 0x3F);
        bus.write(0x9000, 0x02);
        bus.write(0xA000, 0x12);
        assert_eq!(bus.read(0xB000), 0);
        bus.write(0x8001, 0x44);
        assert_eq!(bus.read(0x8001), 0x44);
        drop(bus);
        assert!(!b.sound.latch.pending());
        assert!(b.sound.upd7759.start);
        assert_eq!(b.sound.upd7759.port, 0x12);
    }

    #[test]
    fn bootleg_sound_map() {
        let mut b = board(Variant::Combatscb);
        let mut bus = b.sound_bus();
        assert_eq!(bus.read(0xC000), 0x82);
        bus.write(0x9800, 0x80);
        assert_eq!(bus.read(0xC000), 0x83);
        bus.write(0x9000, 0x07);
        bus.write(0x9001, 0x1C);
        assert_eq!(bus.read(0x9009), 0x1C);
        drop(bus);
        b.sound.msm_vck();
        b.sound_bus().write(0xA800, 0);
        assert!(!b.sound.irq_line());
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut b = board(Variant::Combatsct);
        b.input.set_trackball(crate::input::TrackballAxis::P1X, 0x10);
        assert_eq!(MainBus::peek(&b, 0x0405), 0x00);
        assert_eq!(b.trackball.positions(), [0; 4]);
        b.sound.write_latch(9);
        assert_eq!(SoundBus::peek(&b, 0xD000), 9);
        assert!(b.sound.latch.pending());
    }
}
