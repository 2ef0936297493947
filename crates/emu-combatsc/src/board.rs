//! The GX611 board: every stateful component plus main and audio memory.
//!
//! The board is what both CPUs' bus views borrow. Address decoding lives in
//! `bus`; the handlers here apply the side effects of each register.

use emu_core::{Observable, Stateful, Value, parse_address};

use crate::banking::{BankSelector, VideoCircuit, WindowMode, BANK_SIZE};
use crate::bus::{MainBus, SoundBus};
use crate::config::{BoardKind, CombatSchoolConfig, Variant};
use crate::error::{DipError, Error};
use crate::input::{CoinCounters, InputPorts, PortId};
use crate::protection::Protection;
use crate::romset::{self, LoadedRoms, RomReport, RomSource};
use crate::snapshot::BoardSnapshot;
use crate::sound::Sound;
use crate::trackball::Trackball;
use crate::video::Video;

pub const LOW_RAM_SIZE: usize = 0x500;
pub const PALETTE_SIZE: usize = 0x100;
pub const WORK_RAM_SIZE: usize = 0x1800;
pub const IO_RAM_SIZE: usize = 0x4000;
pub const AUDIO_RAM_SIZE: usize = 0x800;
/// Audio ROM banks behind $C000 on the bootleg start here in `audiocpu`.
const AUDIO_BANK_BASE: usize = 0x8000;

/// Combat School board state.
pub struct Board {
    variant: Variant,
    kind: BoardKind,
    roms: LoadedRoms,
    /// $0000-$04FF (bootleg only).
    pub(crate) low_ram: [u8; LOW_RAM_SIZE],
    /// $0600-$06FF, xBGR555 little-endian, written by the host palette.
    pub(crate) palette: [u8; PALETTE_SIZE],
    /// $0800-$1FFF.
    pub(crate) work_ram: Box<[u8; WORK_RAM_SIZE]>,
    /// Bootleg I/O window backing store.
    pub(crate) io_ram: Box<[u8; IO_RAM_SIZE]>,
    /// Audio CPU $8000-$87FF.
    pub(crate) audio_ram: [u8; AUDIO_RAM_SIZE],
    pub bank: BankSelector,
    pub trackball: Trackball,
    pub protection: Protection,
    pub video: Video,
    pub sound: Sound,
    pub input: InputPorts,
    pub coins: CoinCounters,
    pub(crate) watchdog_kicks: u64,
}

impl Board {
    /// Build a board around already-loaded ROMs and reset it.
    pub fn new(config: &CombatSchoolConfig, roms: LoadedRoms) -> Result<Self, DipError> {
        let variant = config.variant;
        let kind = variant.board();
        let mut board = Self {
            variant,
            kind,
            roms,
            low_ram: [0; LOW_RAM_SIZE],
            palette: [0; PALETTE_SIZE],
            work_ram: Box::new([0; WORK_RAM_SIZE]),
            io_ram: Box::new([0; IO_RAM_SIZE]),
            audio_ram: [0; AUDIO_RAM_SIZE],
            bank: BankSelector::new(),
            trackball: Trackball::new(),
            protection: Protection::new(),
            video: Video::new(),
            sound: Sound::new(kind),
            input: InputPorts::new(kind, variant.controls()),
            coins: CoinCounters::default(),
            watchdog_kicks: 0,
        };
        for (name, setting) in &config.dips {
            board.input.dips.set(name, setting)?;
        }
        board.reset();
        Ok(board)
    }

    /// Load the configured set from `source` and build a board.
    pub fn load(config: &CombatSchoolConfig, source: &dyn RomSource) -> Result<Self, Error> {
        let roms = romset::load(config.variant, source, config.strict_roms)?;
        Ok(Self::new(config, roms)?)
    }

    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub const fn kind(&self) -> BoardKind {
        self.kind
    }

    #[must_use]
    pub fn roms(&self) -> &LoadedRoms {
        &self.roms
    }

    /// ROM verification outcome from loading.
    #[must_use]
    pub fn rom_report(&self) -> &RomReport {
        &self.roms.report
    }

    /// True when the set loaded with missing or mismatched images.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.roms.report.degraded()
    }

    #[must_use]
    pub const fn watchdog_kicks(&self) -> u64 {
        self.watchdog_kicks
    }

    #[must_use]
    pub fn palette_ram(&self) -> &[u8; PALETTE_SIZE] {
        &self.palette
    }

    /// Main CPU view.
    pub fn main_bus(&mut self) -> MainBus<'_> {
        MainBus::new(self)
    }

    /// Audio CPU view.
    pub fn sound_bus(&mut self) -> SoundBus<'_> {
        SoundBus::new(self)
    }

    // -----------------------------------------------------------------------
    // ROM views
    // -----------------------------------------------------------------------

    /// Byte of the `maincpu` region; out-of-range reads return 0xFF.
    pub(crate) fn main_rom(&self, offset: usize) -> u8 {
        self.roms.region("maincpu").get(offset).copied().unwrap_or(0xFF)
    }

    pub(crate) fn audio_rom(&self, offset: usize) -> u8 {
        self.roms.region("audiocpu").get(offset).copied().unwrap_or(0xFF)
    }

    /// $4000-$7FFF through the current bank.
    pub(crate) fn banked_rom(&self, offset: usize) -> u8 {
        self.main_rom(self.bank.offset() + offset % BANK_SIZE)
    }

    /// Bootleg audio $C000-$FFFF.
    pub(crate) fn banked_audio_rom(&self, offset: usize) -> u8 {
        let bank = usize::from(self.sound.audio_bank());
        self.audio_rom(AUDIO_BANK_BASE + bank * 0x4000 + offset % 0x4000)
    }

    // -----------------------------------------------------------------------
    // Main CPU handlers
    // -----------------------------------------------------------------------

    /// $0404-$0407.
    pub(crate) fn trackball_read(&mut self, offset: usize) -> u8 {
        if offset == 0 && self.variant.joystick_on_trackball_port() {
            return self.input.read(PortId::In1);
        }
        self.trackball.read(offset, self.input.trackball_samples())
    }

    /// $0404-$0407 without resampling.
    pub(crate) fn trackball_peek(&self, offset: usize) -> u8 {
        if offset == 0 && self.variant.joystick_on_trackball_port() {
            return self.input.read(PortId::In1);
        }
        self.trackball.port(offset)
    }

    /// Konami $0410: bank, circuit with scroll table, priority.
    pub fn bank_select_konami(&mut self, value: u8) {
        let control = self.bank.write_konami(value);
        self.video.select_circuit(control.circuit);
        self.video.set_priority(control.priority);
    }

    /// Bootleg $0500: bank, window mode and the page alone.
    pub fn bank_select_bootleg(&mut self, value: u8) {
        let select = self.bank.write_bootleg(value);
        self.video.select_page(select.circuit);
    }

    /// Bootleg window $4400: circuit with scroll table, priority.
    pub(crate) fn bootleg_priority(&mut self, value: u8) {
        self.video.select_circuit(VideoCircuit::from_bit6(value));
        self.video.set_priority(value & 0x20 != 0);
    }

    /// Write into the bootleg I/O window, `offset` from $4000.
    pub(crate) fn bootleg_io_write(&mut self, offset: usize, value: u8) {
        match offset {
            0x400 => self.bootleg_priority(value),
            0x800 => self.sound.write_latch(value),
            0xC00 => {
                self.video.write_vreg(value);
            }
            _ => self.io_ram[offset % IO_RAM_SIZE] = value,
        }
    }

    /// Bootleg window $4400-$4403.
    pub(crate) fn bootleg_io_read(&self, offset: usize) -> u8 {
        const PORTS: [PortId; 4] = [PortId::In0, PortId::In1, PortId::Dsw1, PortId::Dsw2];
        self.input.read(PORTS[offset & 3])
    }

    pub(crate) fn kick_watchdog(&mut self) {
        self.watchdog_kicks += 1;
    }

    /// Bytes of the bootleg I/O window backing store.
    #[must_use]
    pub fn io_ram(&self) -> &[u8; IO_RAM_SIZE] {
        &self.io_ram
    }

    pub(crate) fn window_mode(&self) -> WindowMode {
        match self.kind {
            BoardKind::Konami => WindowMode::BankedRom,
            BoardKind::Bootleg => self.bank.window(),
        }
    }
}

impl Stateful for Board {
    type State = BoardSnapshot;

    /// Clears the I/O RAM, both video pages, protection and trackball
    /// latches, then selects bank 8 / circuit 0 as the original board's
    /// bank register does for a zero write. Work RAM and scroll tables
    /// survive.
    fn reset(&mut self) {
        self.io_ram.fill(0);
        self.video.reset();
        self.bank.reset();
        self.protection.reset();
        self.trackball.reset();
        self.sound.reset();
        self.bank_select_konami(0);
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    /// A snapshot from the other board type is ignored with a warning; use
    /// [`BoardSnapshot::restore_into`] to see the error.
    fn restore(&mut self, state: &BoardSnapshot) {
        if let Err(e) = state.restore_into(self) {
            log::warn!("snapshot not restored: {e}");
        }
    }
}

impl Observable for Board {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("memory.") {
            let addr = parse_address(rest)?;
            Some(Value::U8(MainBus::peek(self, addr)))
        } else if let Some(rest) = path.strip_prefix("audio_memory.") {
            let addr = parse_address(rest)?;
            Some(Value::U8(SoundBus::peek(self, addr)))
        } else if let Some(rest) = path.strip_prefix("video.") {
            let circuit = |c: VideoCircuit| -> Value { u8::try_from(c.index()).unwrap_or(0).into() };
            match rest {
                "circuit" => Some(circuit(self.video.circuit())),
                "scroll_circuit" => Some(circuit(self.video.scroll_circuit())),
                "priority" => Some(self.video.priority().into()),
                "vreg" => Some(self.video.vreg().into()),
                "k007121.0" => Some(self.video.control_registers(VideoCircuit::Zero).into()),
                "k007121.1" => Some(self.video.control_registers(VideoCircuit::One).into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("trackball.") {
            match rest {
                "pos" => Some(self.trackball.positions().into()),
                "sign" => Some(self.trackball.signs().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("protection.") {
            match rest {
                "operands" => Some(self.protection.operands().into()),
                "product" => Some(Value::U16(
                    (u16::from(self.protection.read(1)) << 8) | u16::from(self.protection.read(0)),
                )),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("sound.") {
            match rest {
                "latch" => Some(self.sound.latch.peek().into()),
                "latch_pending" => Some(self.sound.latch.pending().into()),
                "irq_held" => Some(self.sound.irq_held().into()),
                "irq_line" => Some(self.sound.irq_line().into()),
                "audio_bank" => Some(self.sound.audio_bank().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("input.") {
            PortId::ALL
                .into_iter()
                .find(|p| p.name() == rest)
                .map(|p| Value::U8(self.input.read(p)))
        } else if let Some(rest) = path.strip_prefix("dip.") {
            self.input.dips.current(rest).map(Value::from)
        } else {
            match path {
                "variant" => Some(self.variant.name().into()),
                "board" => Some(format!("{:?}", self.kind).into()),
                "bank" => Some(self.bank.bank().into()),
                "bank_select" => Some(self.bank.last_select().into()),
                "window" => Some(format!("{:?}", self.window_mode()).into()),
                "coins" => Some(self.coins.counts.into()),
                "watchdog" => Some(self.watchdog_kicks.into()),
                "degraded" => Some(self.degraded().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "variant",
            "board",
            "bank",
            "bank_select",
            "window",
            "coins",
            "watchdog",
            "degraded",
            "video.circuit",
            "video.scroll_circuit",
            "video.priority",
            "video.vreg",
            "video.k007121.0",
            "video.k007121.1",
            "trackball.pos",
            "trackball.sign",
            "protection.operands",
            "protection.product",
            "sound.latch",
            "sound.latch_pending",
            "sound.irq_held",
            "sound.irq_line",
            "sound.audio_bank",
            "input.<in0|in1|dsw1|dsw2|dsw3>",
            "dip.<switch name>",
            "memory.<address>",
            "audio_memory.<address>",
        ]
    }
}
