//! Save states.
//!
//! A snapshot holds everything the CPUs can observe on the board: bank
//! and window selection, both video circuits, the protection and trackball
//! latches, sound-side registers and every RAM. ROM contents, DIP settings
//! and held buttons are not part of it.
//!
//! The binary form is a `CSC1` header, a version byte and little-endian
//! fields in a fixed order.

#![allow(clippy::cast_possible_truncation)]

use crate::banking::{BankState, VideoCircuit, WindowMode};
use crate::board::{
    AUDIO_RAM_SIZE, Board, IO_RAM_SIZE, LOW_RAM_SIZE, PALETTE_SIZE, WORK_RAM_SIZE,
};
use crate::config::BoardKind;
use crate::error::SnapshotError;
use crate::input::CoinCounters;
use crate::sound::SoundState;
use crate::trackball::TrackballState;
use crate::video::{PAGE_SIZE, SCROLL_SIZE, SPRITE_RAM_SIZE, VideoRegisters};

/// Magic bytes for snapshot file identification.
const SNAPSHOT_MAGIC: &[u8; 4] = b"CSC1";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 1;

/// Complete board state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub board: BoardKind,
    pub bank: BankState,
    pub(crate) video: VideoRegisters,
    pub pages: Box<[[u8; PAGE_SIZE]; 2]>,
    pub scroll: [[u8; SCROLL_SIZE]; 2],
    pub sprites: Box<[[u8; SPRITE_RAM_SIZE]; 2]>,
    pub trackball: TrackballState,
    pub protection: [u8; 2],
    pub sound: SoundState,
    pub io_ram: Box<[u8; IO_RAM_SIZE]>,
    pub work_ram: Box<[u8; WORK_RAM_SIZE]>,
    pub low_ram: [u8; LOW_RAM_SIZE],
    pub palette: [u8; PALETTE_SIZE],
    pub audio_ram: [u8; AUDIO_RAM_SIZE],
    pub coins: CoinCounters,
    pub watchdog_kicks: u64,
}

impl BoardSnapshot {
    /// Copy the current state of `board`.
    #[must_use]
    pub fn capture(board: &Board) -> Self {
        let video = &board.video;
        Self {
            board: board.kind(),
            bank: board.bank,
            video: video.registers(),
            pages: Box::new([*video.page(VideoCircuit::Zero), *video.page(VideoCircuit::One)]),
            scroll: [
                *video.scroll_table(VideoCircuit::Zero),
                *video.scroll_table(VideoCircuit::One),
            ],
            sprites: Box::new([
                *video.sprite_ram(VideoCircuit::Zero),
                *video.sprite_ram(VideoCircuit::One),
            ]),
            trackball: board.trackball,
            protection: board.protection.operands(),
            sound: board.sound,
            io_ram: board.io_ram.clone(),
            work_ram: board.work_ram.clone(),
            low_ram: board.low_ram,
            palette: board.palette,
            audio_ram: board.audio_ram,
            coins: board.coins,
            watchdog_kicks: board.watchdog_kicks,
        }
    }

    /// Write this state into `board`. Every tile layer is marked dirty.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::BoardMismatch`] if the snapshot was taken on
    /// the other board type; `board` is left untouched.
    pub fn restore_into(&self, board: &mut Board) -> Result<(), SnapshotError> {
        if self.board != board.kind() {
            return Err(SnapshotError::BoardMismatch);
        }
        board.bank = self.bank;
        board.video.restore_registers(self.video);
        *board.video.pages_mut() = *self.pages;
        *board.video.scroll_tables_mut() = self.scroll;
        *board.video.sprite_ram_mut() = *self.sprites;
        board.trackball = self.trackball;
        board.protection.write(0, self.protection[0]);
        board.protection.write(1, self.protection[1]);
        board.sound = self.sound;
        board.io_ram.clone_from(&self.io_ram);
        board.work_ram.clone_from(&self.work_ram);
        board.low_ram = self.low_ram;
        board.palette = self.palette;
        board.audio_ram = self.audio_ram;
        board.coins = self.coins;
        board.watchdog_kicks = self.watchdog_kicks;
        Ok(())
    }

    /// Serialize to the binary snapshot format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(0xC800);

        // Header
        data.extend_from_slice(SNAPSHOT_MAGIC);
        data.push(SNAPSHOT_VERSION);
        data.push(match self.board {
            BoardKind::Konami => 0,
            BoardKind::Bootleg => 1,
        });

        // Banking
        data.push(self.bank.last_select);
        data.push(self.bank.bank);
        data.push(match self.bank.window {
            WindowMode::BankedRom => 0,
            WindowMode::IoWindow => 1,
        });

        // Video registers
        for regs in &self.video.k007121 {
            data.extend_from_slice(regs);
        }
        data.extend(self.video.flip.map(u8::from));
        data.push(self.video.circuit.index() as u8);
        data.push(self.video.scroll_circuit.index() as u8);
        data.push(u8::from(self.video.priority));
        data.push(self.video.vreg);

        // Video RAM
        for page in self.pages.iter() {
            data.extend_from_slice(page);
        }
        for table in &self.scroll {
            data.extend_from_slice(table);
        }
        for sprites in self.sprites.iter() {
            data.extend_from_slice(sprites);
        }

        // Trackball and protection
        data.extend_from_slice(&self.trackball.pos);
        data.extend(self.trackball.sign.map(u8::from));
        data.extend_from_slice(&self.protection);

        // Sound
        let sound = &self.sound;
        data.push(sound.latch.value);
        data.push(u8::from(sound.latch.pending));
        data.push(sound.upd7759.port);
        data.push(u8::from(sound.upd7759.start));
        data.push(u8::from(sound.upd7759.reset));
        data.push(u8::from(sound.upd7759.busy));
        data.push(sound.ym2203.address);
        data.extend_from_slice(&sound.ym2203.registers);
        data.push(sound.ym2203.status);
        data.push(sound.msm5205.data);
        data.push(u8::from(sound.msm5205.reset));
        data.push(u8::from(sound.irq_held));
        data.push(u8::from(sound.irq_line));
        data.push(u8::from(sound.nmi_edge));
        data.push(sound.audio_bank);

        // RAM
        data.extend_from_slice(self.io_ram.as_ref());
        data.extend_from_slice(self.work_ram.as_ref());
        data.extend_from_slice(&self.low_ram);
        data.extend_from_slice(&self.palette);
        data.extend_from_slice(&self.audio_ram);

        // Counters
        data.push(self.coins.latch);
        for count in self.coins.counts {
            data.extend_from_slice(&count.to_le_bytes());
        }
        data.extend_from_slice(&self.watchdog_kicks.to_le_bytes());

        data
    }

    /// Parse the binary snapshot format.
    ///
    /// # Errors
    ///
    /// Fails on a wrong header, an unknown version, short input or a field
    /// with an impossible value.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let mut r = Reader { data, pos: 0 };

        if r.take(4)? != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = r.u8()?;
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }
        let board = match r.u8()? {
            0 => BoardKind::Konami,
            1 => BoardKind::Bootleg,
            _ => return Err(SnapshotError::InvalidField("board")),
        };

        let mut bank = BankState::new();
        bank.last_select = r.u8()?;
        bank.bank = r.u8()?;
        if bank.bank > 9 {
            return Err(SnapshotError::InvalidField("bank"));
        }
        bank.window = match r.u8()? {
            0 => WindowMode::BankedRom,
            1 => WindowMode::IoWindow,
            _ => return Err(SnapshotError::InvalidField("window")),
        };

        let k007121 = [r.array()?, r.array()?];
        let flip = [r.bool()?, r.bool()?];
        let circuit = r.circuit("circuit")?;
        let scroll_circuit = r.circuit("scroll_circuit")?;
        let video = VideoRegisters {
            k007121,
            flip,
            circuit,
            scroll_circuit,
            priority: r.bool()?,
            vreg: r.u8()?,
        };

        let pages = Box::new([r.array()?, r.array()?]);
        let scroll = [r.array()?, r.array()?];
        let sprites = Box::new([r.array()?, r.array()?]);

        let mut trackball = TrackballState::new();
        trackball.pos = r.array()?;
        for sign in &mut trackball.sign {
            *sign = r.bool()?;
        }
        let protection = r.array()?;

        let mut sound = SoundState::new(board);
        sound.latch.value = r.u8()?;
        sound.latch.pending = r.bool()?;
        sound.upd7759.port = r.u8()?;
        sound.upd7759.start = r.bool()?;
        sound.upd7759.reset = r.bool()?;
        sound.upd7759.busy = r.bool()?;
        sound.ym2203.address = r.u8()?;
        sound.ym2203.registers = r.array()?;
        sound.ym2203.status = r.u8()?;
        sound.msm5205.data = r.u8()?;
        sound.msm5205.reset = r.bool()?;
        sound.irq_held = r.bool()?;
        sound.irq_line = r.bool()?;
        sound.nmi_edge = r.bool()?;
        sound.audio_bank = r.u8()?;

        let io_ram = Box::new(r.array()?);
        let work_ram = Box::new(r.array()?);
        let low_ram = r.array()?;
        let palette = r.array()?;
        let audio_ram = r.array()?;

        let mut coins = CoinCounters::default();
        coins.latch = r.u8()?;
        coins.counts = [r.u32()?, r.u32()?];
        let watchdog_kicks = r.u64()?;

        Ok(Self {
            board,
            bank,
            video,
            pages,
            scroll,
            sprites,
            trackball,
            protection,
            sound,
            io_ram,
            work_ram,
            low_ram,
            palette,
            audio_ram,
            coins,
            watchdog_kicks,
        })
    }
}

/// Bounds-checked cursor over snapshot bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], SnapshotError> {
        let end = self.pos + len;
        let bytes = self.data.get(self.pos..end).ok_or(SnapshotError::Truncated {
            needed: end,
            actual: self.data.len(),
        })?;
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take(1)?[0])
    }

    fn bool(&mut self) -> Result<bool, SnapshotError> {
        Ok(self.u8()? != 0)
    }

    fn u32(&mut self) -> Result<u32, SnapshotError> {
        self.array().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64, SnapshotError> {
        self.array().map(u64::from_le_bytes)
    }

    fn circuit(&mut self, field: &'static str) -> Result<VideoCircuit, SnapshotError> {
        match self.u8()? {
            0 => Ok(VideoCircuit::Zero),
            1 => Ok(VideoCircuit::One),
            _ => Err(SnapshotError::InvalidField(field)),
        }
    }
}
