//! Video RAM, scroll RAM and K007121 control.
//!
//! The board has two video circuits. Each owns an 8 KiB page (tilemap,
//! attributes and object RAM), a 64-byte scroll table and a K007121
//! control block. The main CPU sees one circuit at a time through $2000
//! and $0000-$005F; the bank-select write picks which.
//!
//! Tilemap rendering is left to the host. This module only tracks which
//! tiles changed so a renderer can refresh its caches.

#![allow(clippy::cast_possible_truncation)]

use emu_core::Stateful;
use serde::{Deserialize, Serialize};

use crate::banking::VideoCircuit;

pub const PAGE_SIZE: usize = 0x2000;
pub const SCROLL_SIZE: usize = 0x40;
pub const SPRITE_RAM_SIZE: usize = 0x800;
/// Tiles per layer (32 × 32).
pub const LAYER_TILES: usize = 0x400;

// ---------------------------------------------------------------------------
// Dirty tracking
// ---------------------------------------------------------------------------

/// A tile layer the host renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Text,
    Tilemap0,
    Tilemap1,
}

/// Full-layer invalidations caused by a single register write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invalidation {
    pub text: bool,
    pub tilemap0: bool,
    pub tilemap1: bool,
}

impl Invalidation {
    pub const NONE: Self = Self {
        text: false,
        tilemap0: false,
        tilemap1: false,
    };

    #[must_use]
    pub const fn is_none(self) -> bool {
        !self.text && !self.tilemap0 && !self.tilemap1
    }
}

/// Pending invalidations for one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerDirty {
    all: bool,
    tiles: [u64; LAYER_TILES / 64],
}

impl LayerDirty {
    pub fn mark_all(&mut self) {
        self.all = true;
    }

    pub fn mark_tile(&mut self, tile: usize) {
        let tile = tile % LAYER_TILES;
        self.tiles[tile / 64] |= 1 << (tile % 64);
    }

    #[must_use]
    pub const fn is_all_dirty(&self) -> bool {
        self.all
    }

    #[must_use]
    pub fn is_tile_dirty(&self, tile: usize) -> bool {
        let tile = tile % LAYER_TILES;
        self.all || self.tiles[tile / 64] & (1 << (tile % 64)) != 0
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.all && self.tiles.iter().all(|&w| w == 0)
    }

    /// Individually marked tiles, ascending.
    #[must_use]
    pub fn dirty_tiles(&self) -> Vec<u16> {
        (0..LAYER_TILES)
            .filter(|&t| self.tiles[t / 64] & (1 << (t % 64)) != 0)
            .map(|t| t as u16)
            .collect()
    }
}

/// Pending invalidations for all three layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyLayers {
    pub text: LayerDirty,
    pub tilemap0: LayerDirty,
    pub tilemap1: LayerDirty,
}

impl DirtyLayers {
    #[must_use]
    pub fn layer(&self, layer: Layer) -> &LayerDirty {
        match layer {
            Layer::Text => &self.text,
            Layer::Tilemap0 => &self.tilemap0,
            Layer::Tilemap1 => &self.tilemap1,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut LayerDirty {
        match layer {
            Layer::Text => &mut self.text,
            Layer::Tilemap0 => &mut self.tilemap0,
            Layer::Tilemap1 => &mut self.tilemap1,
        }
    }

    fn apply(&mut self, inv: Invalidation) {
        if inv.text {
            self.text.mark_all();
        }
        if inv.tilemap0 {
            self.tilemap0.mark_all();
        }
        if inv.tilemap1 {
            self.tilemap1.mark_all();
        }
    }
}

// ---------------------------------------------------------------------------
// Video state
// ---------------------------------------------------------------------------

/// Both video circuits plus the selection state that maps one of them into
/// the CPU's address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pages: Box<[[u8; PAGE_SIZE]; 2]>,
    scrollram: [[u8; SCROLL_SIZE]; 2],
    spriteram: Box<[[u8; SPRITE_RAM_SIZE]; 2]>,
    k007121: [[u8; 8]; 2],
    flip: [bool; 2],
    /// Circuit behind $2000-$3FFF and the K007121 registers.
    circuit: VideoCircuit,
    /// Circuit behind the scroll table. Only the full rebind moves it.
    scroll_circuit: VideoCircuit,
    priority: bool,
    vreg: u8,
    dirty: DirtyLayers,
}

pub type VideoState = Video;

impl Video {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: Box::new([[0; PAGE_SIZE]; 2]),
            scrollram: [[0; SCROLL_SIZE]; 2],
            spriteram: Box::new([[0; SPRITE_RAM_SIZE]; 2]),
            k007121: [[0; 8]; 2],
            flip: [false; 2],
            circuit: VideoCircuit::Zero,
            scroll_circuit: VideoCircuit::Zero,
            priority: false,
            vreg: 0xFF,
            dirty: DirtyLayers::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Bind page and scroll table of `circuit` together.
    pub fn select_circuit(&mut self, circuit: VideoCircuit) {
        self.circuit = circuit;
        self.scroll_circuit = circuit;
    }

    /// Bind only the page; the scroll table stays where it was.
    pub fn select_page(&mut self, circuit: VideoCircuit) {
        self.circuit = circuit;
    }

    pub fn set_priority(&mut self, priority: bool) {
        self.priority = priority;
    }

    #[must_use]
    pub const fn circuit(&self) -> VideoCircuit {
        self.circuit
    }

    #[must_use]
    pub const fn scroll_circuit(&self) -> VideoCircuit {
        self.scroll_circuit
    }

    #[must_use]
    pub const fn priority(&self) -> bool {
        self.priority
    }

    #[must_use]
    pub const fn vreg(&self) -> u8 {
        self.vreg
    }

    // -----------------------------------------------------------------------
    // CPU access
    // -----------------------------------------------------------------------

    /// Read the active page at `offset` ($2000-relative).
    #[must_use]
    pub fn read_page(&self, offset: usize) -> u8 {
        self.pages[self.circuit.index()][offset % PAGE_SIZE]
    }

    /// Write the active page, marking the tile it belongs to.
    pub fn write_page(&mut self, offset: usize, value: u8) {
        let offset = offset % PAGE_SIZE;
        self.pages[self.circuit.index()][offset] = value;
        if offset < 0x800 {
            let layer = match self.circuit {
                VideoCircuit::Zero => Layer::Tilemap0,
                VideoCircuit::One => Layer::Tilemap1,
            };
            self.dirty.layer_mut(layer).mark_tile(offset & 0x3FF);
        } else if offset < 0x1000 && self.circuit == VideoCircuit::Zero {
            self.dirty.text.mark_tile(offset & 0x3FF);
        }
    }

    #[must_use]
    pub fn read_scroll(&self, offset: usize) -> u8 {
        self.scrollram[self.scroll_circuit.index()][offset % SCROLL_SIZE]
    }

    pub fn write_scroll(&mut self, offset: usize, value: u8) {
        self.scrollram[self.scroll_circuit.index()][offset % SCROLL_SIZE] = value;
    }

    /// Write K007121 control register `offset` (0-7) of the active circuit.
    ///
    /// Register 7 bit 3 flips the circuit's layers; a write to register 3
    /// latches object RAM from the page (bit 3 picks the upper or lower half
    /// of $3000-$3FFF).
    pub fn write_control(&mut self, offset: usize, value: u8) {
        let c = self.circuit.index();
        let offset = offset & 7;
        self.k007121[c][offset] = value;
        match offset {
            7 => self.flip[c] = value & 0x08 != 0,
            3 => {
                let base = if value & 0x08 != 0 { 0x1000 } else { 0x1800 };
                let (pages, sprites) = (&self.pages, &mut self.spriteram);
                sprites[c].copy_from_slice(&pages[c][base..base + SPRITE_RAM_SIZE]);
            }
            _ => {}
        }
    }

    /// Write the video register at $040C.
    pub fn write_vreg(&mut self, value: u8) -> Invalidation {
        if value == self.vreg {
            return Invalidation::NONE;
        }
        let inv = Invalidation {
            text: true,
            tilemap0: value & 0x0F != self.vreg & 0x0F,
            tilemap1: value >> 4 != self.vreg >> 4,
        };
        self.vreg = value;
        self.dirty.apply(inv);
        inv
    }

    // -----------------------------------------------------------------------
    // Host access
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn page(&self, circuit: VideoCircuit) -> &[u8; PAGE_SIZE] {
        &self.pages[circuit.index()]
    }

    #[must_use]
    pub fn scroll_table(&self, circuit: VideoCircuit) -> &[u8; SCROLL_SIZE] {
        &self.scrollram[circuit.index()]
    }

    #[must_use]
    pub fn sprite_ram(&self, circuit: VideoCircuit) -> &[u8; SPRITE_RAM_SIZE] {
        &self.spriteram[circuit.index()]
    }

    #[must_use]
    pub fn control_registers(&self, circuit: VideoCircuit) -> [u8; 8] {
        self.k007121[circuit.index()]
    }

    /// Flip state of a tilemap. The text layer follows circuit 0.
    #[must_use]
    pub fn flip(&self, layer: Layer) -> bool {
        match layer {
            Layer::Text | Layer::Tilemap0 => self.flip[0],
            Layer::Tilemap1 => self.flip[1],
        }
    }

    /// Pending invalidations, without clearing them.
    #[must_use]
    pub const fn dirty(&self) -> &DirtyLayers {
        &self.dirty
    }

    /// Hand pending invalidations to the renderer and start clean.
    pub fn take_dirty(&mut self) -> DirtyLayers {
        std::mem::take(&mut self.dirty)
    }

    /// Raw access for save states.
    pub(crate) fn pages_mut(&mut self) -> &mut [[u8; PAGE_SIZE]; 2] {
        &mut self.pages
    }

    pub(crate) fn scroll_tables_mut(&mut self) -> &mut [[u8; SCROLL_SIZE]; 2] {
        &mut self.scrollram
    }

    pub(crate) fn sprite_ram_mut(&mut self) -> &mut [[u8; SPRITE_RAM_SIZE]; 2] {
        &mut self.spriteram
    }

    pub(crate) fn restore_registers(&mut self, regs: VideoRegisters) {
        self.k007121 = regs.k007121;
        self.flip = regs.flip;
        self.circuit = regs.circuit;
        self.scroll_circuit = regs.scroll_circuit;
        self.priority = regs.priority;
        self.vreg = regs.vreg;
        self.dirty.apply(Invalidation {
            text: true,
            tilemap0: true,
            tilemap1: true,
        });
    }

    #[must_use]
    pub(crate) fn registers(&self) -> VideoRegisters {
        VideoRegisters {
            k007121: self.k007121,
            flip: self.flip,
            circuit: self.circuit,
            scroll_circuit: self.scroll_circuit,
            priority: self.priority,
            vreg: self.vreg,
        }
    }
}

/// Non-RAM video state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VideoRegisters {
    pub k007121: [[u8; 8]; 2],
    pub flip: [bool; 2],
    pub circuit: VideoCircuit,
    pub scroll_circuit: VideoCircuit,
    pub priority: bool,
    pub vreg: u8,
}

impl Default for Video {
    fn default() -> Self {
        Self::new()
    }
}

impl Stateful for Video {
    type State = VideoState;

    /// Clears both pages and the sentinel video register. Scroll tables,
    /// object RAM and K007121 registers survive.
    fn reset(&mut self) {
        *self.pages = [[0; PAGE_SIZE]; 2];
        self.vreg = 0xFF;
    }

    fn snapshot(&self) -> VideoState {
        self.clone()
    }

    fn restore(&mut self, state: &VideoState) {
        self.clone_from(state);
        // Everything the renderer cached is stale now.
        self.dirty.apply(Invalidation {
            text: true,
            tilemap0: true,
            tilemap1: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vreg_repeat_write_is_a_no_op() {
        let mut v = Video::new();
        let first = v.write_vreg(0x12);
        assert!(first.text && first.tilemap0 && first.tilemap1);
        v.take_dirty();
        assert!(v.write_vreg(0x12).is_none());
        assert!(v.dirty().text.is_clean());
    }

    #[test]
    fn vreg_high_nibble_only() {
        let mut v = Video::new();
        v.write_vreg(0x12);
        let inv = v.write_vreg(0x32);
        assert_eq!(
            inv,
            Invalidation {
                text: true,
                tilemap0: false,
                tilemap1: true
            }
        );
    }

    #[test]
    fn page_writes_mark_tiles() {
        let mut v = Video::new();
        v.write_page(0x0405, 1);
        v.write_page(0x0C07, 2);
        v.select_circuit(VideoCircuit::One);
        v.write_page(0x0010, 3);
        // Circuit 1 has no text layer.
        v.write_page(0x0C08, 4);

        let dirty = v.take_dirty();
        assert_eq!(dirty.tilemap0.dirty_tiles(), vec![0x005]);
        assert_eq!(dirty.text.dirty_tiles(), vec![0x007]);
        assert_eq!(dirty.tilemap1.dirty_tiles(), vec![0x010]);
        assert!(v.dirty().tilemap0.is_clean());
    }

    #[test]
    fn page_select_leaves_scroll_table() {
        let mut v = Video::new();
        v.write_scroll(0, 0xAA);
        v.select_page(VideoCircuit::One);
        v.write_page(0, 0x55);
        assert_eq!(v.read_scroll(0), 0xAA);
        assert_eq!(v.page(VideoCircuit::One)[0], 0x55);
        assert_eq!(v.page(VideoCircuit::Zero)[0], 0x00);

        v.select_circuit(VideoCircuit::One);
        assert_eq!(v.read_scroll(0), 0x00);
    }

    #[test]
    fn control_register_3_latches_sprites() {
        let mut v = Video::new();
        v.write_page(0x1000, 0x11);
        v.write_page(0x1800, 0x22);
        v.write_control(3, 0x08);
        assert_eq!(v.sprite_ram(VideoCircuit::Zero)[0], 0x11);
        v.write_control(3, 0x00);
        assert_eq!(v.sprite_ram(VideoCircuit::Zero)[0], 0x22);
        assert_eq!(v.sprite_ram(VideoCircuit::One)[0], 0x00);
    }

    #[test]
    fn control_register_7_flips() {
        let mut v = Video::new();
        v.select_circuit(VideoCircuit::One);
        v.write_control(7, 0x08);
        assert!(v.flip(Layer::Tilemap1));
        assert!(!v.flip(Layer::Text));
        assert_eq!(v.control_registers(VideoCircuit::One)[7], 0x08);
    }

    #[test]
    fn reset_clears_pages_not_scroll() {
        let mut v = Video::new();
        v.write_page(0x100, 9);
        v.write_scroll(3, 7);
        v.write_vreg(0);
        v.reset();
        assert_eq!(v.read_page(0x100), 0);
        assert_eq!(v.read_scroll(3), 7);
        assert_eq!(v.vreg(), 0xFF);
    }
}
