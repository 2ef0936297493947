//! Graphics ROM layouts and decode tables.
//!
//! Layouts are bit-offset tables: pixel (x, y) of element `n`, plane `p`
//! lives at bit `n * increment + plane[p] + y[y] + x[x]` of the region.
//! Bits are numbered MSB-first within each byte and plane 0 supplies the
//! high bit of the pixel value.

#![allow(clippy::cast_possible_truncation)]

use crate::config::BoardKind;

/// Bit-offset description of one kind of graphics element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfxLayout {
    pub width: usize,
    pub height: usize,
    pub total: usize,
    pub planes: &'static [usize],
    pub x_offsets: &'static [usize],
    pub y_offsets: &'static [usize],
    /// Bits from one element to the next.
    pub increment: usize,
}

/// 8×8 4bpp packed nibbles, 32 bytes per tile (Konami board, both regions).
pub const PACKED_8X8: GfxLayout = GfxLayout {
    width: 8,
    height: 8,
    total: 0x4000,
    planes: &[0, 1, 2, 3],
    x_offsets: &[0, 4, 8, 12, 16, 20, 24, 28],
    y_offsets: &[0, 32, 64, 96, 128, 160, 192, 224],
    increment: 32 * 8,
};

const PLANE: usize = 0x10000 * 8;

/// 8×8 tiles with each plane in its own 64 KiB quarter (bootleg).
pub const PLANAR_TILE: GfxLayout = GfxLayout {
    width: 8,
    height: 8,
    total: 0x2000,
    planes: &[0, PLANE, 2 * PLANE, 3 * PLANE],
    x_offsets: &[0, 1, 2, 3, 4, 5, 6, 7],
    y_offsets: &[0, 8, 16, 24, 32, 40, 48, 56],
    increment: 8 * 8,
};

/// 16×16 sprites, planes in reverse quarter order (bootleg).
pub const PLANAR_SPRITE: GfxLayout = GfxLayout {
    width: 16,
    height: 16,
    total: 0x800,
    planes: &[3 * PLANE, 2 * PLANE, PLANE, 0],
    x_offsets: &[
        0, 1, 2, 3, 4, 5, 6, 7, 128, 129, 130, 131, 132, 133, 134, 135,
    ],
    y_offsets: &[
        0, 8, 16, 24, 32, 40, 48, 56, 64, 72, 80, 88, 96, 104, 112, 120,
    ],
    increment: 8 * 8 * 4,
};

impl GfxLayout {
    #[must_use]
    pub const fn bits_per_pixel(&self) -> usize {
        self.planes.len()
    }

    /// Decode element `index` starting at byte `base` of `rom`.
    ///
    /// Returns `width * height` pixel values, row-major. Bits past the end
    /// of the region read as zero.
    #[must_use]
    pub fn decode(&self, rom: &[u8], base: usize, index: usize) -> Vec<u8> {
        let start = base * 8 + index * self.increment;
        let mut pixels = Vec::with_capacity(self.width * self.height);
        for &y in self.y_offsets {
            for &x in self.x_offsets {
                let mut value = 0u8;
                for &plane in self.planes {
                    value = (value << 1) | bit(rom, start + plane + y + x);
                }
                pixels.push(value);
            }
        }
        pixels
    }
}

fn bit(rom: &[u8], offset: usize) -> u8 {
    rom.get(offset / 8)
        .map_or(0, |byte| (byte >> (7 - offset % 8)) & 1)
}

/// Which graphics region a decode entry reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxRegion {
    Gfx1,
    Gfx2,
}

impl GfxRegion {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Gfx1 => "gfx1",
            Self::Gfx2 => "gfx2",
        }
    }
}

/// One graphics set the renderer can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfxDecodeEntry {
    pub region: GfxRegion,
    /// Byte offset into the region.
    pub start: usize,
    pub layout: &'static GfxLayout,
    pub color_base: usize,
    pub color_count: usize,
}

const fn entry(region: GfxRegion, start: usize, layout: &'static GfxLayout) -> GfxDecodeEntry {
    GfxDecodeEntry {
        region,
        start,
        layout,
        color_base: 0,
        color_count: 8 * 16,
    }
}

pub const KONAMI_GFXDECODE: &[GfxDecodeEntry] = &[
    entry(GfxRegion::Gfx1, 0, &PACKED_8X8),
    entry(GfxRegion::Gfx2, 0, &PACKED_8X8),
];

pub const BOOTLEG_GFXDECODE: &[GfxDecodeEntry] = &[
    entry(GfxRegion::Gfx1, 0x00000, &PLANAR_TILE),
    entry(GfxRegion::Gfx1, 0x40000, &PLANAR_TILE),
    entry(GfxRegion::Gfx2, 0x00000, &PLANAR_SPRITE),
    entry(GfxRegion::Gfx2, 0x40000, &PLANAR_SPRITE),
];

#[must_use]
pub const fn gfx_decode(board: BoardKind) -> &'static [GfxDecodeEntry] {
    match board {
        BoardKind::Konami => KONAMI_GFXDECODE,
        BoardKind::Bootleg => BOOTLEG_GFXDECODE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_tile_nibbles() {
        let mut rom = vec![0u8; 64];
        // Tile 1, row 0: pixels 0x1..0x8 in nibble order.
        rom[32..36].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
        let pixels = PACKED_8X8.decode(&rom, 0, 1);
        assert_eq!(&pixels[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(pixels[8..].iter().all(|&p| p == 0));
    }

    #[test]
    fn planar_tile_plane_order() {
        let mut rom = vec![0u8; 0x40000];
        rom[0] = 0x80; // plane 0 → bit 3
        rom[0x30000] = 0x80; // plane 3 → bit 0
        let pixels = PLANAR_TILE.decode(&rom, 0, 0);
        assert_eq!(pixels[0], 0b1001);
        assert_eq!(pixels[1], 0);
    }

    #[test]
    fn planar_sprite_right_half() {
        let mut rom = vec![0u8; 0x40000];
        // Plane with offset 0 is the last plane listed, so it is the low bit.
        rom[16] = 0x01;
        let pixels = PLANAR_SPRITE.decode(&rom, 0, 0);
        assert_eq!(pixels[15], 1);
        assert_eq!(pixels.iter().filter(|&&p| p != 0).count(), 1);
    }

    #[test]
    fn out_of_range_reads_zero() {
        let pixels = PACKED_8X8.decode(&[0xFF; 4], 0, 10);
        assert_eq!(pixels, vec![0; 64]);
    }

    #[test]
    fn layouts_fit_their_regions() {
        // Konami: 0x4000 tiles × 32 bytes = 0x80000.
        assert_eq!(PACKED_8X8.total * PACKED_8X8.increment / 8, 0x80000);
        // Bootleg tiles: 0x2000 × 8 bytes per plane quarter.
        assert_eq!(PLANAR_TILE.total * PLANAR_TILE.increment / 8, 0x10000);
        assert_eq!(PLANAR_SPRITE.total * PLANAR_SPRITE.increment / 8, 0x10000);
        for e in BOOTLEG_GFXDECODE {
            assert_eq!(e.layout.bits_per_pixel(), 4);
        }
    }
}
