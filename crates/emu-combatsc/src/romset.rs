//! ROM manifests, sources and the verifying loader.
//!
//! Each set is a list of memory regions; each region is filled from one or
//! more ROM images identified by name, size, CRC32 and SHA-1.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::config::Variant;
use crate::error::RomError;

// ---------------------------------------------------------------------------
// Manifest types
// ---------------------------------------------------------------------------

/// Known-good checksums of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomHash {
    pub crc32: u32,
    /// Lowercase hex.
    pub sha1: &'static str,
}

/// Where a ROM image's bytes land in its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One contiguous copy at `offset`.
    Contiguous(usize),
    /// Consecutive chunks of the image at `(region offset, length)` pairs.
    Split(&'static [(usize, usize)]),
    /// Every other byte starting at `offset` (one lane of a 16-bit bus).
    Interleaved16(usize),
}

/// A single ROM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomEntry {
    pub name: &'static str,
    pub size: usize,
    pub placement: Placement,
    /// `None` for chips that have never been dumped.
    pub hash: Option<RomHash>,
}

/// A named memory region and the images that fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomRegion {
    pub tag: &'static str,
    pub size: usize,
    /// Complement every byte after loading.
    pub invert: bool,
    pub entries: &'static [RomEntry],
}

const fn rom(name: &'static str, offset: usize, size: usize, crc32: u32, sha1: &'static str) -> RomEntry {
    RomEntry {
        name,
        size,
        placement: Placement::Contiguous(offset),
        hash: Some(RomHash { crc32, sha1 }),
    }
}

const fn rom16(name: &'static str, offset: usize, size: usize, crc32: u32, sha1: &'static str) -> RomEntry {
    RomEntry {
        name,
        size,
        placement: Placement::Interleaved16(offset),
        hash: Some(RomHash { crc32, sha1 }),
    }
}

/// Program ROM: first half lands at $30000 (fixed $8000-$FFFF view is
/// offset $08000), second half at $08000.
const fn program(name: &'static str, crc32: u32, sha1: &'static str) -> RomEntry {
    RomEntry {
        name,
        size: 0x10000,
        placement: Placement::Split(&[(0x30000, 0x8000), (0x08000, 0x8000)]),
        hash: Some(RomHash { crc32, sha1 }),
    }
}

const fn no_dump(name: &'static str, offset: usize, size: usize) -> RomEntry {
    RomEntry {
        name,
        size,
        placement: Placement::Contiguous(offset),
        hash: None,
    }
}

const fn region(tag: &'static str, size: usize, entries: &'static [RomEntry]) -> RomRegion {
    RomRegion {
        tag,
        size,
        invert: false,
        entries,
    }
}

// ---------------------------------------------------------------------------
// Konami GX611 sets
// ---------------------------------------------------------------------------

const G02: RomEntry = rom(
    "611g02.rom",
    0x10000,
    0x20000,
    0x9ba0_5327,
    "ea03845fb49d18ac4fca97cfffce81db66b9967b",
);

const KONAMI_AUDIO_ROMS: &[RomEntry] = &[rom(
    "611g03.rom",
    0x00000,
    0x08000,
    0x2a54_4db5,
    "94a97c3c54bf13ccc665aa5057ac6b1d700fae2d",
)];

const KONAMI_GFX1_ROMS: &[RomEntry] = &[
    rom16("611g07.rom", 0x00000, 0x40000, 0x73b3_8720, "e109eb78aea464127d813284ca040e8d719599e3"),
    rom16("611g08.rom", 0x00001, 0x40000, 0x46e7_d28c, "1ece7fac954204ac35d00f3d573964fcf82dcf77"),
];

const KONAMI_GFX2_ROMS: &[RomEntry] = &[
    rom16("611g11.rom", 0x00000, 0x40000, 0x6968_7538, "4349a1c052a759acdf7259f8bf8c5c9489b788f2"),
    rom16("611g12.rom", 0x00001, 0x40000, 0x9c6b_f898, "eafc227b4e7df0c652ec7d78784c039c35965fdc"),
];

// Two K007121s, each with a sprite and a character lookup PROM.
const KONAMI_PROM_ROMS: &[RomEntry] = &[
    rom("611g06.h14", 0x0000, 0x0100, 0xf916_129a, "d5e4a8a3baab8fcdac86ef5182858cede1abf040"),
    rom("611g05.h15", 0x0100, 0x0100, 0x207a_7b07, "f4e638e7f182e5228a062b243406d0ceaaa5bfdc"),
    rom("611g10.h6", 0x0200, 0x0100, 0xf916_129a, "d5e4a8a3baab8fcdac86ef5182858cede1abf040"),
    rom("611g09.h7", 0x0300, 0x0100, 0x207a_7b07, "f4e638e7f182e5228a062b243406d0ceaaa5bfdc"),
];

const KONAMI_UPD_ROMS: &[RomEntry] = &[rom(
    "611g04.rom",
    0x00000,
    0x20000,
    0x2987_e158,
    "87c5129161d3be29a339083349807e60b625c3f7",
)];

const KONAMI_PLD_ROMS: &[RomEntry] = &[
    rom("ampal16l8.e7", 0x0000, 0x0104, 0x300a_9936, "a4a87e93f41392fc7d7d8601d7187d87b9f9ab01"),
    // Read protected.
    no_dump("pal16r6.16d", 0x0200, 0x0104),
    no_dump("pal20l8.8h", 0x0400, 0x0144),
];

const KONAMI_AUDIOCPU: RomRegion = region("audiocpu", 0x10000, KONAMI_AUDIO_ROMS);
const KONAMI_GFX1: RomRegion = region("gfx1", 0x80000, KONAMI_GFX1_ROMS);
const KONAMI_GFX2: RomRegion = region("gfx2", 0x80000, KONAMI_GFX2_ROMS);
const KONAMI_PROMS: RomRegion = region("proms", 0x0400, KONAMI_PROM_ROMS);
const KONAMI_UPD: RomRegion = region("upd", 0x20000, KONAMI_UPD_ROMS);
const KONAMI_PLDS: RomRegion = region("plds", 0x0600, KONAMI_PLD_ROMS);

/// Main CPU region for a Konami set with the given program ROMs.
const fn konami_maincpu(entries: &'static [RomEntry]) -> RomRegion {
    // 0x38000-0x3FFFF is RAM on the board, not ROM.
    region("maincpu", 0x40000, entries)
}

const COMBATSC_MAIN: &[RomEntry] = &[
    program("611g01.rom", 0x857f_fffe, "de7566d58314df4b7fdc07eb31a3f9bdd12d1a73"),
    G02,
];
const COMBATSCT_MAIN: &[RomEntry] = &[
    program("g01.rom", 0x489c_132f, "c717195f89add4be4a21ecc1ddd58361b0ab4a74"),
    G02,
];
const COMBATSCJ_MAIN: &[RomEntry] = &[
    program("611p01.a14", 0xd748_268e, "91588b6a0d3af47065204b980a56544a9f29b6d9"),
    G02,
];
const BOOTCAMP_MAIN: &[RomEntry] = &[
    program("xxx-v01.12a", 0xc10d_ca64, "f34de26e998b1501e430d46e96cdc58ebc68481e"),
    G02,
];
const BOOTCAMPA_MAIN: &[RomEntry] = &[
    program("611x01.a-14", 0x98ff_c6ed, "ab02532333272683d889f209d3fc01235871d909"),
    G02,
];

// Only the parent set lists the PLDs.
static COMBATSC_REGIONS: &[RomRegion] = &[
    konami_maincpu(COMBATSC_MAIN),
    KONAMI_AUDIOCPU,
    KONAMI_GFX1,
    KONAMI_GFX2,
    KONAMI_PROMS,
    KONAMI_UPD,
    KONAMI_PLDS,
];

static COMBATSCT_REGIONS: &[RomRegion] = &[
    konami_maincpu(COMBATSCT_MAIN),
    KONAMI_AUDIOCPU,
    KONAMI_GFX1,
    KONAMI_GFX2,
    KONAMI_PROMS,
    KONAMI_UPD,
];

static COMBATSCJ_REGIONS: &[RomRegion] = &[
    konami_maincpu(COMBATSCJ_MAIN),
    KONAMI_AUDIOCPU,
    KONAMI_GFX1,
    KONAMI_GFX2,
    KONAMI_PROMS,
    KONAMI_UPD,
];

static BOOTCAMP_REGIONS: &[RomRegion] = &[
    konami_maincpu(BOOTCAMP_MAIN),
    KONAMI_AUDIOCPU,
    KONAMI_GFX1,
    KONAMI_GFX2,
    KONAMI_PROMS,
    KONAMI_UPD,
];

static BOOTCAMPA_REGIONS: &[RomRegion] = &[
    konami_maincpu(BOOTCAMPA_MAIN),
    KONAMI_AUDIOCPU,
    KONAMI_GFX1,
    KONAMI_GFX2,
    KONAMI_PROMS,
    KONAMI_UPD,
];

// ---------------------------------------------------------------------------
// Bootleg
// ---------------------------------------------------------------------------

const BOOTLEG_MAIN: &[RomEntry] = &[
    program("combat.002", 0x0996_755d, "bb6bbbf7ab3b5fab5e1c6cebc7b3f0d720493c3b"),
    rom("combat.003", 0x10000, 0x10000, 0x229c_93b2, "ac3fd3df1bb5f6a461d0d1423c50568348ef69df"),
    rom("combat.004", 0x20000, 0x10000, 0xa069_cb84, "f49f70afb17df46b16f5801ef42edb0706730723"),
];

const BOOTLEG_AUDIO: &[RomEntry] = &[rom(
    "combat.001",
    0x00000,
    0x10000,
    0x6145_6b3b,
    "320db628283dd1bec465e95020d1a1158e6d6ae4",
)];

const BOOTLEG_TILES: &[RomEntry] = &[
    // Bank 0.
    rom("combat.006", 0x00000, 0x10000, 0x8dc2_9a1f, "564dd7c6acff34db93b8e300dda563f5f38ba159"),
    rom("combat.008", 0x10000, 0x10000, 0x6159_9f46, "cfd79a88bb496773daf207552c67f595ee696bc4"),
    rom("combat.010", 0x20000, 0x10000, 0xd5cd_a7cd, "140db6270c3f358aa27013db3bb819a48ceb5142"),
    rom("combat.012", 0x30000, 0x10000, 0xca0a_9f57, "d6b3daf7c34345bb2f64068d480bd51d7bb36e4d"),
    // Bank 1.
    rom("combat.005", 0x40000, 0x10000, 0x0803_a223, "67d4162385dd56d5396e181070bfa6760521eb45"),
    rom("combat.007", 0x50000, 0x10000, 0x23ca_ad0c, "0544cde479c6d4192da5bb4b6f0e2e75d09663c3"),
    rom("combat.009", 0x60000, 0x10000, 0x5ac8_0383, "1e89c371a92afc000d593daebda4156952a15244"),
    rom("combat.011", 0x70000, 0x10000, 0xcda8_3114, "12d2a9f694287edb3bb0ee7a8ba0e0724dad8e1f"),
];

const BOOTLEG_SPRITES: &[RomEntry] = &[
    // Bank 0.
    rom("combat.013", 0x00000, 0x10000, 0x4bed_2293, "3369de47d4ba041d9f17a18dcca2af7ac9f8bc0c"),
    rom("combat.015", 0x10000, 0x10000, 0x26c4_1f31, "f8eb7d0729a21a0dd92ce99c9cda0cde9526b861"),
    rom("combat.017", 0x20000, 0x10000, 0x6071_e6da, "ba5f8e83b07faaffc564d3568630e17efdb5a09f"),
    rom("combat.019", 0x30000, 0x10000, 0x3b1c_f1b8, "ff4de37c051bcb374c44d1b99006ff6ff5e1f927"),
    // Bank 1.
    rom("combat.014", 0x40000, 0x10000, 0x82ea_9555, "59bf7836938ce9e3242d1cca754de8dbe85bbfb7"),
    rom("combat.016", 0x50000, 0x10000, 0x2e39_bb70, "a6c4acd93cc803e987de6e18fbdc5ce4634b14a8"),
    rom("combat.018", 0x60000, 0x10000, 0x575d_b729, "6b1676da4f24fc90c77262789b6cc116184ab912"),
    rom("combat.020", 0x70000, 0x10000, 0x8d74_8a1a, "4386e14e19b91e053033dde2a13019bc6d8e1d5a"),
];

const BOOTLEG_PROMS: &[RomEntry] = &[
    // Sprite lookup.
    rom("prom.d10", 0x0000, 0x0100, 0x265f_4c97, "76f1b75a593d3d77ef6173a1948f842d5b27d418"),
    // Priority?
    rom("prom.c11", 0x0100, 0x0100, 0xa7a5_c0b4, "48bfc3af40b869599a988ebb3ed758141bcfd4fc"),
];

static COMBATSCB_REGIONS: &[RomRegion] = &[
    region("maincpu", 0x40000, BOOTLEG_MAIN),
    region("audiocpu", 0x10000, BOOTLEG_AUDIO),
    RomRegion {
        tag: "gfx1",
        size: 0x80000,
        invert: true,
        entries: BOOTLEG_TILES,
    },
    RomRegion {
        tag: "gfx2",
        size: 0x80000,
        invert: true,
        entries: BOOTLEG_SPRITES,
    },
    region("proms", 0x0200, BOOTLEG_PROMS),
];

/// Regions of a set, in load order.
#[must_use]
pub fn manifest(variant: Variant) -> &'static [RomRegion] {
    match variant {
        Variant::Combatsc => COMBATSC_REGIONS,
        Variant::Combatsct => COMBATSCT_REGIONS,
        Variant::Combatscj => COMBATSCJ_REGIONS,
        Variant::Bootcamp => BOOTCAMP_REGIONS,
        Variant::Bootcampa => BOOTCAMPA_REGIONS,
        Variant::Combatscb => COMBATSCB_REGIONS,
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Somewhere ROM images can be fetched by file name.
pub trait RomSource {
    /// The image named `name`, or `None` if the source does not have it.
    fn fetch(&self, name: &str) -> Option<Vec<u8>>;
}

/// Loose files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Open a ROM directory; fails only if the directory itself is unreadable.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RomError> {
        let root = root.into();
        std::fs::read_dir(&root).map_err(|source| RomError::Directory {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RomSource for DirectorySource {
    fn fetch(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                None
            }
        }
    }
}

/// Images held in memory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.insert(name.into(), data);
    }
}

impl RomSource for MemorySource {
    fn fetch(&self, name: &str) -> Option<Vec<u8>> {
        self.files.get(name).cloned()
    }
}

// ---------------------------------------------------------------------------
// Verification and loading
// ---------------------------------------------------------------------------

/// What went wrong with one ROM image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    WrongSize { expected: usize, actual: usize },
    BadChecksum { expected_crc32: u32, actual_crc32: u32, actual_sha1: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::WrongSize { expected, actual } => {
                write!(f, "wrong size: expected {expected:#x} bytes, found {actual:#x}")
            }
            Self::BadChecksum {
                expected_crc32,
                actual_crc32,
                ..
            } => write!(
                f,
                "bad checksum: expected CRC {expected_crc32:08x}, found {actual_crc32:08x}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RomIssue {
    pub region: &'static str,
    pub rom: &'static str,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for RomIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.rom, self.region, self.kind)
    }
}

/// Outcome of checking a set against its manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RomReport {
    pub set: &'static str,
    pub issues: Vec<RomIssue>,
    /// Images found and matching.
    pub good: usize,
    /// Undumped images the set runs without.
    pub no_dump: usize,
}

impl RomReport {
    /// True when at least one image is missing or wrong.
    #[must_use]
    pub fn degraded(&self) -> bool {
        !self.issues.is_empty()
    }
}

fn check(entry: &RomEntry, data: &[u8]) -> Option<IssueKind> {
    if data.len() != entry.size {
        return Some(IssueKind::WrongSize {
            expected: entry.size,
            actual: data.len(),
        });
    }
    let hash = entry.hash?;
    let crc = crc32fast::hash(data);
    let sha = format!("{:x}", Sha1::digest(data));
    if crc != hash.crc32 || sha != hash.sha1 {
        return Some(IssueKind::BadChecksum {
            expected_crc32: hash.crc32,
            actual_crc32: crc,
            actual_sha1: sha,
        });
    }
    None
}

fn place(buffer: &mut [u8], placement: Placement, data: &[u8]) {
    match placement {
        Placement::Contiguous(offset) => copy_clamped(buffer, offset, data),
        Placement::Split(chunks) => {
            let mut consumed = 0;
            for &(offset, len) in chunks {
                let end = (consumed + len).min(data.len());
                if consumed >= end {
                    break;
                }
                copy_clamped(buffer, offset, &data[consumed..end]);
                consumed = end;
            }
        }
        Placement::Interleaved16(offset) => {
            for (i, &byte) in data.iter().enumerate() {
                if let Some(slot) = buffer.get_mut(offset + i * 2) {
                    *slot = byte;
                }
            }
        }
    }
}

fn copy_clamped(buffer: &mut [u8], offset: usize, data: &[u8]) {
    if offset >= buffer.len() {
        return;
    }
    let len = data.len().min(buffer.len() - offset);
    buffer[offset..offset + len].copy_from_slice(&data[..len]);
}

/// Memory regions of a loaded set.
#[derive(Debug, Clone)]
pub struct LoadedRoms {
    pub variant: Variant,
    regions: HashMap<&'static str, Vec<u8>>,
    pub report: RomReport,
}

impl LoadedRoms {
    /// Region contents; an unknown tag yields an empty slice.
    #[must_use]
    pub fn region(&self, tag: &str) -> &[u8] {
        self.regions.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Zero-filled regions with no images, for tests and tools.
    #[must_use]
    pub fn blank(variant: Variant) -> Self {
        let regions = manifest(variant)
            .iter()
            .map(|r| (r.tag, vec![0; r.size]))
            .collect();
        Self {
            variant,
            regions,
            report: RomReport {
                set: variant.name(),
                ..RomReport::default()
            },
        }
    }

    /// Replace a region wholesale, resized to the manifest's length.
    pub fn set_region(&mut self, tag: &'static str, mut data: Vec<u8>) {
        if let Some(r) = manifest(self.variant).iter().find(|r| r.tag == tag) {
            data.resize(r.size, 0);
        }
        self.regions.insert(tag, data);
    }
}

/// Check every image of a set without building regions.
#[must_use]
pub fn verify(variant: Variant, source: &dyn RomSource) -> RomReport {
    let mut report = RomReport {
        set: variant.name(),
        ..RomReport::default()
    };
    for region in manifest(variant) {
        for entry in region.entries {
            match source.fetch(entry.name) {
                None if entry.hash.is_none() => report.no_dump += 1,
                None => report.issues.push(RomIssue {
                    region: region.tag,
                    rom: entry.name,
                    kind: IssueKind::Missing,
                }),
                Some(_) if entry.hash.is_none() => report.no_dump += 1,
                Some(data) => match check(entry, &data) {
                    Some(kind) => report.issues.push(RomIssue {
                        region: region.tag,
                        rom: entry.name,
                        kind,
                    }),
                    None => report.good += 1,
                },
            }
        }
    }
    report
}

/// Load a set.
///
/// Missing or mismatched images are logged and their bytes left zero; with
/// `strict` the first such set fails instead.
pub fn load(variant: Variant, source: &dyn RomSource, strict: bool) -> Result<LoadedRoms, RomError> {
    let mut loaded = LoadedRoms::blank(variant);
    let report = &mut loaded.report;

    for region in manifest(variant) {
        let mut buffer = vec![0u8; region.size];
        for entry in region.entries {
            let Some(data) = source.fetch(entry.name) else {
                if entry.hash.is_none() {
                    log::info!("{}: no known dump, skipping", entry.name);
                    report.no_dump += 1;
                } else {
                    log::warn!("{}: missing from set {}", entry.name, variant.name());
                    report.issues.push(RomIssue {
                        region: region.tag,
                        rom: entry.name,
                        kind: IssueKind::Missing,
                    });
                }
                continue;
            };
            if entry.hash.is_none() {
                report.no_dump += 1;
            } else if let Some(kind) = check(entry, &data) {
                log::warn!("{}: {kind}", entry.name);
                report.issues.push(RomIssue {
                    region: region.tag,
                    rom: entry.name,
                    kind,
                });
            } else {
                report.good += 1;
            }
            place(&mut buffer, entry.placement, &data);
        }
        if region.invert {
            buffer.iter_mut().for_each(|b| *b = !*b);
        }
        loaded.regions.insert(region.tag, buffer);
    }

    if strict && loaded.report.degraded() {
        return Err(RomError::Verification {
            set: variant.name(),
            report: loaded.report,
        });
    }
    log::info!(
        "loaded {} ({} good, {} issue(s))",
        variant.name(),
        loaded.report.good,
        loaded.report.issues.len()
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifests_fit_their_regions() {
        for v in Variant::ALL {
            for region in manifest(v) {
                for e in region.entries {
                    let end = match e.placement {
                        Placement::Contiguous(o) => o + e.size,
                        Placement::Split(chunks) => {
                            assert_eq!(chunks.iter().map(|c| c.1).sum::<usize>(), e.size);
                            chunks.iter().map(|c| c.0 + c.1).max().unwrap_or(0)
                        }
                        Placement::Interleaved16(o) => o + e.size * 2 - 1,
                    };
                    assert!(end <= region.size, "{}: {} overflows", v, e.name);
                }
            }
        }
    }

    #[test]
    fn program_rom_continuation() {
        let mut buf = vec![0u8; 0x40000];
        let mut data = vec![0xAAu8; 0x8000];
        data.extend(vec![0xBB; 0x8000]);
        place(&mut buf, Placement::Split(&[(0x30000, 0x8000), (0x08000, 0x8000)]), &data);
        assert_eq!(buf[0x30000], 0xAA);
        assert_eq!(buf[0x37FFF], 0xAA);
        assert_eq!(buf[0x08000], 0xBB);
        assert_eq!(buf[0x0FFFF], 0xBB);
        assert_eq!(buf[0x10000], 0x00);
    }

    #[test]
    fn interleaved_lanes() {
        let mut buf = vec![0u8; 8];
        place(&mut buf, Placement::Interleaved16(0), &[1, 2, 3, 4]);
        place(&mut buf, Placement::Interleaved16(1), &[5, 6, 7, 8]);
        assert_eq!(buf, vec![1, 5, 2, 6, 3, 7, 4, 8]);
    }

    #[test]
    fn empty_source_degrades_but_loads() {
        let loaded = load(Variant::Combatsc, &MemorySource::new(), false).unwrap();
        assert!(loaded.report.degraded());
        assert_eq!(loaded.report.no_dump, 2);
        assert_eq!(loaded.region("maincpu").len(), 0x40000);
        assert!(loaded.region("gfx1").iter().all(|&b| b == 0));
    }

    #[test]
    fn strict_mode_fails() {
        let err = load(Variant::Combatscb, &MemorySource::new(), true).unwrap_err();
        assert!(matches!(err, RomError::Verification { set: "combatscb", .. }));
    }

    #[test]
    fn inverted_regions() {
        let loaded = load(Variant::Combatscb, &MemorySource::new(), false).unwrap();
        assert!(loaded.region("gfx1").iter().all(|&b| b == 0xFF));
        assert!(loaded.region("maincpu").iter().all(|&b| b == 0x00));
    }

    #[test]
    fn wrong_size_is_reported() {
        let mut source = MemorySource::new();
        source.insert("611g03.rom", vec![0; 0x100]);
        let report = verify(Variant::Combatsct, &source);
        let issue = report.issues.iter().find(|i| i.rom == "611g03.rom").unwrap();
        assert_eq!(
            issue.kind,
            IssueKind::WrongSize {
                expected: 0x8000,
                actual: 0x100
            }
        );
    }

    #[test]
    fn checksum_mismatch_is_reported() {
        let mut source = MemorySource::new();
        source.insert("prom.d10", vec![0; 0x100]);
        let report = verify(Variant::Combatscb, &source);
        let issue = report.issues.iter().find(|i| i.rom == "prom.d10").unwrap();
        assert!(matches!(
            issue.kind,
            IssueKind::BadChecksum {
                expected_crc32: 0x265f_4c97,
                ..
            }
        ));
    }
}
