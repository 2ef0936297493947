//! Loading sets from synthesized ROM images.
//!
//! The images here never match the real dumps, so every load is degraded;
//! what is checked is where the bytes land and how failures surface.

use emu_combatsc::romset::{self, IssueKind};
use emu_combatsc::{
    Board, CombatSchoolConfig, DirectorySource, Error, MemorySource, RomError, Variant,
};
use emu_core::Bus;

fn bootleg_program() -> MemorySource {
    let mut source = MemorySource::new();
    let mut program = vec![0x11u8; 0x8000];
    program.extend(vec![0x22u8; 0x8000]);
    source.insert("combat.002", program);
    source.insert("combat.003", (0..0x10000usize).map(|i| 0x30 + (i / 0x4000) as u8).collect());
    source.insert("combat.004", (0..0x10000usize).map(|i| 0x40 + (i / 0x4000) as u8).collect());
    source
}

#[test]
fn program_roms_land_in_banks() {
    let config = CombatSchoolConfig::new(Variant::Combatscb);
    let mut board = Board::load(&config, &bootleg_program()).unwrap();
    assert!(board.degraded());

    let mut bus = board.main_bus();
    // Second half of the program ROM is the fixed $8000-$FFFF view.
    assert_eq!(bus.read(0x8000), 0x22);
    assert_eq!(bus.read(0xFFFF), 0x22);
    // Bank 8 after reset is the first half.
    assert_eq!(bus.read(0x4000), 0x11);
    for bank in 0..8u8 {
        bus.write(0x0500, 0x10 | (bank << 1));
        let expected = if bank < 4 { 0x30 + bank } else { 0x40 + bank - 4 };
        assert_eq!(bus.read(0x4000), expected, "bank {bank}");
    }
}

#[test]
fn checksum_mismatch_is_reported() {
    let report = romset::verify(Variant::Combatscb, &bootleg_program());
    let bad: Vec<&str> = report
        .issues
        .iter()
        .filter(|i| matches!(i.kind, IssueKind::BadChecksum { .. }))
        .map(|i| i.rom)
        .collect();
    assert_eq!(bad, ["combat.002", "combat.003", "combat.004"]);
    assert_eq!(report.good, 0);
    assert!(report.issues.iter().any(|i| i.rom == "combat.001" && i.kind == IssueKind::Missing));
}

#[test]
fn strict_load_refuses_degraded_set() {
    let mut config = CombatSchoolConfig::new(Variant::Combatscb);
    config.strict_roms = true;
    let Err(err) = Board::load(&config, &bootleg_program()) else {
        panic!("strict load succeeded");
    };
    assert!(matches!(err, Error::Rom(RomError::Verification { set: "combatscb", .. })));
}

#[test]
fn unknown_dip_fails_board_creation() {
    let mut config = CombatSchoolConfig::new(Variant::Combatsc);
    config.dips.push(("Not A Switch".into(), "On".into()));
    let Err(err) = Board::load(&config, &MemorySource::new()) else {
        panic!("bad DIP accepted");
    };
    assert!(matches!(err, Error::Dip(_)));
}

#[test]
fn directory_source_reads_files() {
    let dir = std::env::temp_dir().join(format!("emu-combatsc-roms-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("611g03.rom"), vec![0u8; 0x8000]).unwrap();

    let source = DirectorySource::new(&dir).unwrap();
    let report = romset::verify(Variant::Combatsct, &source);
    let issue = report.issues.iter().find(|i| i.rom == "611g03.rom").unwrap();
    assert!(matches!(issue.kind, IssueKind::BadChecksum { .. }));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_directory_is_an_error() {
    let dir = std::env::temp_dir().join("emu-combatsc-does-not-exist");
    assert!(matches!(DirectorySource::new(dir), Err(RomError::Directory { .. })));
}
