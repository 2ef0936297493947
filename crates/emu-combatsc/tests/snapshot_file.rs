//! Save states taken mid-game restore to an identical board.

use emu_combatsc::{Board, BoardSnapshot, CombatSchoolConfig, LoadedRoms, SnapshotError, Variant};
use emu_core::{Bus, Observable, Stateful};

fn board(variant: Variant) -> Board {
    Board::new(&CombatSchoolConfig::new(variant), LoadedRoms::blank(variant)).unwrap()
}

fn play(b: &mut Board) {
    let mut bus = b.main_bus();
    bus.write(0x0410, 0x7B);
    bus.write(0x0000, 0x12);
    bus.write(0x0007, 0x08);
    bus.write(0x0021, 0x34);
    bus.write(0x0200, 0x0C);
    bus.write(0x0201, 0x0D);
    bus.write(0x040C, 0x5A);
    bus.write(0x0408, 0x03);
    bus.write(0x041C, 0x00);
    bus.write(0x0414, 0x99);
    bus.write(0x0418, 0x00);
    bus.write(0x3000, 0x77);
    bus.write(0x0003, 0x08);
    bus.write(0x1FFF, 0xEE);
    let mut audio = b.sound_bus();
    audio.write(0xE000, 0x08);
    audio.write(0xE001, 0x0F);
    audio.write(0x87FF, 0x01);
}

#[test]
fn konami_state_survives_bytes() {
    let mut b = board(Variant::Combatsct);
    play(&mut b);
    let bytes = b.snapshot().to_bytes();

    let mut restored = board(Variant::Combatsct);
    let snap = BoardSnapshot::from_bytes(&bytes).unwrap();
    snap.restore_into(&mut restored).unwrap();

    assert_eq!(BoardSnapshot::capture(&restored), BoardSnapshot::capture(&b));
    for path in [
        "bank",
        "video.circuit",
        "video.priority",
        "video.vreg",
        "video.k007121.1",
        "protection.product",
        "sound.latch",
        "sound.irq_held",
        "coins",
        "watchdog",
    ] {
        assert_eq!(restored.query(path), b.query(path), "{path}");
    }
    assert_eq!(restored.query("memory.0x1FFF"), Some(emu_core::Value::U8(0xEE)));
}

#[test]
fn truncated_file_is_rejected() {
    let bytes = board(Variant::Combatsc).snapshot().to_bytes();
    assert!(matches!(
        BoardSnapshot::from_bytes(&bytes[..10]),
        Err(SnapshotError::Truncated { .. })
    ));
}

#[test]
fn board_type_must_match() {
    let bytes = board(Variant::Combatsc).snapshot().to_bytes();
    let snap = BoardSnapshot::from_bytes(&bytes).unwrap();
    let mut bootleg = board(Variant::Combatscb);
    bootleg.main_bus().write(0x0800, 0x42);
    // The infallible trait restore leaves the board alone.
    bootleg.restore(&snap);
    assert_eq!(bootleg.query("memory.0x0800"), Some(emu_core::Value::U8(0x42)));
}
